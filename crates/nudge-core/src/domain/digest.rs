//! Digest: the single notification summarizing one cycle's due reminders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::ReminderId;
use super::reminder::Reminder;

pub const DIGEST_TITLE: &str = "Reminders for today";

/// Content-type hint passed to the transport (rendered as markdown by Gotify clients).
pub const DIGEST_CONTENT_TYPE: &str = "text/markdown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub title: String,
    pub body: String,
    pub priority: i64,
    pub content_type: String,
    /// Reminders that contributed a line, in body order.
    pub reminder_ids: Vec<ReminderId>,
}

impl Digest {
    /// Build the digest for `date`.
    ///
    /// Only categorized reminders contribute a line; lines are grouped by
    /// category in order of first appearance. Returns `None` when nothing
    /// contributed, since the aggregate priority is undefined then.
    pub fn build(date: NaiveDate, reminders: &[Reminder]) -> Option<Self> {
        // keyed by display label, so "bills" and "Bills" share one group
        let mut groups: Vec<(String, Vec<&Reminder>)> = Vec::new();
        for reminder in reminders {
            let Some(category) = &reminder.category else {
                continue;
            };
            let label = capitalize(&category.name);
            match groups.iter_mut().find(|(existing, _)| *existing == label) {
                Some((_, members)) => members.push(reminder),
                None => groups.push((label, vec![reminder])),
            }
        }

        let contributors: Vec<&Reminder> = groups
            .iter()
            .flat_map(|(_, members)| members.iter().copied())
            .collect();
        if contributors.is_empty() {
            return None;
        }

        let mut body = format!("**{}**\n\n", date.format("%d-%m-%Y"));
        for (label, members) in &groups {
            for reminder in members {
                body.push_str(&format!("- {}: {}\n\n", label, reminder.name));
            }
        }

        Some(Self {
            title: DIGEST_TITLE.to_string(),
            body,
            priority: aggregate_priority(contributors.iter().map(|r| r.priority)),
            content_type: DIGEST_CONTENT_TYPE.to_string(),
            reminder_ids: contributors.iter().map(|r| r.id).collect(),
        })
    }
}

/// Truncating integer average. Callers guarantee at least one value.
///
/// Summed in `i128`; the mean of `i64` values always fits back in `i64`.
fn aggregate_priority(priorities: impl Iterator<Item = i64>) -> i64 {
    let (sum, count) = priorities.fold((0i128, 0i128), |(sum, count), p| {
        (sum + i128::from(p), count + 1)
    });
    i64::try_from(sum / count.max(1)).unwrap_or(i64::MAX)
}

/// First character upper-cased, the rest lower-cased ("bILLS" -> "Bills").
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
