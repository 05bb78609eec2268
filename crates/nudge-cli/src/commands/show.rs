use std::path::Path;
use std::process::ExitCode;

use anyhow::{Result, bail};
use nudge_core::config::Settings;
use nudge_core::domain::Reminder;
use nudge_core::ports::ReminderStore;

use super::open_store;

const HEADERS: [&str; 9] = [
    "name",
    "description",
    "date",
    "priority",
    "recurring",
    "category",
    "last occurrence",
    "times triggered",
    "created on",
];

const DESCRIPTION_WIDTH: usize = 15;

pub fn run(settings: &Settings, database: Option<&Path>) -> Result<ExitCode> {
    let store = open_store(settings, database)?;
    let reminders = store.list_reminders()?;
    if reminders.is_empty() {
        bail!("no reminders found to show");
    }
    print!("{}", render_table(&reminders));
    Ok(ExitCode::SUCCESS)
}

fn row(reminder: &Reminder) -> [String; 9] {
    [
        reminder.name.clone(),
        truncate(reminder.description.as_deref().unwrap_or("-"), DESCRIPTION_WIDTH),
        reminder.due_date.to_string(),
        reminder.priority.to_string(),
        reminder.recurrence.to_string(),
        reminder
            .category
            .as_ref()
            .map_or_else(|| "-".to_string(), |c| c.name.clone()),
        reminder
            .last_occurrence
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
        reminder.occurrence_count.to_string(),
        reminder.created.format("%Y-%m-%d %H:%M").to_string(),
    ]
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Left-aligned columns separated by two spaces.
fn render_table(reminders: &[Reminder]) -> String {
    let rows: Vec<[String; 9]> = reminders.iter().map(row).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for r in &rows {
        for (width, cell) in widths.iter_mut().zip(r) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &widths, HEADERS.iter().copied());
    for r in &rows {
        push_line(&mut out, &widths, r.iter().map(String::as_str));
    }
    out
}

fn push_line<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
