//! Reminder and category records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::errors::NudgeError;
use super::ids::{CategoryId, ReminderId};
use super::recurrence::Recurrence;

/// Priority given to reminders inserted without one.
pub const DEFAULT_PRIORITY: i64 = 5;

/// A named grouping label. Names are unique (case-sensitive) in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A stored reminder, joined with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub name: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub priority: i64,
    pub recurrence: Recurrence,
    pub category: Option<Category>,
    pub last_occurrence: Option<DateTime<Utc>>,
    pub occurrence_count: u32,
    pub created: DateTime<Utc>,
}

impl Reminder {
    /// Is this reminder due on `date`?
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_date == date
    }

    /// Compute the state this reminder moves to when it triggers at `now`.
    ///
    /// Pure: nothing is persisted here. A terminal recurrence keeps its due date.
    pub fn advance(&self, now: DateTime<Utc>) -> Result<Advancement, NudgeError> {
        let next_due_date = self
            .recurrence
            .next_due_date(self.due_date)?
            .unwrap_or(self.due_date);

        // last_occurrence never moves backwards, even if the clock does
        let last_occurrence = match self.last_occurrence {
            Some(prev) if prev > now => prev,
            _ => now,
        };

        Ok(Advancement {
            id: self.id,
            expected_due_date: self.due_date,
            expected_occurrence_count: self.occurrence_count,
            next_due_date,
            occurrence_count: self.occurrence_count + 1,
            last_occurrence,
        })
    }
}

/// The mutation of one reminder produced by a trigger.
///
/// `expected_*` carry the state the mutation was computed from; stores use
/// them to reject a row that changed underneath the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advancement {
    pub id: ReminderId,
    pub expected_due_date: NaiveDate,
    pub expected_occurrence_count: u32,
    pub next_due_date: NaiveDate,
    pub occurrence_count: u32,
    pub last_occurrence: DateTime<Utc>,
}

/// Input for inserting a reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub name: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub priority: i64,
    pub recurrence: Recurrence,
    pub category: Option<CategoryId>,
}

impl NewReminder {
    pub fn new(name: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            description: None,
            due_date,
            priority: DEFAULT_PRIORITY,
            recurrence: Recurrence::default(),
            category: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn validate(&self) -> Result<(), NudgeError> {
        if self.name.trim().is_empty() {
            return Err(NudgeError::Validation("reminder name is required".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reminder(due: NaiveDate, recurrence: Recurrence) -> Reminder {
        Reminder {
            id: ReminderId::new(1),
            name: "Pay rent".into(),
            description: None,
            due_date: due,
            priority: 7,
            recurrence,
            category: None,
            last_occurrence: None,
            occurrence_count: 0,
            created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn advance_moves_due_date_and_counts() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 8, 30, 0).unwrap();

        let adv = reminder(due, Recurrence::Monthly).advance(now).unwrap();

        assert_eq!(adv.next_due_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(adv.occurrence_count, 1);
        assert_eq!(adv.last_occurrence, now);
        assert_eq!(adv.expected_due_date, due);
        assert_eq!(adv.expected_occurrence_count, 0);
    }

    #[test]
    fn terminal_recurrence_keeps_due_date() {
        let due = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

        let adv = reminder(due, Recurrence::Once).advance(now).unwrap();

        assert_eq!(adv.next_due_date, due);
        assert_eq!(adv.occurrence_count, 1);
    }

    #[test]
    fn last_occurrence_is_monotonic() {
        let due = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

        let mut r = reminder(due, Recurrence::Daily);
        r.last_occurrence = Some(later);

        assert_eq!(r.advance(now).unwrap().last_occurrence, later);
    }

    #[test]
    fn new_reminder_defaults() {
        let r = NewReminder::new("Water plants", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(r.priority, DEFAULT_PRIORITY);
        assert_eq!(r.recurrence, Recurrence::Yearly);
        assert!(r.category.is_none());
        assert!(r.validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let r = NewReminder::new("  ", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!(matches!(r.validate(), Err(NudgeError::Validation(_))));
    }
}
