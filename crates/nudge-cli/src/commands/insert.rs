use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use nudge_core::config::Settings;
use nudge_core::domain::{Category, DEFAULT_PRIORITY, NewReminder, Recurrence};
use nudge_core::ports::{Clock, ReminderStore, SystemClock};

use super::open_store;

#[derive(Debug, Args)]
pub struct InsertArgs {
    /// Name or title of the reminder
    pub name: String,

    /// First due date (YYYY-MM-DD)
    pub date: NaiveDate,

    /// Recurrence: once, daily, weekly, monthly, quarterly or yearly
    #[arg(long, default_value_t = Recurrence::Yearly)]
    pub recurring: Recurrence,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, default_value_t = DEFAULT_PRIORITY)]
    pub priority: i64,

    /// Category name; only categorized reminders appear in the digest
    #[arg(long)]
    pub category: Option<String>,

    /// Create the category when it does not exist yet
    #[arg(long, requires = "category")]
    pub create_category: bool,
}

pub fn run(settings: &Settings, database: Option<&Path>, args: InsertArgs) -> Result<ExitCode> {
    let store = open_store(settings, database)?;
    let id = insert(&store, &SystemClock, args)?;
    tracing::info!(reminder = %id, "reminder added");
    Ok(ExitCode::SUCCESS)
}

fn insert<S: ReminderStore, C: Clock>(
    store: &S,
    clock: &C,
    args: InsertArgs,
) -> Result<nudge_core::domain::ReminderId> {
    let category = match &args.category {
        Some(name) => resolve_category(store, name, args.create_category)?,
        None => None,
    };

    let mut reminder = NewReminder::new(args.name, args.date)
        .with_recurrence(args.recurring)
        .with_priority(args.priority);
    if let Some(description) = args.description {
        reminder = reminder.with_description(description);
    }
    if let Some(category) = &category {
        reminder = reminder.with_category(category.id);
    }

    store
        .insert_reminder(&reminder, clock.now())
        .context("failed to insert reminder")
}

fn resolve_category<S: ReminderStore>(store: &S, name: &str, create: bool) -> Result<Option<Category>> {
    if let Some(category) = store.find_category(name)? {
        tracing::debug!(category = name, "found existing category");
        return Ok(Some(category));
    }
    if create {
        tracing::info!(category = name, "adding category");
        return Ok(Some(store.create_category(name)?));
    }
    tracing::warn!(
        category = name,
        "category does not exist; storing reminder without category (pass --create-category to add it)"
    );
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nudge_core::impls::InMemoryReminderStore;
    use nudge_core::ports::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 2, 10, 18, 0, 0).unwrap())
    }

    fn args(category: Option<&str>, create_category: bool) -> InsertArgs {
        InsertArgs {
            name: "Pay rent".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            recurring: Recurrence::Monthly,
            description: None,
            priority: 7,
            category: category.map(str::to_string),
            create_category,
        }
    }

    #[test]
    fn creates_category_when_asked() {
        let store = InMemoryReminderStore::new();
        let id = insert(&store, &clock(), args(Some("bills"), true)).unwrap();

        let stored = store.get(id).unwrap();
        assert_eq!(stored.category.map(|c| c.name), Some("bills".to_string()));
        assert_eq!(stored.priority, 7);
        assert_eq!(stored.created, clock().now());
    }

    #[test]
    fn unknown_category_without_flag_is_dropped() {
        let store = InMemoryReminderStore::new();
        let id = insert(&store, &clock(), args(Some("bills"), false)).unwrap();

        assert!(store.get(id).unwrap().category.is_none());
        assert!(store.find_category("bills").unwrap().is_none());
    }

    #[test]
    fn existing_category_is_reused() {
        let store = InMemoryReminderStore::new();
        let bills = store.create_category("bills").unwrap();
        let id = insert(&store, &clock(), args(Some("bills"), true)).unwrap();

        assert_eq!(store.get(id).unwrap().category, Some(bills));
    }
}
