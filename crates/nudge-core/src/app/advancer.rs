//! Advancer - 期日を迎えたリマインダーの次回日付を一括で確定
//!
//! # 原子性
//! - まず全件の Advancement を計算する（ここで失敗すれば何も書かない）
//! - 計算できたら 1 回の `apply_advancements` で全件をコミット
//! - ストア側は全件成功か全件ロールバックのどちらか

use chrono::{DateTime, Utc};

use crate::domain::{Advancement, NudgeError, Reminder};
use crate::ports::ReminderStore;

/// Compute and commit the advancement of every reminder in `due`.
///
/// An empty slice is a no-op and opens no transaction.
pub fn advance_due_set<S: ReminderStore + ?Sized>(
    store: &S,
    due: &[Reminder],
    now: DateTime<Utc>,
) -> Result<Vec<Advancement>, NudgeError> {
    if due.is_empty() {
        return Ok(Vec::new());
    }

    let batch = due
        .iter()
        .map(|reminder| reminder.advance(now))
        .collect::<Result<Vec<_>, _>>()?;

    store.apply_advancements(&batch)?;

    for adv in &batch {
        tracing::debug!(
            reminder = %adv.id,
            next_due_date = %adv.next_due_date,
            occurrence_count = adv.occurrence_count,
            "advanced"
        );
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewReminder, Recurrence};
    use crate::impls::InMemoryReminderStore;
    use chrono::{NaiveDate, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 8, 30, 0).unwrap()
    }

    #[test]
    fn empty_set_commits_nothing() {
        let store = InMemoryReminderStore::new();
        let batch = advance_due_set(&store, &[], now()).unwrap();
        assert!(batch.is_empty());
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn whole_set_is_committed_once() {
        let store = InMemoryReminderStore::new();
        let monthly = store
            .insert_reminder(
                &NewReminder::new("rent", date(2024, 1, 31)).with_recurrence(Recurrence::Monthly),
                now(),
            )
            .unwrap();
        let daily = store
            .insert_reminder(
                &NewReminder::new("pills", date(2024, 1, 31)).with_recurrence(Recurrence::Daily),
                now(),
            )
            .unwrap();
        let due = store.due_on(date(2024, 1, 31)).unwrap();

        let batch = advance_due_set(&store, &due, now()).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(store.commit_count(), 1);
        assert_eq!(store.get(monthly).unwrap().due_date, date(2024, 2, 29));
        assert_eq!(store.get(daily).unwrap().due_date, date(2024, 2, 1));
        assert_eq!(store.get(daily).unwrap().last_occurrence, Some(now()));
    }

    #[test]
    fn commit_failure_leaves_every_reminder_untouched() {
        let store = InMemoryReminderStore::new();
        let a = store
            .insert_reminder(&NewReminder::new("a", date(2024, 1, 31)), now())
            .unwrap();
        let due = store.due_on(date(2024, 1, 31)).unwrap();

        store.fail_next_commit();
        let err = advance_due_set(&store, &due, now()).unwrap_err();

        assert!(matches!(err, NudgeError::Storage { .. }));
        let untouched = store.get(a).unwrap();
        assert_eq!(untouched.due_date, date(2024, 1, 31));
        assert_eq!(untouched.occurrence_count, 0);
        assert_eq!(untouched.last_occurrence, None);
    }
}
