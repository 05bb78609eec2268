//! Selector - 評価日に期日を迎えたリマインダーの抽出
//!
//! 読み取りのみ。同じ日付で何度呼んでも同じ結果になる（状態を変えない）。

use chrono::NaiveDate;

use crate::domain::{NudgeError, Reminder};
use crate::ports::ReminderStore;

/// Reminders whose `due_date` equals `date` exactly, ordered by id.
///
/// Reminders whose date already passed are not caught up.
pub fn select_due<S: ReminderStore + ?Sized>(
    store: &S,
    date: NaiveDate,
) -> Result<Vec<Reminder>, NudgeError> {
    let due = store.due_on(date)?;
    tracing::debug!(%date, count = due.len(), "selected due reminders");
    Ok(due)
}
