//! ReminderStore port - リマインダーの正本（source of truth）
//!
//! ReminderStore は以下を管理します：
//! - Reminder / Category のレコード
//! - 評価日に期限を迎えたリマインダーの検索（category を join 済み）
//! - 進行（advance）結果のバッチ適用
//!
//! # 実装
//! - `SqliteReminderStore`（本番用）
//! - `InMemoryReminderStore`（テスト・開発用）

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Advancement, Category, NudgeError, NewReminder, Reminder, ReminderId};

/// ReminderStore は状態の正本
///
/// # 設計原則
/// - `apply_advancements` はバッチ全体で 1 トランザクション（all-or-nothing）
/// - 失敗時、バッチ内のどのリマインダーも部分的に進行していない
/// - 既存の Category は読み取りのみ（名前の一意性はストレージ側で保証）
pub trait ReminderStore: Send + Sync {
    /// Reminders whose due date is exactly `date`, ordered by id.
    fn due_on(&self, date: NaiveDate) -> Result<Vec<Reminder>, NudgeError>;

    /// Persist the whole batch atomically.
    ///
    /// Each advancement is applied only if the stored row still matches its
    /// `expected_*` fields; otherwise nothing is applied and
    /// `ConcurrentModification` is returned.
    fn apply_advancements(&self, batch: &[Advancement]) -> Result<(), NudgeError>;

    /// All reminders, ordered by id.
    fn list_reminders(&self) -> Result<Vec<Reminder>, NudgeError>;

    fn insert_reminder(
        &self,
        reminder: &NewReminder,
        created: DateTime<Utc>,
    ) -> Result<ReminderId, NudgeError>;

    fn find_category(&self, name: &str) -> Result<Option<Category>, NudgeError>;

    /// Fails with `Storage` if the name is already taken.
    fn create_category(&self, name: &str) -> Result<Category, NudgeError>;
}

impl<S: ReminderStore + ?Sized> ReminderStore for std::sync::Arc<S> {
    fn due_on(&self, date: NaiveDate) -> Result<Vec<Reminder>, NudgeError> {
        (**self).due_on(date)
    }

    fn apply_advancements(&self, batch: &[Advancement]) -> Result<(), NudgeError> {
        (**self).apply_advancements(batch)
    }

    fn list_reminders(&self) -> Result<Vec<Reminder>, NudgeError> {
        (**self).list_reminders()
    }

    fn insert_reminder(
        &self,
        reminder: &NewReminder,
        created: DateTime<Utc>,
    ) -> Result<ReminderId, NudgeError> {
        (**self).insert_reminder(reminder, created)
    }

    fn find_category(&self, name: &str) -> Result<Option<Category>, NudgeError> {
        (**self).find_category(name)
    }

    fn create_category(&self, name: &str) -> Result<Category, NudgeError> {
        (**self).create_category(name)
    }
}
