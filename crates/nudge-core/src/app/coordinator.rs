//! CycleCoordinator - 1 回のサイクルを駆動する状態機械
//!
//! # フロー
//! 1. Selecting: 評価日の due set を取得（0 件なら Done）
//! 2. Advancing: due set 全体を 1 トランザクションで進行（失敗なら Aborted）
//! 3. Dispatching: silent なら送らずに Done。そうでなければ Digest を組み立てて 1 回だけ送信
//!
//! 送信失敗はコミット済みの進行を巻き戻さない。サイクルは Done で終わり、
//! 手動で通知すべき内容を error ログに残す。

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::Instrument;

use crate::app::advancer::advance_due_set;
use crate::app::selector::select_due;
use crate::app::status::{CycleReport, DispatchOutcome};
use crate::domain::{CycleId, CycleState, Digest, NudgeError, Reminder};
use crate::ports::{Clock, CycleIdGenerator, Notifier, ReminderStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOptions {
    /// Advance state without building or sending a digest.
    pub silent: bool,
}

pub struct CycleCoordinator {
    pub(crate) store: Arc<dyn ReminderStore>,
    pub(crate) notifier: Option<Arc<dyn Notifier>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn CycleIdGenerator>,
    pub(crate) options: CycleOptions,
}

/// Tracks the current state and logs every transition.
struct Progress {
    state: CycleState,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: CycleState::Idle,
        }
    }

    fn advance_to(&mut self, next: CycleState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal cycle transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "cycle state");
        self.state = next;
    }
}

impl CycleCoordinator {
    pub fn options(&self) -> CycleOptions {
        self.options
    }

    /// Run one cycle for `date`, or for the clock's today when `None`.
    ///
    /// Returns `Err` only when the cycle aborts (nothing committed). A failed
    /// notification still returns `Ok` with [`DispatchOutcome::Failed`].
    pub async fn run(&self, date: Option<NaiveDate>) -> Result<CycleReport, NudgeError> {
        let cycle_id = self.ids.generate_cycle_id();
        let date = date.unwrap_or_else(|| self.clock.today());
        let span = tracing::info_span!("cycle", cycle_id = %cycle_id, %date);

        self.run_cycle(cycle_id, date).instrument(span).await
    }

    async fn run_cycle(
        &self,
        cycle_id: CycleId,
        date: NaiveDate,
    ) -> Result<CycleReport, NudgeError> {
        let mut progress = Progress::new();

        progress.advance_to(CycleState::Selecting);
        let due = match select_due(self.store.as_ref(), date) {
            Ok(due) => due,
            Err(err) => return Err(self.abort(&mut progress, err)),
        };
        tracing::info!(count = due.len(), "due reminders");

        let report = |state, advanced, dispatch| CycleReport {
            cycle_id,
            date,
            state,
            due: due.len(),
            advanced,
            dispatch,
            due_names: due.iter().map(|r| r.name.clone()).collect(),
        };

        if due.is_empty() {
            progress.advance_to(CycleState::Done);
            return Ok(report(CycleState::Done, 0, DispatchOutcome::NothingDue));
        }

        progress.advance_to(CycleState::Advancing);
        let now = self.clock.now();
        let advanced = match advance_due_set(self.store.as_ref(), &due, now) {
            Ok(batch) => batch.len(),
            Err(err) => return Err(self.abort(&mut progress, err)),
        };

        progress.advance_to(CycleState::Dispatching);
        let dispatch = self.dispatch(date, &due).await;

        progress.advance_to(CycleState::Done);
        Ok(report(CycleState::Done, advanced, dispatch))
    }

    async fn dispatch(&self, date: NaiveDate, due: &[Reminder]) -> DispatchOutcome {
        if self.options.silent {
            tracing::warn!("silent mode: notification skipped");
            return DispatchOutcome::Suppressed;
        }

        let Some(digest) = Digest::build(date, due) else {
            tracing::warn!("no categorized reminder due: notification skipped");
            return DispatchOutcome::NoCategorized;
        };

        // builder guarantees a notifier whenever silent is off
        let Some(notifier) = &self.notifier else {
            tracing::warn!("no notifier configured: notification skipped");
            return DispatchOutcome::Suppressed;
        };

        match notifier.send(&digest).await {
            Ok(()) => {
                tracing::info!(
                    priority = digest.priority,
                    lines = digest.reminder_ids.len(),
                    "digest sent"
                );
                DispatchOutcome::Delivered
            }
            Err(err) => {
                let names: Vec<&str> = due.iter().map(|r| r.name.as_str()).collect();
                tracing::error!(
                    error = %err,
                    reminders = ?names,
                    "notification failed after state was committed; notify manually"
                );
                DispatchOutcome::Failed(err.to_string())
            }
        }
    }

    fn abort(&self, progress: &mut Progress, err: NudgeError) -> NudgeError {
        tracing::error!(error = %err, kind = ?err.kind(), state = %progress.state, "cycle aborted");
        progress.advance_to(CycleState::Aborted);
        err
    }
}
