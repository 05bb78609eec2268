//! Status - 1 サイクルの結果報告
//!
//! CLI はこの報告から終了コードとサマリ出力を決める。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CycleId, CycleState};

/// What happened to the digest in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// Nothing was due, so nothing was built.
    NothingDue,

    /// Silent mode: state advanced, no message sent.
    Suppressed,

    /// Reminders advanced but none had a category.
    NoCategorized,

    Delivered,

    /// The transport failed after state was committed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub date: NaiveDate,
    pub state: CycleState,

    /// Size of the due set.
    pub due: usize,

    /// Reminders whose recurrence was committed (0 or `due`).
    pub advanced: usize,

    pub dispatch: DispatchOutcome,

    /// Names of the reminders that were due, in selection order.
    pub due_names: Vec<String>,
}

impl CycleReport {
    /// State committed but the user was not told about it.
    pub fn needs_manual_notice(&self) -> bool {
        matches!(self.dispatch, DispatchOutcome::Failed(_))
    }
}
