//! State - サイクルの状態
//!
//! 1 回の実行（サイクル）は次の順で遷移します。
//! - Idle → Selecting → Advancing → Dispatching → Done
//! - どの状態からでも回復不能な失敗で Aborted へ
//! - Selecting で対象が 0 件なら Done へ直行

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleState {
    /// Constructed, nothing queried yet.
    Idle,

    /// Querying the due set for the evaluation date.
    Selecting,

    /// Persisting the advancement of the whole due set in one transaction.
    Advancing,

    /// Building and sending the digest (or skipping it in silent mode).
    Dispatching,

    /// Finished; state is committed.
    Done,

    /// Finished without committing anything.
    Aborted,
}

impl CycleState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, CycleState::Done | CycleState::Aborted)
    }

    /// Is `next` a legal transition from `self`?
    pub fn can_transition_to(self, next: CycleState) -> bool {
        use CycleState::*;
        match (self, next) {
            (Done | Aborted, _) => false,
            (_, Aborted) => true,
            (Idle, Selecting) => true,
            (Selecting, Advancing | Done) => true,
            (Advancing, Dispatching) => true,
            (Dispatching, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::start(CycleState::Idle, CycleState::Selecting)]
    #[case::nothing_due(CycleState::Selecting, CycleState::Done)]
    #[case::something_due(CycleState::Selecting, CycleState::Advancing)]
    #[case::committed(CycleState::Advancing, CycleState::Dispatching)]
    #[case::dispatched(CycleState::Dispatching, CycleState::Done)]
    #[case::abort_from_idle(CycleState::Idle, CycleState::Aborted)]
    #[case::abort_from_advancing(CycleState::Advancing, CycleState::Aborted)]
    fn legal_transitions(#[case] from: CycleState, #[case] to: CycleState) {
        assert!(from.can_transition_to(to));
    }

    #[rstest]
    #[case::skip_advancing(CycleState::Selecting, CycleState::Dispatching)]
    #[case::backwards(CycleState::Advancing, CycleState::Selecting)]
    #[case::from_done(CycleState::Done, CycleState::Selecting)]
    #[case::from_aborted(CycleState::Aborted, CycleState::Aborted)]
    #[case::advancing_to_done(CycleState::Advancing, CycleState::Done)]
    fn illegal_transitions(#[case] from: CycleState, #[case] to: CycleState) {
        assert!(!from.can_transition_to(to));
    }

    #[test]
    fn terminal_states() {
        assert!(CycleState::Done.is_terminal());
        assert!(CycleState::Aborted.is_terminal());
        assert!(!CycleState::Dispatching.is_terminal());
    }
}
