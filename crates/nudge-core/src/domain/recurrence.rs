//! Recurrence policy: how a due date moves after a reminder triggers.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::errors::NudgeError;

/// Recurrence kind of a reminder.
///
/// State transitions of a due date:
/// - Daily / Weekly: fixed number of days
/// - Monthly / Quarterly / Yearly: calendar months, clamped to the last day
///   of the target month when the day does not exist there
/// - Once: terminal, the due date never moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Once,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    #[default]
    Yearly,
}

impl Recurrence {
    pub const ALL: [Recurrence; 6] = [
        Recurrence::Once,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Quarterly,
        Recurrence::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Recurrence::Once => "once",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Quarterly => "quarterly",
            Recurrence::Yearly => "yearly",
        }
    }

    /// Is this a terminal kind (no next occurrence)?
    pub fn is_terminal(self) -> bool {
        matches!(self, Recurrence::Once)
    }

    /// Next due date after `date`.
    ///
    /// Returns `Ok(None)` for a terminal kind. `DateOutOfRange` is only
    /// possible at the very end of chrono's supported calendar.
    pub fn next_due_date(self, date: NaiveDate) -> Result<Option<NaiveDate>, NudgeError> {
        let next = match self {
            Recurrence::Once => return Ok(None),
            Recurrence::Daily => date.checked_add_days(Days::new(1)),
            Recurrence::Weekly => date.checked_add_days(Days::new(7)),
            // checked_add_months clamps to the last valid day of the target month
            Recurrence::Monthly => date.checked_add_months(Months::new(1)),
            Recurrence::Quarterly => date.checked_add_months(Months::new(3)),
            Recurrence::Yearly => date.checked_add_months(Months::new(12)),
        };

        next.map(Some).ok_or_else(|| NudgeError::DateOutOfRange {
            date,
            recurrence: self.to_string(),
        })
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = NudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recurrence::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| NudgeError::UnknownRecurrence(s.to_string()))
    }
}
