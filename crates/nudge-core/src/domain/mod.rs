//! Domain model (ids, recurrence, reminders, digest, cycle state, errors).

pub mod digest;
pub mod errors;
pub mod ids;
pub mod recurrence;
pub mod reminder;
pub mod state;

pub use self::digest::{DIGEST_CONTENT_TYPE, DIGEST_TITLE, Digest};
pub use self::errors::{ErrorKind, NudgeError};
pub use self::ids::{CategoryId, CycleId, ReminderId};
pub use self::recurrence::Recurrence;
pub use self::reminder::{Advancement, Category, DEFAULT_PRIORITY, NewReminder, Reminder};
pub use self::state::CycleState;
