//! Domain identifiers (strongly-typed IDs).
//!
//! Reminder と Category はストレージが採番する整数 ID を持ちます。
//! Phantom type パターンで `ReminderId` と `CategoryId` を混同できないようにしています。
//!
//! サイクル（1 回の実行）には ULID ベースの `CycleId` を振り、ログの相関に使います。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"reminder-", "category-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ストレージ採番の整数 ID
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: i64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> i64 {
        self.value
    }
}

impl<T: IdMarker> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReminderMarker {}

impl IdMarker for ReminderMarker {
    fn prefix() -> &'static str {
        "reminder-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryMarker {}

impl IdMarker for CategoryMarker {
    fn prefix() -> &'static str {
        "category-"
    }
}

/// Identifier of a Reminder (immutable once assigned by storage).
pub type ReminderId = Id<ReminderMarker>;

/// Identifier of a Category.
pub type CategoryId = Id<CategoryMarker>;

/// Identifier of one evaluation cycle.
///
/// ULID なので生成順にソートでき、ログの時系列と一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CycleId(Ulid);

impl CycleId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for CycleId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_prefix() {
        let reminder = ReminderId::new(7);
        let category = CategoryId::new(7);

        assert_eq!(reminder.to_string(), "reminder-7");
        assert_eq!(category.to_string(), "category-7");
        assert_eq!(reminder.get(), category.get());

        // let _: ReminderId = category; // <- does not compile
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let id = ReminderId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");

        let back: ReminderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn cycle_ids_are_sortable() {
        let first = CycleId::from_ulid(Ulid::from_parts(1_000, 5));
        let second = CycleId::from_ulid(Ulid::from_parts(2_000, 1));

        assert!(first < second);
        assert!(first.to_string().starts_with("cycle-"));
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<ReminderId>(), size_of::<i64>());
        assert_eq!(size_of::<CategoryId>(), size_of::<i64>());
    }
}
