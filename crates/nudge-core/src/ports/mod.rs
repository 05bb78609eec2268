//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（SQLite, Gotify, システム時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ストレージが source of truth（正本）
//! - 通知は状態確定のあとに送る（ロールバックしない）
//! - 時刻は Clock 経由でのみ取得する

pub mod clock;
pub mod id_generator;
pub mod notifier;
pub mod reminder_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{CycleIdGenerator, UlidCycleIdGenerator};
pub use self::notifier::Notifier;
pub use self::reminder_store::ReminderStore;
