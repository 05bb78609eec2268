//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **SqliteReminderStore**: 本番用の正本（SQLite ファイル）
//! - **InMemoryReminderStore**: テスト・開発用の正本
//! - **GotifyNotifier**: Gotify REST API への通知
//! - **RecordingNotifier**: 送信内容を記録するだけ（テスト用）

pub mod gotify;
pub mod inmem_store;
pub mod recording_notifier;
pub mod sqlite_store;

pub use self::gotify::GotifyNotifier;
pub use self::inmem_store::InMemoryReminderStore;
pub use self::recording_notifier::RecordingNotifier;
pub use self::sqlite_store::SqliteReminderStore;
