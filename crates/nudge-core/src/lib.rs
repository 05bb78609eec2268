//! nudge-core
//!
//! Core of the recurring-reminder engine: once per run, select the reminders
//! due on the evaluation date, advance their recurrence in one transaction,
//! and send a single digest notification.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, recurrence, reminder, digest, state, errors）
//! - **ports**: 抽象化レイヤー（ReminderStore, Notifier, Clock, CycleIdGenerator）
//! - **app**: サイクルの実装（selector, advancer, coordinator, builder, status）
//! - **impls**: 実装（SQLite, in-memory, Gotify, recording）
//! - **config**: 環境変数からの設定読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
