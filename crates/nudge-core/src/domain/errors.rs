//! Errors - エラー型と分類
//!
//! コアが返すエラーは `NudgeError` ひとつに集約します。
//! `ErrorKind` はサイクルの終端状態（Done / Aborted）を決めるための運用分類です。

use chrono::NaiveDate;
use thiserror::Error;

use super::ids::ReminderId;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// ErrorKind は実行エラーの分類
///
/// - Fatal: 設定・データの誤り（再実行しても直らない）
/// - Storage: 永続化の失敗（バッチは適用されていない）
/// - Delivery: 通知の失敗（状態はすでに確定している）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fatal,
    Storage,
    Delivery,
}

#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("unknown recurrence kind '{0}'")]
    UnknownRecurrence(String),

    #[error("date out of range: cannot advance {date} ({recurrence})")]
    DateOutOfRange { date: NaiveDate, recurrence: String },

    #[error("storage failure: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("reminder {0} was modified by another run; batch rolled back")]
    ConcurrentModification(ReminderId),

    #[error("missing transport credentials: {0} is not configured")]
    MissingTransportCredentials(&'static str),

    #[error("transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),
}

impl NudgeError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage { .. } | Self::ConcurrentModification(_) => ErrorKind::Storage,
            Self::Transport { .. } => ErrorKind::Delivery,
            Self::UnknownRecurrence(_)
            | Self::DateOutOfRange { .. }
            | Self::MissingTransportCredentials(_)
            | Self::Validation(_)
            | Self::Config(_) => ErrorKind::Fatal,
        }
    }
}
