//! Notifier port - 通知の送信先の抽象化
//!
//! # 実装
//! - `GotifyNotifier`: Gotify の REST API へ POST（本番用）
//! - `RecordingNotifier`: 送信内容を記録するだけ（テスト用）

use async_trait::async_trait;

use crate::domain::{Digest, NudgeError};

/// Notifier は 1 件の Digest を外部へ送る
///
/// # 契約
/// - 内部でリトライしない（失敗はそのまま呼び出し側へ）
/// - タイムアウトは `NudgeError::Transport` として返す
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, digest: &Digest) -> Result<(), NudgeError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    async fn send(&self, digest: &Digest) -> Result<(), NudgeError> {
        (**self).send(digest).await
    }
}
