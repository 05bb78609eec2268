//! Notifier that only records what it was asked to send.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Digest, NudgeError};
use crate::ports::Notifier;

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Digest>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails with a transport error.
    /// Attempts are still recorded.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            failing: true,
        }
    }

    /// Digests passed to `send`, oldest first.
    pub fn sent(&self) -> Vec<Digest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, digest: &Digest) -> Result<(), NudgeError> {
        self.sent
            .lock()
            .map_err(|_| NudgeError::transport("recording notifier lock poisoned"))?
            .push(digest.clone());

        if self.failing {
            return Err(NudgeError::transport("simulated transport failure"));
        }
        Ok(())
    }
}
