use std::time::Duration;
use thiserror::Error;

/// Failure classes surfaced by fetch callbacks and durable storage.
///
/// Transient failures are retried indefinitely by the scheduler; auth
/// failures stop the affected scheduler so a dead session does not spin
/// in a tight failure loop.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("http status {status}")]
    Http { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("poll timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage error: {0}")]
    Storage(String),
}

impl SyncError {
    /// 401-class failures that require session teardown by the caller.
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Http { status: 401 | 403 })
    }

    /// Everything except auth failures is retried with backoff.
    pub fn is_transient(&self) -> bool {
        !self.is_auth()
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Malformed(err.to_string())
    }
}
