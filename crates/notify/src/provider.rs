use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::EmailMessage;

/// Email delivery backend.
///
/// Implementations report failures as values; the dispatcher decides whether
/// to retry and never lets them reach its caller.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), ProviderError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request never got a response (DNS, connect, TLS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    /// Throttled or server-side failure (429 / 5xx).
    #[error("provider unavailable (status {status}): {body}")]
    Unavailable { status: u16, body: String },

    /// The provider refused the message (bad recipient, bad key, bad payload).
    #[error("message rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("provider client could not be built: {0}")]
    Client(String),
}

impl ProviderError {
    /// Whether a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport(_) | ProviderError::Timeout(_) | ProviderError::Unavailable { .. }
        )
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        if status == 429 || (500..600).contains(&status) {
            ProviderError::Unavailable { status, body }
        } else {
            ProviderError::Rejected { status, body }
        }
    }
}
