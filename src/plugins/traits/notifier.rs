use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationResult {
    pub message_id: Option<String>,
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Connect or read timeout talking to the messaging API. Worth retrying.
    #[error("Timed out")]
    TimedOut,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Message rejected ({status}): {description}")]
    Rejected { status: u16, description: String },
}

impl DeliveryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, DeliveryError::TimedOut)
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeliveryError::TimedOut
        } else {
            DeliveryError::Http(err)
        }
    }
}

/// Trait for implementing notification channels (Telegram, ...)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    /// Human-readable channel name, used in log lines.
    fn name(&self) -> &'static str;

    /// Delivers one plain-text message to the configured destination.
    async fn send(&self, text: &str) -> Result<NotificationResult, DeliveryError>;
}
