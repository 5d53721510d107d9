//! Outbound email port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mail transport - abstraction over SMTP relays, providers or test outboxes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("No recipients")]
    NoRecipients,

    #[error("Transport failed: {0}")]
    Transport(String),
}
