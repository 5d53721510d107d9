//! Mailer that keeps an outbox in memory, for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use scribe_core::ports::{EmailMessage, MailError, Mailer};

/// Collects every sent message.
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if message.to.is_empty() {
            return Err(MailError::NoRecipients);
        }

        self.outbox
            .lock()
            .map_err(|e| MailError::Transport(e.to_string()))?
            .push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbox_keeps_sent_messages() {
        let mailer = InMemoryMailer::new();
        let message = EmailMessage {
            from: "webmaster@localhost".into(),
            to: vec!["bob@example.com".into()],
            subject: "Hi".into(),
            body: "Body".into(),
        };

        mailer.send(message.clone()).await.unwrap();

        assert_eq!(mailer.sent(), vec![message]);
    }
}
