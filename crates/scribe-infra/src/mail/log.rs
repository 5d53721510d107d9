//! Mailer that writes messages to the log instead of delivering them.

use async_trait::async_trait;

use scribe_core::ports::{EmailMessage, MailError, Mailer};

use super::mask_email;

/// Development transport: every message becomes one `info` event.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if message.to.is_empty() {
            return Err(MailError::NoRecipients);
        }

        let recipients: Vec<String> = message.to.iter().map(|to| mask_email(to)).collect();
        tracing::info!(
            from = %mask_email(&message.from),
            to = ?recipients,
            subject = %message.subject,
            body_len = message.body.len(),
            "Email sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_message_without_recipients() {
        let mailer = LogMailer::new();
        let message = EmailMessage {
            from: "webmaster@localhost".into(),
            to: vec![],
            subject: "Hi".into(),
            body: String::new(),
        };

        assert!(matches!(
            mailer.send(message).await,
            Err(MailError::NoRecipients)
        ));
    }
}
