//! Email service for late-loan notifications

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// Outgoing mail seam
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one plain-text message addressed to every recipient
    async fn send_mail(&self, message: &str, recipients: &[String]) -> AppResult<()>;
}

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Build one message for every parseable recipient. Returns `None` when
    /// no recipient address is usable.
    fn build_message(&self, body: &str, recipients: &[String]) -> AppResult<Option<Message>> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Library API");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let mut builder = Message::builder()
            .from(from_mailbox)
            .subject(&self.config.late_loan_subject)
            .header(ContentType::TEXT_PLAIN);

        let mut addressed = 0;
        for to in recipients {
            match Mailbox::from_str(to) {
                Ok(to_mailbox) => {
                    builder = builder.to(to_mailbox);
                    addressed += 1;
                }
                Err(e) => tracing::warn!(recipient = %to, "Skipping invalid email address: {}", e),
            }
        }

        if addressed == 0 {
            return Ok(None);
        }

        builder
            .body(body.to_string())
            .map(Some)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> AppResult<SmtpTransport> {
        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) = (
            &self.config.smtp_username,
            &self.config.smtp_password,
        ) {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        Ok(mailer_builder.build())
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send_mail(&self, message: &str, recipients: &[String]) -> AppResult<()> {
        if recipients.is_empty() {
            return Ok(());
        }

        let Some(email) = self.build_message(message, recipients)? else {
            tracing::warn!("No valid recipient for late-loan email");
            return Ok(());
        };
        let mailer = self.transport()?;

        // SmtpTransport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        tracing::info!(recipients = recipients.len(), "Late-loan email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EmailService {
        EmailService::new(EmailConfig::default())
    }

    #[test]
    fn test_message_addresses_every_recipient() {
        let recipients = vec![
            "junior@example.com".to_string(),
            "daniel@example.com".to_string(),
        ];
        let message = service().build_message("Return it", &recipients).unwrap().unwrap();

        let to = message.headers().get_raw("To").unwrap();
        assert!(to.contains("junior@example.com"));
        assert!(to.contains("daniel@example.com"));
        let subject = message.headers().get_raw("Subject").unwrap();
        assert_eq!(subject, "Book with late loan");
    }

    #[test]
    fn test_invalid_recipient_is_skipped() {
        let recipients = vec![
            "not an address".to_string(),
            "junior@example.com".to_string(),
        ];
        let message = service().build_message("Return it", &recipients).unwrap().unwrap();

        let to = message.headers().get_raw("To").unwrap();
        assert!(to.contains("junior@example.com"));
        assert!(!to.contains("not an address"));
    }

    #[test]
    fn test_only_invalid_recipients_builds_nothing() {
        let message = service()
            .build_message("Return it", &["not an address".to_string()])
            .unwrap();
        assert!(message.is_none());
    }

    #[tokio::test]
    async fn test_only_invalid_recipients_is_noop() {
        service()
            .send_mail("Return it", &["not an address".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_recipients_is_noop() {
        service().send_mail("Return it", &[]).await.unwrap();
    }
}
