//! Outgoing e-mail.
//!
//! `SmtpMailer` talks to the configured relay through lettre's async transport.
//! When no SMTP host is configured the server gets a `DisabledMailer` instead,
//! so the send endpoints answer with an error rather than silently dropping mail.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use tracing::{error, info, instrument};

use configs::MailConfig;

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError>;
}

/// Build the MIME message: plain text, or mixed multipart when attachments are present.
pub fn build_message(from: &str, email: &OutgoingEmail) -> Result<Message, ServiceError> {
    let from: Mailbox = from.parse().map_err(|e| ServiceError::Mail(format!("invalid from address: {e}")))?;
    let to: Mailbox = email
        .to
        .trim()
        .parse()
        .map_err(|e| ServiceError::Validation(format!("invalid recipient: {e}")))?;
    if email.subject.trim().is_empty() {
        return Err(ServiceError::Validation("subject is required".into()));
    }
    let builder = Message::builder().from(from).to(to).subject(email.subject.trim());
    let message = if email.attachments.is_empty() {
        builder.header(ContentType::TEXT_PLAIN).body(email.text.clone())
    } else {
        let mut parts = MultiPart::mixed().singlepart(
            SinglePart::builder().header(ContentType::TEXT_PLAIN).body(email.text.clone()),
        );
        for a in &email.attachments {
            let ct = ContentType::parse(&a.content_type)
                .or_else(|_| ContentType::parse("application/octet-stream"))
                .map_err(|e| ServiceError::Mail(e.to_string()))?;
            parts = parts.singlepart(MailAttachment::new(a.file_name.clone()).body(a.bytes.clone(), ct));
        }
        builder.multipart(parts)
    };
    message.map_err(|e| ServiceError::Mail(e.to_string()))
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> Result<Self, ServiceError> {
        let builder = if cfg.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host).map_err(|e| ServiceError::Mail(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.smtp_host)
        };
        let mut builder = builder.port(cfg.smtp_port);
        if !cfg.username.is_empty() {
            builder = builder.credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()));
        }
        Ok(Self { transport: builder.build(), from: cfg.from_address.clone() })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(to = %email.to, attachments = email.attachments.len()))]
    async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
        let message = build_message(&self.from, &email)?;
        match self.transport.send(message).await {
            Ok(_) => {
                info!("email_sent");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "email_failed");
                Err(ServiceError::Mail(e.to_string()))
            }
        }
    }
}

/// Stand-in used when SMTP is not configured.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), ServiceError> {
        Err(ServiceError::Mail("mail is not configured".into()))
    }
}

/// Records messages instead of sending them.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MockMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
        build_message("noreply@licensing.local", &email)?;
        self.sent
            .lock()
            .map_err(|_| ServiceError::Mail("mock mailer poisoned".into()))?
            .push(email);
        Ok(())
    }
}

pub fn mailer_from_config(cfg: &MailConfig) -> Result<Arc<dyn Mailer>, ServiceError> {
    if cfg.is_enabled() {
        Ok(Arc::new(SmtpMailer::new(cfg)?))
    } else {
        Ok(Arc::new(DisabledMailer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "manager@licensing.com".into(),
            subject: "Лицензия".into(),
            text: "Добрый день".into(),
            attachments: vec![],
        }
    }

    #[test]
    fn plain_message_builds() {
        let msg = build_message("noreply@licensing.local", &email()).unwrap();
        let raw = String::from_utf8(msg.formatted()).unwrap();
        assert!(raw.contains("To: manager@licensing.com"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[test]
    fn attachments_make_multipart() {
        let mut e = email();
        e.attachments.push(Attachment { file_name: "scan.pdf".into(), content_type: "application/pdf".into(), bytes: b"%PDF".to_vec() });
        let raw = String::from_utf8(build_message("noreply@licensing.local", &e).unwrap().formatted()).unwrap();
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("filename=\"scan.pdf\""));
    }

    #[test]
    fn bad_recipient_is_validation_error() {
        let mut e = email();
        e.to = "not an address".into();
        assert!(matches!(build_message("noreply@licensing.local", &e), Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn disabled_and_mock_mailers() {
        assert!(matches!(DisabledMailer.send(email()).await, Err(ServiceError::Mail(_))));
        let mock = MockMailer::default();
        mock.send(email()).await.unwrap();
        assert_eq!(mock.sent().len(), 1);
        let cfg = MailConfig::default();
        assert!(mailer_from_config(&cfg).is_ok());
    }
}
