//! Outbound Mail
//!
//! OTP codes reach users by email. Handlers talk to a `Mailer` trait object
//! held in `AppState`, so the transport can be swapped without touching the
//! OTP flow.
//!
//! # Module Structure
//!
//! ```text
//! mail/
//! ├── mod.rs        - Mailer trait, MailError, factory, recording mailer
//! ├── smtp.rs       - lettre SMTP transport
//! └── templates.rs  - OTP email subject and body
//! ```
//!
//! Without SMTP settings the factory returns a mailer that refuses every
//! send, so OTP delivery fails loudly instead of silently dropping codes.

mod smtp;
mod templates;

pub use smtp::SmtpMailer;
pub use templates::OtpEmail;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::shared::config::SmtpSettings;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP send error: {0}")]
    SendFailed(String),

    #[error("Invalid mail configuration: {0}")]
    InvalidConfig(String),

    #[error("SMTP is not configured")]
    NotConfigured,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one HTML message; failures are returned, never retried
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// Build the mailer for the configured transport
pub fn create_mailer(settings: Option<&SmtpSettings>) -> Result<Arc<dyn Mailer>, MailError> {
    match settings {
        Some(settings) => {
            tracing::info!("SMTP mailer configured for {}:{}", settings.host, settings.port);
            Ok(Arc::new(SmtpMailer::new(settings)?))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, OTP emails cannot be delivered");
            Ok(Arc::new(DisabledMailer))
        }
    }
}

/// Mailer used when no SMTP server is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send_html(&self, to: &str, _subject: &str, _html: &str) -> Result<(), MailError> {
        tracing::warn!("Dropping email to {}: no SMTP transport", to);
        Err(MailError::NotConfigured)
    }
}

/// A message captured by `RecordingMailer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// In-memory mailer that keeps every message, for tests and local runs
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    /// Most recent message addressed to `to`
    pub async fn last_to(&self, to: &str) -> Option<SentMail> {
        self.sent.lock().await.iter().rev().find(|m| m.to == to).cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::SendFailed("recording mailer set to fail".to_string()));
        }
        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_mailer_keeps_messages() {
        let mailer = RecordingMailer::new();
        mailer.send_html("a@example.com", "one", "<p>1</p>").await.unwrap();
        mailer.send_html("b@example.com", "two", "<p>2</p>").await.unwrap();
        mailer.send_html("a@example.com", "three", "<p>3</p>").await.unwrap();

        assert_eq!(mailer.sent().await.len(), 3);
        assert_eq!(mailer.last_to("a@example.com").await.unwrap().subject, "three");
        assert!(mailer.last_to("c@example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_failing_mailer() {
        let mailer = RecordingMailer::failing();
        assert!(mailer.send_html("a@example.com", "s", "b").await.is_err());
        assert!(mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_refuses() {
        let mailer = create_mailer(None).unwrap();
        let err = mailer.send_html("a@example.com", "s", "b").await.unwrap_err();
        assert!(matches!(err, MailError::NotConfigured));
    }
}
