/**
 * OTP Service
 *
 * One-time codes for email verification and password reset.
 *
 * # Record Lifecycle
 *
 * A record is keyed by (email, channel, reference) and is either
 * `issued` → `verified` (marked used) or `issued` → `expired` (now past
 * `expires_at`). Nothing is ever deleted; the rate limiter counts every
 * unexpired record in the channel, used or not.
 *
 * # Rate Limiting
 *
 * Once `request_limit` unexpired records exist for (email, channel), the
 * next request writes a block that lasts `block_secs`. The count and the
 * block write are a single store operation.
 */

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use thiserror::Error;

use crate::backend::mail::{MailError, Mailer, OtpEmail};
use crate::backend::store::{Store, StoreError};
use crate::shared::config::OtpSettings;
use crate::shared::planner::{OtpChannel, OtpRecord, TokenRecord};

const REFERENCE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("length must be greater than 0")]
    InvalidLength,

    #[error("Invalid reference code")]
    ReferenceNotFound,

    #[error("OTP has already been used")]
    AlreadyUsed,

    #[error("OTP has expired")]
    Expired,

    #[error("Invalid OTP")]
    Mismatch,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Numeric code of exactly `length` digits
pub fn generate_otp(length: usize) -> Result<String, OtpError> {
    if length == 0 {
        return Err(OtpError::InvalidLength);
    }
    let mut rng = rand::rng();
    Ok((0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect())
}

/// Alphanumeric reference of exactly `length` characters; uniqueness is not checked
pub fn generate_reference(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(REFERENCE_CHARS[rng.random_range(0..REFERENCE_CHARS.len())]))
        .collect()
}

pub struct OtpService {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    settings: OtpSettings,
}

impl OtpService {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, settings: OtpSettings) -> Self {
        Self { store, mailer, settings }
    }

    pub fn settings(&self) -> OtpSettings {
        self.settings
    }

    pub fn new_code(&self) -> Result<String, OtpError> {
        generate_otp(self.settings.code_length)
    }

    pub fn new_reference(&self) -> String {
        generate_reference(self.settings.reference_length)
    }

    /// True while an unexpired block exists; an expired one is removed
    pub async fn is_email_blocked(&self, email: &str, channel: OtpChannel) -> Result<bool, OtpError> {
        Ok(self.store.is_blocked(email, channel, Utc::now()).await?)
    }

    /// Block (email, channel) when it has reached the request limit; true if now blocked
    pub async fn check_and_block_if_needed(&self, email: &str, channel: OtpChannel) -> Result<bool, OtpError> {
        let blocked = self
            .store
            .block_if_over_limit(
                email,
                channel,
                Utc::now(),
                self.settings.request_limit,
                Duration::seconds(self.settings.block_secs),
            )
            .await?;
        if blocked {
            tracing::warn!("Blocked {} OTP requests for {}", channel.as_str(), email);
        }
        Ok(blocked)
    }

    pub async fn save_otp_record(
        &self,
        email: &str,
        otp: &str,
        reference: &str,
        channel: OtpChannel,
    ) -> Result<(), OtpError> {
        let record = OtpRecord::new(
            email,
            channel,
            reference,
            otp,
            Utc::now(),
            Duration::seconds(self.settings.ttl_secs),
        );
        self.store.save_otp(record).await?;
        Ok(())
    }

    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), OtpError> {
        self.mailer.send_html(to, subject, html).await?;
        Ok(())
    }

    /// Generate a code for `reference`, mail it, then persist it
    pub async fn deliver(&self, email: &str, reference: &str, channel: OtpChannel) -> Result<(), OtpError> {
        let otp = self.new_code()?;
        let content = OtpEmail::new(channel, &otp, reference);
        self.send_email(email, &content.subject, &content.html).await?;
        self.save_otp_record(email, &otp, reference, channel).await?;
        tracing::info!("Sent {} OTP to {} (ref {})", channel.as_str(), email, reference);
        Ok(())
    }

    /// Read-only gates: record exists, unused, unexpired, code matches
    pub async fn check_code(
        &self,
        email: &str,
        channel: OtpChannel,
        reference: &str,
        code: &str,
    ) -> Result<OtpRecord, OtpError> {
        let record = self
            .store
            .find_otp(email, channel, reference)
            .await?
            .ok_or(OtpError::ReferenceNotFound)?;

        if record.is_used {
            return Err(OtpError::AlreadyUsed);
        }
        if record.is_expired(Utc::now()) {
            return Err(OtpError::Expired);
        }
        if record.code != code {
            return Err(OtpError::Mismatch);
        }
        Ok(record)
    }

    /// Mark the record used, applying `verification` in the same write
    ///
    /// Losing a race to another consumer reports `AlreadyUsed`.
    pub async fn consume(
        &self,
        email: &str,
        channel: OtpChannel,
        reference: &str,
        verification: Option<TokenRecord>,
    ) -> Result<(), OtpError> {
        let consumed = self
            .store
            .consume_otp(email, channel, reference, Utc::now(), verification)
            .await?;
        if !consumed {
            return Err(OtpError::AlreadyUsed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mail::RecordingMailer;
    use crate::backend::store::MemoryStore;

    fn service_with(mailer: Arc<RecordingMailer>) -> (OtpService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = OtpService::new(store.clone(), mailer, OtpSettings::default());
        (service, store)
    }

    #[test]
    fn test_generate_otp_is_numeric() {
        let otp = generate_otp(6).unwrap();
        assert_eq!(otp.len(), 6);
        assert!(otp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_otp_zero_length() {
        assert!(matches!(generate_otp(0), Err(OtpError::InvalidLength)));
    }

    #[test]
    fn test_generate_reference_is_alphanumeric() {
        let reference = generate_reference(10);
        assert_eq!(reference.len(), 10);
        assert!(reference.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(generate_reference(0), "");
    }

    #[tokio::test]
    async fn test_deliver_sends_then_saves() {
        let mailer = Arc::new(RecordingMailer::new());
        let (service, store) = service_with(mailer.clone());

        service.deliver("ann@example.com", "REF0000001", OtpChannel::Verify).await.unwrap();

        let mail = mailer.last_to("ann@example.com").await.unwrap();
        let record = store
            .find_otp("ann@example.com", OtpChannel::Verify, "REF0000001")
            .await
            .unwrap()
            .unwrap();
        assert!(mail.html.contains(&record.code));
        assert!(!record.is_used);
        assert_eq!(record.expires_at - record.created_at, Duration::minutes(15));
    }

    #[tokio::test]
    async fn test_failed_send_saves_nothing() {
        let (service, store) = service_with(Arc::new(RecordingMailer::failing()));

        let err = service.deliver("ann@example.com", "REF", OtpChannel::Verify).await.unwrap_err();
        assert!(matches!(err, OtpError::Mail(_)));
        assert!(store.find_otp("ann@example.com", OtpChannel::Verify, "REF").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_check_code_gates() {
        let (service, _store) = service_with(Arc::new(RecordingMailer::new()));
        service.save_otp_record("ann@example.com", "123456", "REF", OtpChannel::ResetPassword).await.unwrap();

        assert!(matches!(
            service.check_code("ann@example.com", OtpChannel::ResetPassword, "NOPE", "123456").await,
            Err(OtpError::ReferenceNotFound)
        ));
        assert!(matches!(
            service.check_code("ann@example.com", OtpChannel::Verify, "REF", "123456").await,
            Err(OtpError::ReferenceNotFound)
        ));
        assert!(matches!(
            service.check_code("ann@example.com", OtpChannel::ResetPassword, "REF", "654321").await,
            Err(OtpError::Mismatch)
        ));
        assert!(service
            .check_code("ann@example.com", OtpChannel::ResetPassword, "REF", "123456")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_expired_code_rejected_even_when_correct() {
        let (service, store) = service_with(Arc::new(RecordingMailer::new()));
        let issued = Utc::now() - Duration::minutes(16);
        let record = OtpRecord::new("ann@example.com", OtpChannel::Verify, "OLD", "111111", issued, Duration::minutes(15));
        store.save_otp(record).await.unwrap();

        assert!(matches!(
            service.check_code("ann@example.com", OtpChannel::Verify, "OLD", "111111").await,
            Err(OtpError::Expired)
        ));
    }

    #[tokio::test]
    async fn test_consume_once() {
        let (service, _store) = service_with(Arc::new(RecordingMailer::new()));
        service.save_otp_record("ann@example.com", "123456", "REF", OtpChannel::ResetPassword).await.unwrap();

        service.consume("ann@example.com", OtpChannel::ResetPassword, "REF", None).await.unwrap();
        assert!(matches!(
            service.consume("ann@example.com", OtpChannel::ResetPassword, "REF", None).await,
            Err(OtpError::AlreadyUsed)
        ));
        assert!(matches!(
            service.check_code("ann@example.com", OtpChannel::ResetPassword, "REF", "123456").await,
            Err(OtpError::AlreadyUsed)
        ));
    }

    #[tokio::test]
    async fn test_third_request_triggers_block() {
        let (service, _store) = service_with(Arc::new(RecordingMailer::new()));
        let email = "ann@example.com";

        for (i, reference) in ["R1", "R2", "R3"].iter().enumerate() {
            assert!(!service.is_email_blocked(email, OtpChannel::Verify).await.unwrap());
            assert!(!service.check_and_block_if_needed(email, OtpChannel::Verify).await.unwrap(), "request {}", i);
            service.save_otp_record(email, "000000", reference, OtpChannel::Verify).await.unwrap();
        }

        assert!(service.check_and_block_if_needed(email, OtpChannel::Verify).await.unwrap());
        assert!(service.is_email_blocked(email, OtpChannel::Verify).await.unwrap());
        assert!(!service.is_email_blocked(email, OtpChannel::ResetPassword).await.unwrap());
    }
}
