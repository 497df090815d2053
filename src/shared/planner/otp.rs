//! One-time passwords, email blocks and refresh-token records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Purpose an OTP was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpChannel {
    Verify,
    ResetPassword,
}

impl OtpChannel {
    /// Parse the `record` field clients send (`"1"` verify, `"2"` reset password)
    pub fn from_record(record: &str) -> Result<Self, SharedError> {
        match record {
            "1" => Ok(OtpChannel::Verify),
            "2" => Ok(OtpChannel::ResetPassword),
            other => Err(SharedError::invalid_code("record", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OtpChannel::Verify => "verify",
            OtpChannel::ResetPassword => "resetpassword",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SharedError> {
        match value {
            "verify" => Ok(OtpChannel::Verify),
            "resetpassword" => Ok(OtpChannel::ResetPassword),
            other => Err(SharedError::invalid_code("otp channel", other)),
        }
    }
}

/// An issued OTP, keyed by (email, channel, reference)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub email: String,
    pub channel: OtpChannel,
    pub reference: String,
    pub code: String,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(
        email: impl Into<String>,
        channel: OtpChannel,
        reference: impl Into<String>,
        code: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            email: email.into(),
            channel,
            reference: reference.into(),
            code: code.into(),
            is_used: false,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Temporary ban on issuing OTPs to an email for one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailBlock {
    pub email: String,
    pub channel: OtpChannel,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl EmailBlock {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// The single refresh-token record kept per user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub user_id: Uuid,
    /// bcrypt hash of the SHA-256 digest of the refresh token
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_in_secs: i64,
    pub revoked: bool,
}

impl TokenRecord {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now <= self.issued_at + Duration::seconds(self.expires_in_secs)
    }
}
