/**
 * Authentication Handler Types
 *
 * Request and response bodies for the `/auth` routes. Field names follow
 * the wire format clients already use (`ref`, `record`, camelCase token
 * fields).
 *
 * Request fields default to empty so a missing field is reported as
 * "<field> is required" rather than a generic body rejection.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::sessions::TokenPair;
use crate::shared::planner::{PublicUser, Role};

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct SignupResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Returned by sign-in
#[derive(Serialize, Debug)]
pub struct SigninResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: TokenPair,
}

#[derive(Serialize, Debug)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct GoogleLoginRequest {
    pub email: String,
    pub name: String,
    pub profile: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct GoogleUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Serialize, Debug)]
pub struct GoogleLoginResponse {
    pub success: bool,
    pub message: String,
    pub status: String,
    pub user: GoogleUser,
    pub token: TokenPair,
}

/// Body of `IdentityOTP` and `resetpasswordOTP`
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct SendEmailRequest {
    pub email: String,
    pub reference: String,
    /// `"1"` verify, `"2"` reset password
    pub record: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct ResendOtpRequest {
    pub email: String,
    pub record: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct VerifyOtpRequest {
    pub email: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub otp: String,
    pub record: String,
}

/// A fresh OTP reference for the client to pass to `sendemail`
#[derive(Serialize, Debug)]
pub struct OtpReferenceResponse {
    pub message: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Tokens are only present after a verify-channel OTP
#[derive(Serialize, Debug)]
pub struct VerifyOtpResponse {
    pub message: String,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub email: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct CaptchaRequest {
    pub token: String,
    pub action: String,
}

/// Body of every captcha response, success or not
#[derive(Serialize, Debug, Default)]
pub struct CaptchaResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<String>>,
    pub message: String,
}

impl CaptchaResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Plain `{"message": ...}` body
#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
