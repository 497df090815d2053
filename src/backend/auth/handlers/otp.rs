/**
 * OTP Handlers
 *
 * - POST /auth/IdentityOTP - reference for an email-verification code
 * - POST /auth/resetpasswordOTP - reference for a password-reset code
 * - POST /auth/sendemail - generate, mail and store a code for a reference
 * - POST /auth/resendotp - fresh reference and code in one call
 * - POST /auth/verifyOTP - consume a code
 *
 * # Flow
 *
 * The reference routes only hand out a reference; nothing is stored until
 * `sendemail` mails the code and saves the record. Every route that hands
 * out a reference is rate limited per (email, channel).
 *
 * `record` selects the channel: `"1"` verify, `"2"` reset password.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{
    MessageResponse, OtpReferenceResponse, OtpRequest, ResendOtpRequest, SendEmailRequest, VerifyOtpRequest,
    VerifyOtpResponse,
};
use crate::backend::error::{AppJson, BackendError};
use crate::backend::server::state::AppState;
use crate::shared::error::require_non_empty;
use crate::shared::planner::{OtpChannel, User};

async fn registered_user(app_state: &AppState, email: &str) -> Result<User, BackendError> {
    require_non_empty("email", email)?;
    app_state
        .store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| BackendError::bad_request("Email is not already registered"))
}

/// Refuse blocked emails, block those at the limit, else hand out a reference
async fn rate_limited_reference(app_state: &AppState, email: &str, channel: OtpChannel) -> Result<String, BackendError> {
    if app_state.otp.is_email_blocked(email, channel).await? {
        tracing::warn!("Refused {} OTP for blocked email: {}", channel.as_str(), email);
        return Err(BackendError::forbidden("Too many OTP requests. Please try again later."));
    }
    if app_state.otp.check_and_block_if_needed(email, channel).await? {
        return Err(BackendError::forbidden(
            "Too many OTP requests. Your email has been blocked temporarily.",
        ));
    }
    Ok(app_state.otp.new_reference())
}

async fn request_reference(
    app_state: &AppState,
    email: &str,
    channel: OtpChannel,
) -> Result<Json<OtpReferenceResponse>, BackendError> {
    registered_user(app_state, email).await?;
    let reference = rate_limited_reference(app_state, email, channel).await?;

    Ok(Json(OtpReferenceResponse {
        message: format!("OTP has been sent to your email {}", channel_label(channel)),
        reference,
    }))
}

fn channel_label(channel: OtpChannel) -> &'static str {
    match channel {
        OtpChannel::Verify => "identity",
        OtpChannel::ResetPassword => "resetpassword",
    }
}

pub async fn identity_otp(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<OtpRequest>,
) -> Result<Json<OtpReferenceResponse>, BackendError> {
    request_reference(&app_state, &request.email, OtpChannel::Verify).await
}

pub async fn reset_password_otp(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<OtpRequest>,
) -> Result<Json<OtpReferenceResponse>, BackendError> {
    request_reference(&app_state, &request.email, OtpChannel::ResetPassword).await
}

/// Mail a code for a reference obtained from one of the reference routes
pub async fn send_email(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<SendEmailRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    registered_user(&app_state, &request.email).await?;
    require_non_empty("reference", &request.reference)?;
    let channel = OtpChannel::from_record(&request.record)?;

    app_state
        .otp
        .deliver(&request.email, &request.reference, channel)
        .await?;

    Ok(Json(MessageResponse::new(format!(
        "OTP {} has been sent to your email",
        channel.as_str()
    ))))
}

pub async fn resend_otp(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<ResendOtpRequest>,
) -> Result<Json<OtpReferenceResponse>, BackendError> {
    registered_user(&app_state, &request.email).await?;
    let channel = OtpChannel::from_record(&request.record)?;

    let reference = rate_limited_reference(&app_state, &request.email, channel).await?;
    app_state.otp.deliver(&request.email, &reference, channel).await?;

    Ok(Json(OtpReferenceResponse {
        message: "OTP has been sent to your email".to_string(),
        reference,
    }))
}

/// Consume a code
///
/// A verify-channel code also marks the account verified and returns a token
/// pair; marking the record used, flagging the user and storing the refresh
/// token are one store write.
pub async fn verify_otp(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, BackendError> {
    let user = registered_user(&app_state, &request.email).await?;

    if [&request.record, &request.reference, &request.otp]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(BackendError::bad_request("Record, Reference and OTP are required"));
    }
    let channel = OtpChannel::from_record(&request.record)?;

    app_state
        .otp
        .check_code(&request.email, channel, &request.reference, &request.otp)
        .await?;

    match channel {
        OtpChannel::Verify => {
            let (pair, record) = app_state.tokens.issue_pair(&user).await?;
            app_state
                .otp
                .consume(&request.email, channel, &request.reference, Some(record))
                .await?;
            tracing::info!("Verified account: {}", user.id);

            Ok(Json(VerifyOtpResponse {
                message: "OTP verified successfully".to_string(),
                access_token: Some(pair.access_token),
                refresh_token: Some(pair.refresh_token),
            }))
        }
        OtpChannel::ResetPassword => {
            app_state
                .otp
                .consume(&request.email, channel, &request.reference, None)
                .await?;

            Ok(Json(VerifyOtpResponse {
                message: "OTP verified successfully".to_string(),
                access_token: None,
                refresh_token: None,
            }))
        }
    }
}
