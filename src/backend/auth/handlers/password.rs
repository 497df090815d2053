/**
 * Password Reset Handler
 *
 * POST /auth/resetpassword
 *
 * Accepted only while a reset-channel OTP for `ref` has been consumed and
 * has not yet expired. The store retires that record as it writes the new
 * hash, so a reference authorises a single reset.
 */

use axum::{extract::State, response::Json};
use chrono::Utc;

use crate::backend::auth::handlers::types::{MessageResponse, ResetPasswordRequest};
use crate::backend::auth::passwords::hash_password;
use crate::backend::error::{AppJson, BackendError};
use crate::backend::server::state::AppState;
use crate::backend::store::PasswordReset;
use crate::shared::error::require_non_empty;

pub async fn reset_password(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    require_non_empty("email", &request.email)?;
    require_non_empty("ref", &request.reference)?;
    require_non_empty("password", &request.password)?;

    app_state
        .store
        .find_user_by_email(&request.email)
        .await?
        .ok_or_else(|| BackendError::bad_request("Email is not already registered"))?;

    let password_hash = hash_password(&request.password, app_state.config.bcrypt_cost).await?;

    match app_state
        .store
        .reset_password(&request.email, &request.reference, &password_hash, Utc::now())
        .await?
    {
        PasswordReset::Updated => {
            tracing::info!("Password reset for: {}", request.email);
            Ok(Json(MessageResponse::new("Password reset successfully")))
        }
        PasswordReset::NotAuthorized => {
            tracing::warn!("Password reset without a verified OTP: {}", request.email);
            Err(BackendError::forbidden("OTP verification is required before resetting the password"))
        }
    }
}
