/**
 * Session Handlers
 *
 * - POST /auth/signin - password sign-in
 * - POST /auth/signout - revoke the caller's refresh token
 * - POST /auth/refresh - new access token for a stored refresh token
 *
 * # Sign-in Gates
 *
 * Checked in order: user exists (404), password matches (401), account is
 * active (403 with `status`), account is verified (403). Accounts created
 * through Google sign-in carry a placeholder hash and always fail the
 * password gate.
 *
 * Each sign-in overwrites the user's stored refresh-token hash, so only the
 * most recent refresh token can be used.
 */

use axum::{extract::State, response::Json, Extension};
use chrono::Utc;

use crate::backend::auth::handlers::types::{MessageResponse, RefreshResponse, SigninRequest, SigninResponse};
use crate::backend::auth::passwords::verify_password;
use crate::backend::error::{AppJson, BackendError};
use crate::backend::middleware::{AuthUser, RefreshSession};
use crate::backend::server::state::AppState;
use crate::shared::error::require_non_empty;
use crate::shared::planner::{ActiveState, PublicUser};

/// Sign in handler
///
/// # Example Response
///
/// ```json
/// {
///   "message": "Signin successful",
///   "user": { "id": "…", "name": "Somchai", "email": "user@example.com", "profile": "none-url", "role": "user" },
///   "token": { "accessToken": "…", "refreshToken": "…", "expiresIn": 604800 }
/// }
/// ```
pub async fn signin(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<SigninRequest>,
) -> Result<Json<SigninResponse>, BackendError> {
    require_non_empty("email", &request.email)?;

    let user = app_state
        .store
        .find_user_by_email(&request.email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Signin for unknown email: {}", request.email);
            BackendError::not_found("User not found")
        })?;

    // bcrypt rejects the external-account placeholder as a malformed hash
    let password_ok = user.has_password()
        && verify_password(&request.password, &user.password_hash)
            .await
            .unwrap_or(false);
    if !password_ok {
        tracing::warn!("Invalid password for user: {}", user.id);
        return Err(BackendError::unauthorized("Invalid password"));
    }

    if user.active != ActiveState::Active {
        return Err(BackendError::account_state(user.active));
    }
    if !user.is_verified {
        return Err(BackendError::forbidden("User account is not verified"));
    }

    let (token, record) = app_state.tokens.issue_pair(&user).await?;
    app_state.store.save_token_record(record).await?;

    tracing::info!("User signed in: {}", user.id);

    Ok(Json(SigninResponse {
        message: "Signin successful".to_string(),
        user: PublicUser::from(&user),
        token,
    }))
}

/// Revoke the caller's stored refresh token
pub async fn signout(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<MessageResponse>, BackendError> {
    if !app_state.store.revoke_token_record(caller.user_id).await? {
        tracing::debug!("Signout for {} with no stored token", caller.user_id);
    }
    Ok(Json(MessageResponse::new("Signout successful")))
}

/// Mint a new access token
///
/// Runs behind `refresh_token_middleware`. The presented token must match
/// the stored hash, and the stored record must be unrevoked and unexpired.
pub async fn refresh(
    State(app_state): State<AppState>,
    Extension(session): Extension<RefreshSession>,
) -> Result<Json<RefreshResponse>, BackendError> {
    let record = app_state
        .store
        .find_token_record(session.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("Refresh token not found"))?;

    if !record.is_usable(Utc::now()) {
        return Err(BackendError::unauthorized("Refresh token has been revoked or expired"));
    }
    if !app_state
        .tokens
        .verify_refresh_token_hash(&session.refresh_token, &record.token_hash)
        .await?
    {
        tracing::warn!("Refresh token mismatch for user: {}", session.user_id);
        return Err(BackendError::unauthorized("Invalid refresh token"));
    }

    let user = app_state
        .store
        .find_user_by_id(session.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    if user.active != ActiveState::Active {
        return Err(BackendError::account_state(user.active));
    }

    let access_token = app_state.tokens.create_access_token(user.id, user.role, Utc::now())?;
    Ok(Json(RefreshResponse { access_token }))
}
