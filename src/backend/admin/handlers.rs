/**
 * Admin Handlers
 *
 * - GET /admin/getalluser - list every account
 * - POST /admin/edituser - flip a user between active and inactive
 * - POST /admin/createadmin - create an admin account
 *
 * `edituser` is a toggle: an active account becomes inactive and any other
 * state, soft-deleted included, becomes active again.
 */

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

use crate::backend::auth::passwords::hash_password;
use crate::backend::error::{AppJson, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;
use crate::shared::error::{require_non_empty, validate_email};
use crate::shared::planner::user::DEFAULT_PROFILE;
use crate::shared::planner::{ActiveState, NewUser, Role, User};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EditUserRequest {
    pub email: String,
}

#[derive(Serialize, Debug)]
pub struct EditUserResponse {
    pub message: String,
    /// New active-state code
    pub status: ActiveState,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct CreateAdminResponse {
    pub message: String,
    pub email: String,
    pub role: Role,
}

/// Password hashes are never serialized
pub async fn get_all_users(
    State(app_state): State<AppState>,
    AuthUser(admin): AuthUser,
) -> Result<Json<Vec<User>>, BackendError> {
    let users = app_state.store.list_users().await?;
    tracing::debug!("Admin {} listed {} users", admin.user_id, users.len());
    Ok(Json(users))
}

pub async fn edit_user(
    State(app_state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppJson(request): AppJson<EditUserRequest>,
) -> Result<Json<EditUserResponse>, BackendError> {
    require_non_empty("email", &request.email)?;

    let user = app_state
        .store
        .find_user_by_email(&request.email)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    let (status, message) = match user.active {
        ActiveState::Active => (ActiveState::Inactive, "User disabled successfully"),
        _ => (ActiveState::Active, "User enabled successfully"),
    };
    app_state.store.set_active_state(user.id, status).await?;

    tracing::info!("Admin {} set user {} to state {}", admin.user_id, user.id, status.code());

    Ok(Json(EditUserResponse {
        message: message.to_string(),
        status,
    }))
}

/// New admins start unverified, like self-registered users
pub async fn create_admin(
    State(app_state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppJson(request): AppJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<CreateAdminResponse>), BackendError> {
    require_non_empty("email", &request.email)?;
    require_non_empty("password", &request.password)?;
    validate_email(&request.email)?;

    let password_hash = hash_password(&request.password, app_state.config.bcrypt_cost).await?;

    let user = app_state
        .store
        .create_user(NewUser {
            name: "admin".to_string(),
            email: request.email,
            password_hash,
            profile: DEFAULT_PROFILE.to_string(),
            role: Role::Admin,
            is_verified: false,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => BackendError::conflict("User already exists"),
            other => BackendError::from(other),
        })?;

    tracing::info!("Admin {} created admin account {}", admin.user_id, user.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateAdminResponse {
            message: "Admin user created successfully".to_string(),
            email: user.email,
            role: user.role,
        }),
    ))
}
