/**
 * User Handlers
 *
 * - POST /user/search - public view of a user by email
 * - PUT /user/profile - partial update of the caller's profile
 * - DELETE /user/account - remove the caller's account
 * - GET /user/data - caller with their boards, memberships and tasks
 *
 * The caller always comes from the access token; no handler here acts on
 * another user's account.
 */

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use crate::backend::auth::handlers::types::MessageResponse;
use crate::backend::auth::passwords::hash_password;
use crate::backend::error::{AppJson, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::AccountRemoval;
use crate::shared::error::require_non_empty;
use crate::shared::planner::{Board, BoardMember, ProfileUpdate, PublicUser, Task};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SearchUserRequest {
    pub email: String,
}

/// Empty strings count as absent
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub profile: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct UserData {
    pub user: PublicUser,
    pub boards: Vec<Board>,
    pub memberships: Vec<BoardMember>,
    pub tasks: Vec<Task>,
}

#[derive(Serialize, Debug)]
pub struct UserDataResponse {
    pub message: String,
    pub data: UserData,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn search_user(
    State(app_state): State<AppState>,
    AuthUser(_caller): AuthUser,
    AppJson(request): AppJson<SearchUserRequest>,
) -> Result<Json<PublicUser>, BackendError> {
    require_non_empty("email", &request.email)?;

    let user = app_state
        .store
        .find_user_by_email(&request.email)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    Ok(Json(PublicUser::from(&user)))
}

/// Update name, password and profile picture; absent fields are kept
pub async fn update_profile(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(request): AppJson<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    let password_hash = match non_empty(request.password) {
        Some(password) => Some(
            hash_password(&password, app_state.config.bcrypt_cost).await?,
        ),
        None => None,
    };

    let update = ProfileUpdate {
        name: non_empty(request.name),
        password_hash,
        profile: non_empty(request.profile),
    };

    if update.is_empty() {
        tracing::debug!("Empty profile update from {}", caller.user_id);
    } else {
        app_state.store.update_profile(caller.user_id, &update).await?;
        tracing::info!("Profile updated for {}", caller.user_id);
    }

    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

pub async fn delete_account(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<MessageResponse>, BackendError> {
    let message = match app_state.store.remove_account(caller.user_id).await? {
        AccountRemoval::Deactivated => "User deactivated successfully",
        AccountRemoval::Deleted => "User deleted successfully",
    };
    tracing::info!("Account {} removed: {}", caller.user_id, message);

    Ok(Json(MessageResponse::new(message)))
}

/// The caller plus everything they own, read concurrently
pub async fn user_data(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<UserDataResponse>, BackendError> {
    let store = &app_state.store;

    let user = store
        .find_user_by_id(caller.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    let (boards, memberships, tasks) = tokio::try_join!(
        store.boards_created_by(user.id),
        store.memberships_of(user.id),
        store.tasks_created_by(user.id),
    )?;

    Ok(Json(UserDataResponse {
        message: "User data retrieved successfully".to_string(),
        data: UserData {
            user: PublicUser::from(&user),
            boards,
            memberships,
            tasks,
        },
    }))
}
