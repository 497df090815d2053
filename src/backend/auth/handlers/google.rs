/**
 * Google Sign-in Handler
 *
 * POST /auth/googlelogin
 *
 * The client has already completed Google's OAuth flow and sends the
 * profile it received. An unknown email gets a new account that is verified
 * from the start and carries the external-password placeholder, so it can
 * never sign in with a password. A known but unverified account is marked
 * verified, since Google has confirmed the address.
 *
 * No Google ID token is checked. The email in the body is trusted as sent,
 * so a caller can obtain tokens for any active account, admins included.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{GoogleLoginRequest, GoogleLoginResponse, GoogleUser};
use crate::backend::error::{AppJson, BackendError};
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;
use crate::shared::error::{require_non_empty, validate_email};
use crate::shared::planner::user::{DEFAULT_PROFILE, EXTERNAL_PASSWORD};
use crate::shared::planner::{ActiveState, NewUser, Role, User};

pub async fn google_login(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<GoogleLoginRequest>,
) -> Result<Json<GoogleLoginResponse>, BackendError> {
    require_non_empty("email", &request.email)?;
    validate_email(&request.email)?;

    let user = match app_state.store.find_user_by_email(&request.email).await? {
        Some(user) => verify_existing(&app_state, user).await?,
        None => create_external_user(&app_state, request).await?,
    };

    if user.active != ActiveState::Active {
        return Err(BackendError::account_state(user.active));
    }

    let (token, record) = app_state.tokens.issue_pair(&user).await?;
    app_state.store.save_token_record(record).await?;

    tracing::info!("Google sign-in for user: {}", user.id);

    Ok(Json(GoogleLoginResponse {
        success: true,
        message: "Login successful".to_string(),
        status: "success".to_string(),
        user: GoogleUser {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        },
        token,
    }))
}

async fn verify_existing(app_state: &AppState, mut user: User) -> Result<User, BackendError> {
    if !user.is_verified {
        if !app_state.store.mark_verified(user.id).await? {
            return Err(StoreError::NotFound("User").into());
        }
        user.is_verified = true;
        tracing::info!("Marked {} verified through Google sign-in", user.id);
    }
    Ok(user)
}

async fn create_external_user(app_state: &AppState, request: GoogleLoginRequest) -> Result<User, BackendError> {
    let name = if request.name.trim().is_empty() {
        request.email.clone()
    } else {
        request.name
    };
    let profile = request
        .profile
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    let user = app_state
        .store
        .create_user(NewUser {
            name,
            email: request.email,
            password_hash: EXTERNAL_PASSWORD.to_string(),
            profile,
            role: Role::User,
            is_verified: true,
        })
        .await?;

    tracing::info!("Created Google account: {} ({})", user.id, user.email);
    Ok(user)
}
