/**
 * Signup Handler
 *
 * POST /auth/signup
 *
 * # Registration Process
 *
 * 1. Require email, password and name
 * 2. Validate the email shape
 * 3. Hash the password with bcrypt
 * 4. Insert the user, unverified and active
 *
 * The unique email constraint decides duplicates, so two concurrent signups
 * for one address cannot both succeed. Verification happens afterwards
 * through the OTP routes.
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::{SignupRequest, SignupResponse};
use crate::backend::auth::passwords::hash_password;
use crate::backend::error::{AppJson, BackendError};
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;
use crate::shared::error::{require_non_empty, validate_email};
use crate::shared::planner::NewUser;

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - a field is missing or the email is malformed
/// * `409 Conflict` - the email is already registered
/// * `500 Internal Server Error` - hashing or the insert failed
///
/// # Example Request
///
/// ```http
/// POST /auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "hunter22", "name": "Somchai" }
/// ```
pub async fn signup(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), BackendError> {
    require_non_empty("email", &request.email)?;
    require_non_empty("password", &request.password)?;
    require_non_empty("name", &request.name)?;
    validate_email(&request.email)?;

    tracing::info!("Signup request for email: {}", request.email);

    let password_hash = hash_password(&request.password, app_state.config.bcrypt_cost).await?;

    let user = app_state
        .store
        .create_user(NewUser::signup(request.name, request.email, password_hash))
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => BackendError::conflict("Email is already registered"),
            other => BackendError::from(other),
        })?;

    tracing::info!("User created: {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered successfully".to_string(),
            user_id: user.id,
        }),
    ))
}
