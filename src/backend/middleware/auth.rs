/**
 * Authentication Middleware
 *
 * Guards for protected routes. Each reads `Authorization: Bearer <token>`,
 * verifies it with the `TokenService` and records the caller in the request
 * extensions for the handler.
 *
 * # Guards
 *
 * - `auth_middleware` - access token, inserts `AuthenticatedUser`
 * - `refresh_token_middleware` - refresh token, inserts `RefreshSession`
 * - `require_admin` - runs after `auth_middleware`, admin role only
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::planner::Role;

/// Caller identity taken from a verified access token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Caller identity taken from a verified refresh token
#[derive(Clone, Debug)]
pub struct RefreshSession {
    pub user_id: Uuid,
    pub refresh_token: String,
}

enum BearerError {
    Missing,
    Malformed,
}

fn bearer_token(headers: &HeaderMap) -> Result<String, BearerError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;

    match header.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(' ') => Ok(token.to_string()),
        _ => Err(BearerError::Malformed),
    }
}

/// Require a valid access token
///
/// 401 when the header is missing or malformed, 403 when the token does not
/// verify.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).map_err(|e| match e {
        BearerError::Missing => {
            tracing::warn!("Missing Authorization header");
            BackendError::unauthorized("Authorization header is missing")
        }
        BearerError::Malformed => {
            tracing::warn!("Invalid Authorization header format");
            BackendError::unauthorized("Invalid token format")
        }
    })?;

    let claims = app_state.tokens.verify_access_token(&token).map_err(|e| {
        tracing::warn!("Invalid access token: {}", e);
        BackendError::forbidden(format!("Token is expired or invalid: {}", e))
    })?;

    let user_id = Uuid::parse_str(&claims.user_id)
        .map_err(|_| BackendError::unauthorized("Invalid userId in token claims"))?;
    let role = Role::parse(&claims.role).map_err(|_| BackendError::unauthorized("Invalid token claims"))?;

    request.extensions_mut().insert(AuthenticatedUser { user_id, role });

    Ok(next.run(request).await)
}

/// Require a valid refresh token
pub async fn refresh_token_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).map_err(|e| match e {
        BearerError::Missing => BackendError::unauthorized("Refresh token is missing"),
        BearerError::Malformed => BackendError::unauthorized("Invalid token format"),
    })?;

    let claims = app_state.tokens.verify_refresh_token(&token).map_err(|e| {
        tracing::warn!("Invalid refresh token: {}", e);
        BackendError::forbidden(format!("Invalid refresh token: {}", e))
    })?;

    let user_id = Uuid::parse_str(&claims.user_id)
        .map_err(|_| BackendError::unauthorized("Invalid token claims: UserID not found"))?;

    request.extensions_mut().insert(RefreshSession {
        user_id,
        refresh_token: token,
    });

    Ok(next.run(request).await)
}

/// Admin-only gate; layer it inside `auth_middleware`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, BackendError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| BackendError::unauthorized("Claims not found"))?;

    if user.role != Role::Admin {
        tracing::warn!("Non-admin {} refused admin route", user.user_id);
        return Err(BackendError::forbidden("Forbidden"));
    }

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated caller
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Authorization header is missing")
            })?;

        Ok(AuthUser(user))
    }
}
