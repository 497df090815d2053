/**
 * Backend Error Types
 *
 * This module defines the error type every HTTP handler returns.
 *
 * # Error Types
 *
 * - `HandlerError` - A client-visible failure with an explicit status code
 * - `AccountState` - Sign-in refused because the account is inactive or deleted
 * - `Internal` - A failure whose detail must stay in the logs
 * - `Store` - Persistence failures, mapped by kind
 * - `Shared` - Validation failures from the domain types
 *
 * # Status Mapping
 *
 * Store `NotFound` maps to 404, `Conflict` to 409 and `Database` to 500.
 * Validation failures map to 400. Internal and database failures are
 * reported to clients as "Internal server error".
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::{ActiveState, SharedError};

/// Message shown to clients for failures whose detail is only logged
pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing field, bad credentials)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The account exists but may not sign in
    #[error("Account state error: {message}")]
    AccountState {
        message: String,
        state: ActiveState,
    },

    /// Unexpected failure; `detail` is logged, never returned
    #[error("Internal error: {detail}")]
    Internal {
        /// Generic message for the client
        message: String,
        /// Underlying cause for the logs
        detail: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Shared(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::CONFLICT, message)
    }

    /// Sign-in refused for an inactive or deleted account
    pub fn account_state(state: ActiveState) -> Self {
        let message = match state {
            ActiveState::Deleted => "User account is delete",
            _ => "User account is not active",
        };
        Self::AccountState {
            message: message.to_string(),
            state,
        }
    }

    /// Internal failure with a client-facing message and a logged cause
    pub fn internal(message: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::AccountState { .. } => StatusCode::FORBIDDEN,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Shared(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the client-facing error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::AccountState { message, .. } => message.clone(),
            Self::Internal { message, .. } => message.clone(),
            Self::Store(StoreError::NotFound(what)) => format!("{} not found", what),
            Self::Store(StoreError::Conflict(message)) => message.clone(),
            Self::Store(StoreError::Database(_)) => INTERNAL_MESSAGE.to_string(),
            Self::Shared(SharedError::ValidationError { message, .. }) => message.clone(),
            Self::Shared(err) => err.to_string(),
        }
    }

    /// Extra `status` field for account-state failures
    pub fn account_status(&self) -> Option<&'static str> {
        match self {
            Self::AccountState { state, .. } => Some(state.code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error() {
        let error = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
        match error {
            BackendError::HandlerError { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Invalid request");
            }
            _ => panic!("Expected HandlerError"),
        }
    }

    #[test]
    fn test_account_state_messages() {
        let inactive = BackendError::account_state(ActiveState::Inactive);
        assert_eq!(inactive.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(inactive.message(), "User account is not active");
        assert_eq!(inactive.account_status(), Some("0"));

        let deleted = BackendError::account_state(ActiveState::Deleted);
        assert_eq!(deleted.message(), "User account is delete");
        assert_eq!(deleted.account_status(), Some("2"));
    }

    #[test]
    fn test_store_status_mapping() {
        let not_found: BackendError = StoreError::NotFound("User").into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.message(), "User not found");

        let conflict: BackendError = StoreError::Conflict("Email is already registered".into()).into();
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let db: BackendError = StoreError::Database("connection reset".into()).into();
        assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn test_internal_hides_detail() {
        let error = BackendError::internal("Failed to send email", "smtp: 535 auth failed");
        assert_eq!(error.message(), "Failed to send email");
        assert!(error.to_string().contains("535"));
        assert_eq!(error.account_status(), None);
    }

    #[test]
    fn test_from_shared_error() {
        let backend_error: BackendError = SharedError::validation("email", "Invalid email format").into();
        assert_eq!(backend_error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(backend_error.message(), "Invalid email format");

        let code: BackendError = SharedError::invalid_code("record", "7").into();
        assert_eq!(code.message(), "Invalid record code: 7");
    }
}
