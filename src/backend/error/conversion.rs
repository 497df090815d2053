/**
 * Error Conversion
 *
 * `IntoResponse` for `BackendError`, plus the `AppJson` extractor that turns
 * malformed request bodies into a `BackendError` instead of axum's plain-text
 * rejection.
 *
 * # Response Format
 *
 * ```json
 * { "error": "User account is not active", "status": "0" }
 * ```
 *
 * `status` is only present for account-state failures and carries the
 * account's active-state code.
 */

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    response::{IntoResponse, Json, Response},
};

use crate::backend::auth::otp::OtpError;
use crate::backend::auth::passwords::PasswordError;
use crate::backend::auth::sessions::TokenError;
use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            BackendError::Internal { detail, message } => {
                tracing::error!("{}: {}", message, detail);
            }
            BackendError::Store(err) if status.is_server_error() => {
                tracing::error!("Store failure: {}", err);
            }
            _ => {}
        }

        let mut body = serde_json::json!({ "error": self.message() });
        if let Some(code) = self.account_status() {
            body["status"] = serde_json::Value::from(code);
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        BackendError::bad_request("Invalid request format")
    }
}

impl From<OtpError> for BackendError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::ReferenceNotFound => BackendError::not_found(err.to_string()),
            OtpError::AlreadyUsed | OtpError::Expired | OtpError::Mismatch => {
                BackendError::bad_request(err.to_string())
            }
            OtpError::InvalidLength => BackendError::internal("Failed to generate OTP", err),
            OtpError::Mail(mail) => BackendError::internal("Failed to send email", mail),
            OtpError::Store(store) => BackendError::Store(store),
        }
    }
}

impl From<TokenError> for BackendError {
    fn from(err: TokenError) -> Self {
        BackendError::internal("Failed to create token", err)
    }
}

impl From<PasswordError> for BackendError {
    fn from(err: PasswordError) -> Self {
        BackendError::internal("Failed to hash password", err)
    }
}

/// JSON body extractor whose rejection is a `BackendError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(BackendError))]
pub struct AppJson<T>(pub T);
