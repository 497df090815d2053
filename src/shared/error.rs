//! Shared Error Types
//!
//! Errors raised while validating or parsing domain values. They carry no
//! HTTP semantics; the backend maps them to 400 responses.
//!
//! # Error Categories
//!
//! - `ValidationError` - A field failed a validation rule
//! - `InvalidCode` - A wire code (e.g. `"1"`/`"2"` for an OTP channel) was not recognised
//!
//! # Usage
//!
//! ```rust
//! use dayplanner::shared::error::SharedError;
//!
//! let error = SharedError::validation("email", "Invalid email format");
//! ```
use thiserror::Error;

/// Validation errors for planner domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Unknown wire code for an enum-like field
    #[error("Invalid {kind} code: {code}")]
    InvalidCode {
        /// What the code was supposed to describe
        kind: &'static str,
        /// The offending value
        code: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid-code error
    pub fn invalid_code(kind: &'static str, code: impl Into<String>) -> Self {
        Self::InvalidCode {
            kind,
            code: code.into(),
        }
    }
}

/// Check that an email address has the `local@domain.tld` shape.
///
/// Mirrors `^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$`.
pub fn validate_email(email: &str) -> Result<(), SharedError> {
    let invalid = || SharedError::validation("email", "Invalid email format");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return Err(invalid());
    }

    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(invalid());
    }
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    Ok(())
}

/// Reject empty or whitespace-only values for a required field
pub fn require_non_empty(field: &str, value: &str) -> Result<(), SharedError> {
    if value.trim().is_empty() {
        return Err(SharedError::validation(field, format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("email", "Invalid email format");
        match error {
            SharedError::ValidationError { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Invalid email format");
            }
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_invalid_code_display() {
        let error = SharedError::invalid_code("record", "9");
        assert_eq!(error.to_string(), "Invalid record code: 9");
    }

    #[test]
    fn test_accepts_common_addresses() {
        for email in ["user@example.com", "first.last+tag@mail.co.th", "a_b-c%d@x-y.io"] {
            assert!(validate_email(email).is_ok(), "{email} should be valid");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for email in [
            "",
            "plainaddress",
            "@example.com",
            "user@",
            "user@example",
            "user@example.c",
            "user@.com",
            "us er@example.com",
            "user@example.c0m",
        ] {
            assert!(validate_email(email).is_err(), "{email} should be invalid");
        }
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("name", "Alice").is_ok());
        assert_eq!(
            require_non_empty("name", "   "),
            Err(SharedError::validation("name", "name is required"))
        );
    }
}
