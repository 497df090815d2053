//! Authentication Module
//!
//! This module handles account registration, sign-in, OTP verification and
//! session tokens.
//!
//! # Architecture
//!
//! - **`sessions`** - JWT access/refresh tokens and refresh-token hashing
//! - **`passwords`** - bcrypt hashing off the async workers
//! - **`otp`** - OTP generation, rate limiting and delivery
//! - **`handlers`** - HTTP handlers for the `/auth` routes
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── sessions.rs     - Token service
//! ├── passwords.rs    - bcrypt hash and verify
//! ├── otp.rs          - OTP service
//! └── handlers/       - HTTP handlers
//!     ├── mod.rs
//!     ├── types.rs    - Request/response types
//!     ├── signup.rs
//!     ├── signin.rs   - Password sign-in, sign-out, refresh
//!     ├── google.rs   - Google sign-in
//!     ├── otp.rs      - OTP request, send, resend, verify
//!     ├── password.rs - Password reset
//!     └── captcha.rs  - reCAPTCHA verification
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: name, email and password → unverified account
//! 2. **Verify**: IdentityOTP → sendemail → verifyOTP marks the account
//!    verified and returns a token pair
//! 3. **Signin**: email and password → token pair; the refresh token's hash
//!    replaces the stored one
//! 4. **Refresh**: refresh token → new access token
//! 5. **Signout**: the stored refresh-token record is revoked
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt
//! - Only a hash of the refresh token is stored
//! - Tokens are HS256 only; other algorithms are rejected

/// JWT token generation and validation
pub mod sessions;

/// bcrypt on the blocking pool
pub mod passwords;

/// OTP generation, rate limiting and delivery
pub mod otp;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use otp::{OtpError, OtpService};
pub use passwords::{hash_password, verify_password, PasswordError};
pub use sessions::{TokenError, TokenPair, TokenService};
