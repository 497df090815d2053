//! Authentication Handlers Module
//!
//! HTTP handlers for the `/auth` routes.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── signup.rs   - Account registration
//! ├── signin.rs   - Sign-in, sign-out and token refresh
//! ├── google.rs   - Google sign-in
//! ├── otp.rs      - OTP reference, send, resend and verify
//! ├── password.rs - Password reset
//! └── captcha.rs  - reCAPTCHA verification
//! ```
//!
//! # Handlers
//!
//! - **`signup`** - POST /auth/signup
//! - **`signin`** - POST /auth/signin
//! - **`signout`** - POST /auth/signout (bearer)
//! - **`refresh`** - POST /auth/refresh (bearer refresh token)
//! - **`google_login`** - POST /auth/googlelogin
//! - **`identity_otp`**, **`reset_password_otp`** - POST /auth/IdentityOTP, /auth/resetpasswordOTP
//! - **`send_email`** - POST /auth/sendemail
//! - **`resend_otp`** - POST /auth/resendotp
//! - **`verify_otp`** - POST /auth/verifyOTP
//! - **`reset_password`** - POST /auth/resetpassword
//! - **`verify_captcha`** - POST /auth/captcha

/// Request and response types
pub mod types;

pub mod signup;
pub mod signin;
pub mod google;
pub mod otp;
pub mod password;
pub mod captcha;

pub use captcha::verify_captcha;
pub use google::google_login;
pub use otp::{identity_otp, resend_otp, reset_password_otp, send_email, verify_otp};
pub use password::reset_password;
pub use signin::{refresh, signin, signout};
pub use signup::signup;
