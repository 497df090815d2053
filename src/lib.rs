// Increase recursion limit for complex async operations
#![recursion_limit = "256"]

//! Dayplanner - Main Library
//!
//! Dayplanner is the backend of a personal and shared day planner: user
//! accounts with password, OTP and Google sign-in, boards, tasks with
//! reminders, file attachments and reCAPTCHA bot detection.
//!
//! # Module Structure
//!
//! The library is organized into two main modules:
//!
//! - **`shared`** - Domain types and configuration
//!   - Users, boards, tasks, notifications, OTP records
//!   - `AppConfig` and its builder
//!   - Validation error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, routes and middleware
//!   - Token and OTP services
//!   - PostgreSQL and in-memory stores
//!   - SMTP mailer and reCAPTCHA client
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use dayplanner::backend::server::init::create_app;
//! use dayplanner::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(config).await?;
//! // Serve `app` with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::error::SharedError` for validation failures
//! - `shared::config::ConfigError` for configuration problems
//! - `backend::error::BackendError` for everything an HTTP handler can return

/// Domain types and configuration
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
