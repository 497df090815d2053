//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - `AppState` shared by every handler
//! - **`config`** - Database pool loading and migrations
//! - **`init`** - Store and mailer selection, app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState
//! ├── config.rs       - Database loading
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Database**: connect and migrate when `DATABASE_URL` is set
//! 2. **Services**: store, mailer, token and OTP services, captcha client
//! 3. **Router**: all routes, middleware and the upload file server
//!
//! # Example
//!
//! ```rust,no_run
//! use dayplanner::backend::server::create_app;
//! use dayplanner::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::from_env()?).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Database loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, InitError};
pub use state::AppState;
