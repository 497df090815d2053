//! Backend Module
//!
//! This module contains all server-side code for the day planner. It provides
//! an Axum HTTP server with password, OTP and Google sign-in, CRUD handlers for
//! users, boards and tasks, file uploads and reCAPTCHA verification.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, database loading
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`middleware`** - Bearer-token authentication and the admin gate
//! - **`auth`** - Token service, OTP service and authentication handlers
//! - **`store`** - `Store` trait with PostgreSQL and in-memory implementations
//! - **`mail`** - `Mailer` trait, SMTP transport and email templates
//! - **`captcha`** - reCAPTCHA Enterprise assessment client
//! - **`users`**, **`boards`**, **`tasks`**, **`admin`**, **`attachments`** - Resource handlers
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── middleware/     - Request middleware
//! ├── auth/           - Tokens, OTPs and auth handlers
//! ├── store/          - Persistence
//! ├── mail/           - Outgoing email
//! ├── captcha/        - Bot detection
//! ├── users/          - Profile and account handlers
//! ├── boards/         - Board handlers
//! ├── tasks/          - Task handlers
//! ├── admin/          - Admin handlers
//! ├── attachments/    - File upload
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the store, token service, OTP service and captcha client
//! behind `Arc`s. Handlers extract it with `State<AppState>`; nothing else is
//! shared between requests.
//!
//! # Error Handling
//!
//! Handlers return `Result<_, BackendError>`. `BackendError` renders as
//! `{"error": "..."}` with the matching status code; store and downstream
//! failures are logged and reported to clients with a generic message.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication: tokens, OTPs and handlers
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Persistence layer
pub mod store;

/// Outgoing email
pub mod mail;

/// reCAPTCHA Enterprise client
pub mod captcha;

/// User profile and account handlers
pub mod users;

/// Board handlers
pub mod boards;

/// Task handlers
pub mod tasks;

/// Admin-only handlers
pub mod admin;

/// File upload handlers
pub mod attachments;

/// Re-export commonly used types
pub use server::create_app;
pub use error::BackendError;
pub use store::{Store, StoreError};
