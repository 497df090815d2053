//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── auth_routes.rs  - `/auth` routes
//! └── api_routes.rs   - User, board, task, admin and attachment routes
//! ```
//!
//! # Authentication
//!
//! Protected groups carry `auth_middleware` as a `route_layer`, so an
//! unknown path is still a 404 rather than a 401. Admin routes add
//! `require_admin` inside it; `/auth/refresh` uses `refresh_token_middleware`
//! instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use dayplanner::backend::routes::create_router;
//! use dayplanner::backend::server::state::AppState;
//!
//! # fn example(app_state: AppState) {
//! let router = create_router(app_state);
//! # }
//! ```

/// Main router creation
pub mod router;

/// Authentication routes
pub mod auth_routes;

/// Resource routes
pub mod api_routes;

pub use router::create_router;
