//! Middleware Module
//!
//! Request guards applied with `axum::middleware::from_fn_with_state`.
//!
//! - **`auth`** - bearer-token authentication and the admin gate
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware;
//! use dayplanner::backend::middleware::auth_middleware;
//!
//! let protected = Router::new()
//!     .route("/user/profile", put(update_profile))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;

pub use auth::{
    auth_middleware, refresh_token_middleware, require_admin, AuthUser, AuthenticatedUser, RefreshSession,
};
