//! Admin Module
//!
//! Handlers reachable only through `auth_middleware` followed by
//! `require_admin`.
//!
//! - **`handlers`** - list users, toggle a user's active state, create admin accounts

/// HTTP handlers for `/admin`
pub mod handlers;

pub use handlers::{create_admin, edit_user, get_all_users};
