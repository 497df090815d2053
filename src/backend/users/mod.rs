//! Users Module
//!
//! Handlers for the signed-in caller's own account, all behind
//! `auth_middleware`.
//!
//! - **`handlers`** - search, profile update, account removal, aggregate data
//!
//! # Account Removal
//!
//! An account that owns boards or memberships is soft-deleted (active state
//! `"2"`) so those rows keep a valid owner; an account that owns nothing is
//! removed outright.

/// HTTP handlers for `/user`
pub mod handlers;

pub use handlers::{delete_account, search_user, update_profile, user_data};
