//! Tasks Module
//!
//! - **`handlers`** - task creation with an optional reminder
//!
//! A task and its reminder notification are written together: if either
//! write fails, neither exists.

/// HTTP handlers for `/task`
pub mod handlers;

pub use handlers::create_task;
