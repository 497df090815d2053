//! Shared Module
//!
//! This module contains the domain types of the planner and the application
//! configuration. Nothing in here touches the network or the database, so the
//! types can be reused by clients and tests without the `ssr` feature.
//!
//! # Overview
//!
//! - **`planner`** - Users, boards, tasks, notifications, OTP records and tokens
//! - **`config`** - `AppConfig`, its builder and `ConfigError`
//! - **`error`** - `SharedError` for validation failures

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Planner domain types
pub mod planner;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use planner::{
    ActiveState, Board, BoardKind, BoardMember, Notification, OtpChannel, OtpRecord, Role, Task,
    TaskPriority, TaskStatus, TokenRecord, User,
};
