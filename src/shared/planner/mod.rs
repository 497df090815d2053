//! Planner Domain Types
//!
//! Plain data types for everything the backend persists. Enum-like fields keep
//! the single-character wire codes the mobile client already speaks (`"1"`
//! for active, `"2"` for a completed task, ...) through `code()` /
//! `from_code()` pairs and matching serde renames.
//!
//! # Module Structure
//!
//! ```text
//! planner/
//! ├── mod.rs    - Module exports
//! ├── user.rs   - User, Role, ActiveState
//! ├── board.rs  - Board, BoardKind, BoardMember
//! ├── task.rs   - Task, TaskStatus, TaskPriority, Notification
//! └── otp.rs    - OtpChannel, OtpRecord, EmailBlock, TokenRecord
//! ```

pub mod user;
pub mod board;
pub mod task;
pub mod otp;

pub use user::{ActiveState, NewUser, ProfileUpdate, PublicUser, Role, User};
pub use board::{Board, BoardKind, BoardMember, NewBoard};
pub use task::{NewNotification, NewTask, Notification, Task, TaskPriority, TaskStatus};
pub use otp::{EmailBlock, OtpChannel, OtpRecord, TokenRecord};
