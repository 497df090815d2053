//! Persistence Layer
//!
//! Every handler and service talks to storage through the `Store` trait. Two
//! implementations exist:
//!
//! - **`PgStore`** - PostgreSQL through `sqlx`, used whenever `DATABASE_URL` is set
//! - **`MemoryStore`** - process-local maps behind a `tokio::sync::RwLock`,
//!   used by tests and as the development fallback
//!
//! # Atomic Operations
//!
//! Operations that would race as check-then-act sequences are single store
//! calls instead:
//!
//! - `create_user` relies on the unique email constraint and reports `Conflict`
//! - `block_if_over_limit` counts and writes the block in one transaction
//! - `consume_otp` marks the record used and, for verification, flips the
//!   user's verified flag and stores the refresh-token record together
//! - `create_board` and `create_task` write their child rows in the same transaction
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs       - Store trait and StoreError
//! ├── memory.rs    - In-memory implementation
//! └── postgres/    - PostgreSQL implementation
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::planner::{
    ActiveState, Board, BoardMember, NewBoard, NewUser, Notification, OtpChannel, OtpRecord,
    ProfileUpdate, Task, TokenRecord, User,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness rule was violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend failure
    #[error("database error: {0}")]
    Database(String),
}

/// What `remove_account` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRemoval {
    /// The account owns boards or memberships and was marked deleted
    Deactivated,
    /// The account owned nothing and was removed
    Deleted,
}

/// Outcome of a password reset attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordReset {
    Updated,
    /// No verified, unexpired reset OTP for this reference
    NotAuthorized,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Insert a user; `Conflict` when the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Every account in creation order, soft-deleted ones included
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<User, StoreError>;
    async fn set_active_state(&self, id: Uuid, state: ActiveState) -> Result<(), StoreError>;
    /// Returns `false` when the user does not exist
    async fn mark_verified(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Soft-delete when the user owns boards or memberships, hard-delete otherwise
    async fn remove_account(&self, id: Uuid) -> Result<AccountRemoval, StoreError>;

    // OTP records and blocks

    /// Insert or overwrite the record for (email, channel, reference)
    async fn save_otp(&self, record: OtpRecord) -> Result<(), StoreError>;
    async fn find_otp(
        &self,
        email: &str,
        channel: OtpChannel,
        reference: &str,
    ) -> Result<Option<OtpRecord>, StoreError>;
    /// Mark an unused, unexpired record used. With `verification` set, the
    /// owning user is marked verified and the token record stored in the same
    /// transaction. Returns `false` when another request consumed it first.
    async fn consume_otp(
        &self,
        email: &str,
        channel: OtpChannel,
        reference: &str,
        now: DateTime<Utc>,
        verification: Option<TokenRecord>,
    ) -> Result<bool, StoreError>;
    /// Set a new password hash if a consumed reset OTP for `reference` is
    /// still unexpired, retiring the record so it cannot authorise twice
    async fn reset_password(
        &self,
        email: &str,
        reference: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<PasswordReset, StoreError>;
    /// True if an unexpired block exists; an expired one is deleted
    async fn is_blocked(&self, email: &str, channel: OtpChannel, now: DateTime<Utc>) -> Result<bool, StoreError>;
    /// Count unexpired records and write a block when the count reaches
    /// `limit`. Returns whether a block was written.
    ///
    /// Writing a block restarts the count at the block's expiry: records
    /// created before then no longer count toward the next block.
    async fn block_if_over_limit(
        &self,
        email: &str,
        channel: OtpChannel,
        now: DateTime<Utc>,
        limit: i64,
        block_for: Duration,
    ) -> Result<bool, StoreError>;

    // Refresh tokens

    /// Insert or overwrite the user's token record
    async fn save_token_record(&self, record: TokenRecord) -> Result<(), StoreError>;
    async fn find_token_record(&self, user_id: Uuid) -> Result<Option<TokenRecord>, StoreError>;
    /// Returns `false` when the user has no record
    async fn revoke_token_record(&self, user_id: Uuid) -> Result<bool, StoreError>;

    // Boards

    /// Insert a board; group boards get their creator as first member
    async fn create_board(&self, board: NewBoard) -> Result<Board, StoreError>;
    async fn find_board(&self, id: Uuid) -> Result<Option<Board>, StoreError>;
    async fn is_board_member(&self, board_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
    async fn boards_created_by(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError>;
    async fn memberships_of(&self, user_id: Uuid) -> Result<Vec<BoardMember>, StoreError>;
    /// Boards the user belongs to through a membership
    async fn shared_boards(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError>;
    /// Boards the user created that nobody has joined
    async fn personal_boards(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError>;

    // Tasks

    /// Insert a task and its optional notification together
    async fn create_task(&self, task: Task, notification: Option<Notification>) -> Result<(), StoreError>;
    async fn tasks_created_by(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;
    async fn notifications_for_task(&self, task_id: Uuid) -> Result<Vec<Notification>, StoreError>;
}
