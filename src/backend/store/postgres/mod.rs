//! PostgreSQL Store
//!
//! `PgStore` implements `Store` on a `sqlx::PgPool`. Queries live in one file
//! per table group; each is a free function over an executor so the same
//! query can run on the pool or inside a transaction.
//!
//! # Module Structure
//!
//! ```text
//! postgres/
//! ├── mod.rs     - PgStore and error mapping
//! ├── users.rs   - users table
//! ├── otp.rs     - otp_records and email_blocks
//! ├── tokens.rs  - refresh_tokens
//! ├── boards.rs  - boards and board_members
//! └── tasks.rs   - tasks and notifications
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::store::{AccountRemoval, PasswordReset, Store, StoreError};
use crate::shared::planner::{
    ActiveState, Board, BoardKind, BoardMember, NewBoard, NewUser, Notification, OtpChannel,
    OtpRecord, ProfileUpdate, Task, TokenRecord, User,
};
use crate::shared::SharedError;

pub mod users;
pub mod otp;
pub mod tokens;
pub mod boards;
pub mod tasks;

/// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign_key_violation
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";

/// `Store` backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl From<SharedError> for StoreError {
    fn from(err: SharedError) -> Self {
        StoreError::Database(format!("corrupt row: {}", err))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        users::insert_user(&self.pool, user).await.map_err(|e| match e {
            StoreError::Conflict(_) => StoreError::Conflict("Email is already registered".to_string()),
            other => other,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        users::get_user_by_email(&self.pool, email).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        users::get_user_by_id(&self.pool, id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        users::list_users(&self.pool).await
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<User, StoreError> {
        users::update_profile(&self.pool, id, update).await
    }

    async fn set_active_state(&self, id: Uuid, state: ActiveState) -> Result<(), StoreError> {
        users::set_active_state(&self.pool, id, state).await
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, StoreError> {
        users::mark_verified(&self.pool, id).await
    }

    async fn remove_account(&self, id: Uuid) -> Result<AccountRemoval, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removal = users::remove_account(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(removal)
    }

    async fn save_otp(&self, record: OtpRecord) -> Result<(), StoreError> {
        otp::upsert_otp(&self.pool, &record).await
    }

    async fn find_otp(
        &self,
        email: &str,
        channel: OtpChannel,
        reference: &str,
    ) -> Result<Option<OtpRecord>, StoreError> {
        otp::get_otp(&self.pool, email, channel, reference).await
    }

    async fn consume_otp(
        &self,
        email: &str,
        channel: OtpChannel,
        reference: &str,
        now: DateTime<Utc>,
        verification: Option<TokenRecord>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        if !otp::mark_used(&mut *tx, email, channel, reference, now).await? {
            return Ok(false);
        }

        if let Some(token) = verification {
            if !users::mark_verified(&mut *tx, token.user_id).await? {
                return Err(StoreError::NotFound("User"));
            }
            tokens::upsert_token(&mut *tx, &token).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn reset_password(
        &self,
        email: &str,
        reference: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<PasswordReset, StoreError> {
        let mut tx = self.pool.begin().await?;

        if !otp::retire_verified(&mut *tx, email, OtpChannel::ResetPassword, reference, now).await? {
            return Ok(PasswordReset::NotAuthorized);
        }
        if !users::set_password_by_email(&mut *tx, email, password_hash).await? {
            return Err(StoreError::NotFound("User"));
        }

        tx.commit().await?;
        Ok(PasswordReset::Updated)
    }

    async fn is_blocked(&self, email: &str, channel: OtpChannel, now: DateTime<Utc>) -> Result<bool, StoreError> {
        otp::delete_expired_block(&self.pool, email, channel, now).await?;
        otp::has_block(&self.pool, email, channel, now).await
    }

    async fn block_if_over_limit(
        &self,
        email: &str,
        channel: OtpChannel,
        now: DateTime<Utc>,
        limit: i64,
        block_for: Duration,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        otp::lock_email_channel(&mut *tx, email, channel).await?;

        let live = otp::count_live(&mut *tx, email, channel, now).await?;
        if live < limit {
            tx.commit().await?;
            return Ok(false);
        }

        let expires_at = now + block_for;
        otp::upsert_block(&mut *tx, email, channel, now, expires_at).await?;
        otp::restart_count(&mut *tx, email, channel, expires_at).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn save_token_record(&self, record: TokenRecord) -> Result<(), StoreError> {
        tokens::upsert_token(&self.pool, &record).await
    }

    async fn find_token_record(&self, user_id: Uuid) -> Result<Option<TokenRecord>, StoreError> {
        tokens::get_token(&self.pool, user_id).await
    }

    async fn revoke_token_record(&self, user_id: Uuid) -> Result<bool, StoreError> {
        tokens::revoke_token(&self.pool, user_id).await
    }

    async fn create_board(&self, board: NewBoard) -> Result<Board, StoreError> {
        let now = Utc::now();
        let board = board.into_board(now);

        let mut tx = self.pool.begin().await?;
        boards::insert_board(&mut *tx, &board).await?;
        if board.kind == BoardKind::Group {
            boards::insert_member(&mut *tx, board.id, board.created_by, now).await?;
        }
        tx.commit().await?;

        Ok(board)
    }

    async fn find_board(&self, id: Uuid) -> Result<Option<Board>, StoreError> {
        boards::get_board(&self.pool, id).await
    }

    async fn is_board_member(&self, board_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        boards::is_member(&self.pool, board_id, user_id).await
    }

    async fn boards_created_by(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError> {
        boards::boards_created_by(&self.pool, user_id).await
    }

    async fn memberships_of(&self, user_id: Uuid) -> Result<Vec<BoardMember>, StoreError> {
        boards::memberships_of(&self.pool, user_id).await
    }

    async fn shared_boards(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError> {
        boards::shared_boards(&self.pool, user_id).await
    }

    async fn personal_boards(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError> {
        boards::personal_boards(&self.pool, user_id).await
    }

    async fn create_task(&self, task: Task, notification: Option<Notification>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        tasks::insert_task(&mut *tx, &task).await?;
        if let Some(notification) = &notification {
            tasks::insert_notification(&mut *tx, notification).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn tasks_created_by(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        tasks::tasks_created_by(&self.pool, user_id).await
    }

    async fn notifications_for_task(&self, task_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        tasks::notifications_for_task(&self.pool, task_id).await
    }
}
