/**
 * In-Memory Store
 *
 * A `Store` backed by plain collections behind one `tokio::sync::RwLock`.
 * Every trait method takes the lock once, so the multi-step operations are
 * as atomic here as their transactional PostgreSQL counterparts.
 *
 * Used by the test suites and by the server when `DATABASE_URL` is unset.
 * Nothing survives a restart.
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::store::{AccountRemoval, PasswordReset, Store, StoreError};
use crate::shared::planner::{
    ActiveState, Board, BoardKind, BoardMember, EmailBlock, NewBoard, NewUser, Notification,
    OtpChannel, OtpRecord, ProfileUpdate, Task, TokenRecord, User,
};

type OtpKey = (String, OtpChannel, String);

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    otps: HashMap<OtpKey, OtpRecord>,
    blocks: HashMap<(String, OtpChannel), EmailBlock>,
    /// Records created at or before this instant are not counted
    counts_from: HashMap<(String, OtpChannel), DateTime<Utc>>,
    tokens: HashMap<Uuid, TokenRecord>,
    boards: Vec<Board>,
    members: Vec<BoardMember>,
    tasks: Vec<Task>,
    notifications: Vec<Notification>,
}

impl MemoryState {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }
}

/// Process-local store
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn otp_key(email: &str, channel: OtpChannel, reference: &str) -> OtpKey {
    (email.to_string(), channel, reference.to_string())
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.user_by_email(&user.email).is_some() {
            return Err(StoreError::Conflict("Email is already registered".to_string()));
        }
        let user = user.into_user(Uuid::new_v4(), Utc::now());
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.user_by_email(email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        update.apply(user);
        Ok(user.clone())
    }

    async fn set_active_state(&self, id: Uuid, active: ActiveState) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(StoreError::NotFound("User"))?;
        user.active = active;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state
            .users
            .get_mut(&id)
            .map(|user| user.is_verified = true)
            .is_some())
    }

    async fn remove_account(&self, id: Uuid) -> Result<AccountRemoval, StoreError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Err(StoreError::NotFound("User"));
        }

        let owns_something = state.boards.iter().any(|b| b.created_by == id)
            || state.members.iter().any(|m| m.user_id == id);

        if owns_something {
            if let Some(user) = state.users.get_mut(&id) {
                user.active = ActiveState::Deleted;
            }
            Ok(AccountRemoval::Deactivated)
        } else {
            state.users.remove(&id);
            state.tokens.remove(&id);
            Ok(AccountRemoval::Deleted)
        }
    }

    async fn save_otp(&self, record: OtpRecord) -> Result<(), StoreError> {
        let key = otp_key(&record.email, record.channel, &record.reference);
        self.state.write().await.otps.insert(key, record);
        Ok(())
    }

    async fn find_otp(
        &self,
        email: &str,
        channel: OtpChannel,
        reference: &str,
    ) -> Result<Option<OtpRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .otps
            .get(&otp_key(email, channel, reference))
            .cloned())
    }

    async fn consume_otp(
        &self,
        email: &str,
        channel: OtpChannel,
        reference: &str,
        now: DateTime<Utc>,
        verification: Option<TokenRecord>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        if let Some(token) = &verification {
            if !state.users.contains_key(&token.user_id) {
                return Err(StoreError::NotFound("User"));
            }
        }

        match state.otps.get_mut(&otp_key(email, channel, reference)) {
            Some(record) if !record.is_used && !record.is_expired(now) => record.is_used = true,
            _ => return Ok(false),
        }

        if let Some(token) = verification {
            if let Some(user) = state.users.get_mut(&token.user_id) {
                user.is_verified = true;
            }
            state.tokens.insert(token.user_id, token);
        }
        Ok(true)
    }

    async fn reset_password(
        &self,
        email: &str,
        reference: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<PasswordReset, StoreError> {
        let mut state = self.state.write().await;

        let key = otp_key(email, OtpChannel::ResetPassword, reference);
        let authorised = matches!(
            state.otps.get(&key),
            Some(record) if record.is_used && !record.is_expired(now)
        );
        if !authorised {
            return Ok(PasswordReset::NotAuthorized);
        }

        let user = state
            .users
            .values_mut()
            .find(|u| u.email == email)
            .ok_or(StoreError::NotFound("User"))?;
        user.password_hash = password_hash.to_string();

        if let Some(record) = state.otps.get_mut(&key) {
            record.expires_at = now - Duration::seconds(1);
        }
        Ok(PasswordReset::Updated)
    }

    async fn is_blocked(&self, email: &str, channel: OtpChannel, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let key = (email.to_string(), channel);
        let expired = match state.blocks.get(&key) {
            Some(block) => block.is_expired(now),
            None => return Ok(false),
        };
        if expired {
            state.blocks.remove(&key);
            return Ok(false);
        }
        Ok(true)
    }

    async fn block_if_over_limit(
        &self,
        email: &str,
        channel: OtpChannel,
        now: DateTime<Utc>,
        limit: i64,
        block_for: Duration,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let key = (email.to_string(), channel);
        let counts_from = state.counts_from.get(&key).copied();
        let live = state
            .otps
            .values()
            .filter(|r| r.email == email && r.channel == channel && !r.is_expired(now))
            .filter(|r| counts_from.map_or(true, |from| r.created_at > from))
            .count() as i64;

        if live < limit {
            return Ok(false);
        }

        let expires_at = now + block_for;
        state.counts_from.insert(key.clone(), expires_at);
        state.blocks.insert(
            key,
            EmailBlock {
                email: email.to_string(),
                channel,
                created_at: now,
                expires_at,
            },
        );
        Ok(true)
    }

    async fn save_token_record(&self, record: TokenRecord) -> Result<(), StoreError> {
        self.state.write().await.tokens.insert(record.user_id, record);
        Ok(())
    }

    async fn find_token_record(&self, user_id: Uuid) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.state.read().await.tokens.get(&user_id).cloned())
    }

    async fn revoke_token_record(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.tokens.get_mut(&user_id) {
            Some(record) => {
                record.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_board(&self, board: NewBoard) -> Result<Board, StoreError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&board.created_by) {
            return Err(StoreError::NotFound("User"));
        }
        let now = Utc::now();
        let board = board.into_board(now);
        if board.kind == BoardKind::Group {
            state.members.push(BoardMember {
                board_id: board.id,
                user_id: board.created_by,
                added_at: now,
            });
        }
        state.boards.push(board.clone());
        Ok(board)
    }

    async fn find_board(&self, id: Uuid) -> Result<Option<Board>, StoreError> {
        Ok(self.state.read().await.boards.iter().find(|b| b.id == id).cloned())
    }

    async fn is_board_member(&self, board_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .members
            .iter()
            .any(|m| m.board_id == board_id && m.user_id == user_id))
    }

    async fn boards_created_by(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError> {
        let state = self.state.read().await;
        Ok(state.boards.iter().filter(|b| b.created_by == user_id).cloned().collect())
    }

    async fn memberships_of(&self, user_id: Uuid) -> Result<Vec<BoardMember>, StoreError> {
        let state = self.state.read().await;
        Ok(state.members.iter().filter(|m| m.user_id == user_id).cloned().collect())
    }

    async fn shared_boards(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .boards
            .iter()
            .filter(|b| state.members.iter().any(|m| m.board_id == b.id && m.user_id == user_id))
            .cloned()
            .collect())
    }

    async fn personal_boards(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .boards
            .iter()
            .filter(|b| b.created_by == user_id && !state.members.iter().any(|m| m.board_id == b.id))
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: Task, notification: Option<Notification>) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.boards.iter().any(|b| b.id == task.board_id) {
            return Err(StoreError::NotFound("Board"));
        }
        if let Some(notification) = notification {
            state.notifications.push(notification);
        }
        state.tasks.push(task);
        Ok(())
    }

    async fn tasks_created_by(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().filter(|t| t.created_by == user_id).cloned().collect())
    }

    async fn notifications_for_task(&self, task_id: Uuid) -> Result<Vec<Notification>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.task_id == task_id)
            .cloned()
            .collect())
    }
}
