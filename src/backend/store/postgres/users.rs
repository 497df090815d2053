/**
 * User Queries
 *
 * Database operations on the `users` table.
 */

use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::backend::store::{AccountRemoval, StoreError};
use crate::shared::planner::{ActiveState, NewUser, ProfileUpdate, Role, User};
use crate::shared::SharedError;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, profile, role, is_verified, is_active, created_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    profile: String,
    role: String,
    is_verified: bool,
    is_active: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = SharedError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            profile: row.profile,
            role: Role::parse(&row.role)?,
            is_verified: row.is_verified,
            active: ActiveState::from_code(&row.is_active)?,
            created_at: row.created_at,
        })
    }
}

fn into_user(row: Option<UserRow>) -> Result<Option<User>, StoreError> {
    Ok(row.map(User::try_from).transpose()?)
}

/// Insert a new active user
pub async fn insert_user<'e, E>(executor: E, user: NewUser) -> Result<User, StoreError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        INSERT INTO users (id, name, email, password_hash, profile, role, is_verified, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.profile)
    .bind(user.role.as_str())
    .bind(user.is_verified)
    .bind(ActiveState::Active.code())
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(User::try_from(row)?)
}

pub async fn get_user_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, StoreError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;

    into_user(row)
}

pub async fn list_users<'e, E>(executor: E) -> Result<Vec<User>, StoreError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
    ))
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(User::try_from).collect::<Result<_, _>>()?)
}

pub async fn get_user_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<User>, StoreError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    into_user(row)
}

/// Apply the non-empty fields of `update`
pub async fn update_profile<'e, E>(executor: E, id: Uuid, update: &ProfileUpdate) -> Result<User, StoreError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            password_hash = COALESCE($3, password_hash),
            profile = COALESCE($4, profile)
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(update.name.as_deref())
    .bind(update.password_hash.as_deref())
    .bind(update.profile.as_deref())
    .fetch_optional(executor)
    .await?;

    into_user(row)?.ok_or(StoreError::NotFound("User"))
}

pub async fn set_active_state<'e, E>(executor: E, id: Uuid, state: ActiveState) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
        .bind(id)
        .bind(state.code())
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("User"));
    }
    Ok(())
}

/// Returns `false` when no such user exists
pub async fn mark_verified<'e, E>(executor: E, id: Uuid) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE users SET is_verified = TRUE WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns `false` when no such user exists
pub async fn set_password_by_email<'e, E>(executor: E, email: &str, password_hash: &str) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
        .bind(email)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Soft- or hard-delete; run inside a transaction
pub async fn remove_account(conn: &mut PgConnection, id: Uuid) -> Result<AccountRemoval, StoreError> {
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    if exists.is_none() {
        return Err(StoreError::NotFound("User"));
    }

    let owns_something: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (SELECT 1 FROM boards WHERE created_by = $1)
            OR EXISTS (SELECT 1 FROM board_members WHERE user_id = $1)
        "#,
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    if owns_something {
        sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(ActiveState::Deleted.code())
            .execute(&mut *conn)
            .await?;
        Ok(AccountRemoval::Deactivated)
    } else {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(AccountRemoval::Deleted)
    }
}
