/**
 * Refresh Token Queries
 *
 * One row per user in `refresh_tokens`; every sign-in overwrites it.
 */

use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::backend::store::StoreError;
use crate::shared::planner::TokenRecord;

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    user_id: Uuid,
    token_hash: String,
    issued_at: DateTime<Utc>,
    expires_in_secs: i64,
    revoked: bool,
}

impl From<TokenRow> for TokenRecord {
    fn from(row: TokenRow) -> Self {
        TokenRecord {
            user_id: row.user_id,
            token_hash: row.token_hash,
            issued_at: row.issued_at,
            expires_in_secs: row.expires_in_secs,
            revoked: row.revoked,
        }
    }
}

pub async fn upsert_token<'e, E>(executor: E, record: &TokenRecord) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, token_hash, issued_at, expires_in_secs, revoked)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE
        SET token_hash = EXCLUDED.token_hash,
            issued_at = EXCLUDED.issued_at,
            expires_in_secs = EXCLUDED.expires_in_secs,
            revoked = EXCLUDED.revoked
        "#,
    )
    .bind(record.user_id)
    .bind(&record.token_hash)
    .bind(record.issued_at)
    .bind(record.expires_in_secs)
    .bind(record.revoked)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_token<'e, E>(executor: E, user_id: Uuid) -> Result<Option<TokenRecord>, StoreError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, TokenRow>(
        "SELECT user_id, token_hash, issued_at, expires_in_secs, revoked FROM refresh_tokens WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(TokenRecord::from))
}

pub async fn revoke_token<'e, E>(executor: E, user_id: Uuid) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
