/**
 * OTP Queries
 *
 * Database operations on `otp_records` and `email_blocks`.
 *
 * The rate limiter serialises on a transaction-scoped advisory lock keyed by
 * (email, channel), so two concurrent requests cannot both read a count below
 * the limit and skip the block.
 */

use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;

use crate::backend::store::StoreError;
use crate::shared::planner::{OtpChannel, OtpRecord};
use crate::shared::SharedError;

#[derive(Debug, sqlx::FromRow)]
struct OtpRow {
    email: String,
    channel: String,
    reference: String,
    code: String,
    is_used: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<OtpRow> for OtpRecord {
    type Error = SharedError;

    fn try_from(row: OtpRow) -> Result<Self, Self::Error> {
        Ok(OtpRecord {
            email: row.email,
            channel: OtpChannel::parse(&row.channel)?,
            reference: row.reference,
            code: row.code,
            is_used: row.is_used,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

/// Insert or overwrite the record for (email, channel, reference)
pub async fn upsert_otp<'e, E>(executor: E, record: &OtpRecord) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO otp_records (email, channel, reference, code, is_used, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (email, channel, reference) DO UPDATE
        SET code = EXCLUDED.code,
            is_used = EXCLUDED.is_used,
            created_at = EXCLUDED.created_at,
            expires_at = EXCLUDED.expires_at
        "#,
    )
    .bind(&record.email)
    .bind(record.channel.as_str())
    .bind(&record.reference)
    .bind(&record.code)
    .bind(record.is_used)
    .bind(record.created_at)
    .bind(record.expires_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn get_otp<'e, E>(
    executor: E,
    email: &str,
    channel: OtpChannel,
    reference: &str,
) -> Result<Option<OtpRecord>, StoreError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, OtpRow>(
        r#"
        SELECT email, channel, reference, code, is_used, created_at, expires_at
        FROM otp_records
        WHERE email = $1 AND channel = $2 AND reference = $3
        "#,
    )
    .bind(email)
    .bind(channel.as_str())
    .bind(reference)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(OtpRecord::try_from).transpose()?)
}

/// Conditionally mark a record used; `false` if it was used or expired already
pub async fn mark_used<'e, E>(
    executor: E,
    email: &str,
    channel: OtpChannel,
    reference: &str,
    now: DateTime<Utc>,
) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE otp_records
        SET is_used = TRUE
        WHERE email = $1 AND channel = $2 AND reference = $3
          AND is_used = FALSE AND expires_at >= $4
        "#,
    )
    .bind(email)
    .bind(channel.as_str())
    .bind(reference)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Expire a used, still-valid record; `false` if there was none
pub async fn retire_verified<'e, E>(
    executor: E,
    email: &str,
    channel: OtpChannel,
    reference: &str,
    now: DateTime<Utc>,
) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE otp_records
        SET expires_at = $4 - INTERVAL '1 second'
        WHERE email = $1 AND channel = $2 AND reference = $3
          AND is_used = TRUE AND expires_at >= $4
        "#,
    )
    .bind(email)
    .bind(channel.as_str())
    .bind(reference)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Serialise rate-limit checks for one (email, channel) until the transaction ends
pub async fn lock_email_channel<'e, E>(executor: E, email: &str, channel: OtpChannel) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || ':' || $2))")
        .bind(email)
        .bind(channel.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Unexpired records for (email, channel), used or not, created after the last block
pub async fn count_live<'e, E>(
    executor: E,
    email: &str,
    channel: OtpChannel,
    now: DateTime<Utc>,
) -> Result<i64, StoreError>
where
    E: PgExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM otp_records r
        LEFT JOIN otp_rate_windows w ON w.email = r.email AND w.channel = r.channel
        WHERE r.email = $1 AND r.channel = $2 AND r.expires_at >= $3
          AND (w.counts_from IS NULL OR r.created_at > w.counts_from)
        "#,
    )
    .bind(email)
    .bind(channel.as_str())
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

pub async fn upsert_block<'e, E>(
    executor: E,
    email: &str,
    channel: OtpChannel,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO email_blocks (email, channel, created_at, expires_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email, channel) DO UPDATE
        SET created_at = EXCLUDED.created_at, expires_at = EXCLUDED.expires_at
        "#,
    )
    .bind(email)
    .bind(channel.as_str())
    .bind(now)
    .bind(expires_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Stop counting records created at or before `counts_from`
pub async fn restart_count<'e, E>(
    executor: E,
    email: &str,
    channel: OtpChannel,
    counts_from: DateTime<Utc>,
) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO otp_rate_windows (email, channel, counts_from)
        VALUES ($1, $2, $3)
        ON CONFLICT (email, channel) DO UPDATE SET counts_from = EXCLUDED.counts_from
        "#,
    )
    .bind(email)
    .bind(channel.as_str())
    .bind(counts_from)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn delete_expired_block<'e, E>(
    executor: E,
    email: &str,
    channel: OtpChannel,
    now: DateTime<Utc>,
) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM email_blocks WHERE email = $1 AND channel = $2 AND expires_at < $3")
        .bind(email)
        .bind(channel.as_str())
        .bind(now)
        .execute(executor)
        .await?;

    if result.rows_affected() > 0 {
        tracing::debug!("Removed expired block for {} ({})", email, channel.as_str());
    }
    Ok(())
}

pub async fn has_block<'e, E>(
    executor: E,
    email: &str,
    channel: OtpChannel,
    now: DateTime<Utc>,
) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let blocked: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM email_blocks WHERE email = $1 AND channel = $2 AND expires_at >= $3)",
    )
    .bind(email)
    .bind(channel.as_str())
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(blocked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_row_with_unknown_channel_is_rejected() {
        let now = Utc::now();
        let row = OtpRow {
            email: "a@b.co".into(),
            channel: "sms".into(),
            reference: "R".into(),
            code: "1".into(),
            is_used: false,
            created_at: now,
            expires_at: now + Duration::minutes(15),
        };
        assert!(OtpRecord::try_from(row).is_err());
    }
}
