/**
 * Board Queries
 *
 * Database operations on `boards` and `board_members`.
 */

use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::backend::store::StoreError;
use crate::shared::planner::{Board, BoardKind, BoardMember};
use crate::shared::SharedError;

#[derive(Debug, sqlx::FromRow)]
struct BoardRow {
    id: Uuid,
    name: String,
    created_by: Uuid,
    kind: String,
    deep_link: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BoardRow> for Board {
    type Error = SharedError;

    fn try_from(row: BoardRow) -> Result<Self, Self::Error> {
        Ok(Board {
            id: row.id,
            name: row.name,
            created_by: row.created_by,
            kind: BoardKind::parse(&row.kind)?,
            deep_link: row.deep_link,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    board_id: Uuid,
    user_id: Uuid,
    added_at: DateTime<Utc>,
}

fn into_boards(rows: Vec<BoardRow>) -> Result<Vec<Board>, StoreError> {
    Ok(rows
        .into_iter()
        .map(Board::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

pub async fn insert_board<'e, E>(executor: E, board: &Board) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO boards (id, name, created_by, kind, deep_link, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(board.id)
    .bind(&board.name)
    .bind(board.created_by)
    .bind(board.kind.as_str())
    .bind(board.deep_link.as_deref())
    .bind(board.created_at)
    .bind(board.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn insert_member<'e, E>(
    executor: E,
    board_id: Uuid,
    user_id: Uuid,
    added_at: DateTime<Utc>,
) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query("INSERT INTO board_members (board_id, user_id, added_at) VALUES ($1, $2, $3)")
        .bind(board_id)
        .bind(user_id)
        .bind(added_at)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn get_board<'e, E>(executor: E, id: Uuid) -> Result<Option<Board>, StoreError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, BoardRow>(
        "SELECT id, name, created_by, kind, deep_link, created_at, updated_at FROM boards WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Board::try_from).transpose()?)
}

pub async fn is_member<'e, E>(executor: E, board_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>
where
    E: PgExecutor<'e>,
{
    let member: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM board_members WHERE board_id = $1 AND user_id = $2)",
    )
    .bind(board_id)
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    Ok(member)
}

pub async fn boards_created_by<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Board>, StoreError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, BoardRow>(
        r#"
        SELECT id, name, created_by, kind, deep_link, created_at, updated_at
        FROM boards
        WHERE created_by = $1
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    into_boards(rows)
}

pub async fn memberships_of<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<BoardMember>, StoreError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, MemberRow>(
        "SELECT board_id, user_id, added_at FROM board_members WHERE user_id = $1 ORDER BY added_at",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| BoardMember {
            board_id: row.board_id,
            user_id: row.user_id,
            added_at: row.added_at,
        })
        .collect())
}

pub async fn shared_boards<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Board>, StoreError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, BoardRow>(
        r#"
        SELECT b.id, b.name, b.created_by, b.kind, b.deep_link, b.created_at, b.updated_at
        FROM boards b
        JOIN board_members m ON m.board_id = b.id
        WHERE m.user_id = $1
        ORDER BY b.created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    into_boards(rows)
}

pub async fn personal_boards<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Board>, StoreError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, BoardRow>(
        r#"
        SELECT id, name, created_by, kind, deep_link, created_at, updated_at
        FROM boards
        WHERE created_by = $1
          AND id NOT IN (SELECT board_id FROM board_members)
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    into_boards(rows)
}
