/**
 * Task Queries
 *
 * Database operations on `tasks` and `notifications`.
 */

use chrono::{DateTime, Utc};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use super::FOREIGN_KEY_VIOLATION;
use crate::backend::store::StoreError;
use crate::shared::planner::{Notification, Task, TaskPriority, TaskStatus};
use crate::shared::SharedError;

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    board_id: Uuid,
    name: String,
    description: String,
    status: String,
    priority: Option<String>,
    created_by: Uuid,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = SharedError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: row.id,
            board_id: row.board_id,
            name: row.name,
            description: row.description,
            status: TaskStatus::from_code(&row.status)?,
            priority: row.priority.as_deref().map(TaskPriority::from_code).transpose()?,
            created_by: row.created_by,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    task_id: Uuid,
    due_date: Option<DateTime<Utc>>,
    before_due_date: Option<DateTime<Utc>>,
    recurring_pattern: Option<String>,
    snooze: Option<DateTime<Utc>>,
    is_sent: bool,
    updated_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            task_id: row.task_id,
            due_date: row.due_date,
            before_due_date: row.before_due_date,
            recurring_pattern: row.recurring_pattern,
            snooze: row.snooze,
            is_sent: row.is_sent,
            updated_at: row.updated_at,
        }
    }
}

/// Insert a task; a missing board surfaces as `NotFound("Board")`
pub async fn insert_task<'e, E>(executor: E, task: &Task) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO tasks (id, board_id, name, description, status, priority, created_by, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(task.id)
    .bind(task.board_id)
    .bind(&task.name)
    .bind(&task.description)
    .bind(task.status.code())
    .bind(task.priority.map(|p| p.code()))
    .bind(task.created_by)
    .bind(task.updated_at)
    .execute(executor)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            StoreError::NotFound("Board")
        }
        _ => StoreError::from(e),
    })?;

    Ok(())
}

pub async fn insert_notification<'e, E>(executor: E, notification: &Notification) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO notifications
            (id, task_id, due_date, before_due_date, recurring_pattern, snooze, is_sent, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(notification.id)
    .bind(notification.task_id)
    .bind(notification.due_date)
    .bind(notification.before_due_date)
    .bind(notification.recurring_pattern.as_deref())
    .bind(notification.snooze)
    .bind(notification.is_sent)
    .bind(notification.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn tasks_created_by<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Task>, StoreError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, TaskRow>(
        r#"
        SELECT id, board_id, name, description, status, priority, created_by, updated_at
        FROM tasks
        WHERE created_by = $1
        ORDER BY updated_at
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(Task::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

pub async fn notifications_for_task<'e, E>(executor: E, task_id: Uuid) -> Result<Vec<Notification>, StoreError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT id, task_id, due_date, before_due_date, recurring_pattern, snooze, is_sent, updated_at
        FROM notifications
        WHERE task_id = $1
        "#,
    )
    .bind(task_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Notification::from).collect())
}
