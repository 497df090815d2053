/**
 * Task Handlers
 *
 * POST /task
 *
 * # Request
 *
 * ```json
 * {
 *   "boardid": "…", "taskname": "Write report", "description": "",
 *   "status": "0", "priority": "2",
 *   "reminder": { "duedate": "2025-03-01T09:00:00Z", "beforeduedate": null, "pattern": "weekly" }
 * }
 * ```
 *
 * Dates are RFC 3339. Every field is validated before anything is written,
 * so a rejected request leaves no task behind.
 */

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::{AppJson, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::error::require_non_empty;
use crate::shared::planner::{NewNotification, NewTask, TaskPriority, TaskStatus};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateTaskRequest {
    pub boardid: String,
    pub taskname: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub reminder: Option<ReminderRequest>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ReminderRequest {
    pub duedate: String,
    pub beforeduedate: Option<String>,
    pub pattern: String,
}

#[derive(Serialize, Debug)]
pub struct CreateTaskResponse {
    pub message: String,
    #[serde(rename = "taskID")]
    pub task_id: Uuid,
}

/// Empty means unset
fn parse_date(value: &str, field: &str) -> Result<Option<DateTime<Utc>>, BackendError> {
    if value.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|date| Some(date.with_timezone(&Utc)))
        .map_err(|_| BackendError::bad_request(format!("Invalid {} format", field)))
}

impl ReminderRequest {
    fn into_notification(self) -> Result<NewNotification, BackendError> {
        Ok(NewNotification {
            due_date: parse_date(&self.duedate, "due_date")?,
            before_due_date: parse_date(self.beforeduedate.as_deref().unwrap_or_default(), "before_due_date")?,
            recurring_pattern: Some(self.pattern).filter(|p| !p.is_empty()),
        })
    }
}

pub async fn create_task(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(request): AppJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreateTaskResponse>), BackendError> {
    require_non_empty("boardid", &request.boardid)?;
    require_non_empty("taskname", &request.taskname)?;
    require_non_empty("status", &request.status)?;

    let board_id = Uuid::parse_str(&request.boardid).map_err(|_| BackendError::bad_request("Invalid boardid"))?;
    let status = TaskStatus::from_code(&request.status)?;
    let priority = match request.priority.as_str() {
        "" => None,
        code => Some(TaskPriority::from_code(code)?),
    };
    let reminder = request.reminder.map(ReminderRequest::into_notification).transpose()?;

    let board = app_state
        .store
        .find_board(board_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Board not found"))?;
    if board.created_by != caller.user_id && !app_state.store.is_board_member(board.id, caller.user_id).await? {
        tracing::warn!("User {} refused task creation on board {}", caller.user_id, board.id);
        return Err(BackendError::forbidden("You do not have access to this board"));
    }

    let (task, notification) = NewTask {
        board_id,
        name: request.taskname,
        description: request.description,
        status,
        priority,
        created_by: caller.user_id,
        reminder,
    }
    .into_records(Utc::now());
    let task_id = task.id;

    app_state.store.create_task(task, notification).await?;
    tracing::info!("Task {} created on board {}", task_id, board_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            message: "Task created successfully".to_string(),
            task_id,
        }),
    ))
}
