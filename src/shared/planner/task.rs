//! Tasks and their reminder notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "0")]
    Pending,
    #[serde(rename = "1")]
    InProgress,
    #[serde(rename = "2")]
    Completed,
}

impl TaskStatus {
    pub fn code(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "0",
            TaskStatus::InProgress => "1",
            TaskStatus::Completed => "2",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, SharedError> {
        match code {
            "0" => Ok(TaskStatus::Pending),
            "1" => Ok(TaskStatus::InProgress),
            "2" => Ok(TaskStatus::Completed),
            other => Err(SharedError::invalid_code("status", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    #[serde(rename = "1")]
    Low,
    #[serde(rename = "2")]
    Medium,
    #[serde(rename = "3")]
    High,
}

impl TaskPriority {
    pub fn code(&self) -> &'static str {
        match self {
            TaskPriority::Low => "1",
            TaskPriority::Medium => "2",
            TaskPriority::High => "3",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, SharedError> {
        match code {
            "1" => Ok(TaskPriority::Low),
            "2" => Ok(TaskPriority::Medium),
            "3" => Ok(TaskPriority::High),
            other => Err(SharedError::invalid_code("priority", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Option<TaskPriority>,
    pub created_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub task_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    pub before_due_date: Option<DateTime<Utc>>,
    pub recurring_pattern: Option<String>,
    pub snooze: Option<DateTime<Utc>>,
    /// Set once the reminder has been delivered
    pub is_sent: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub due_date: Option<DateTime<Utc>>,
    pub before_due_date: Option<DateTime<Utc>>,
    pub recurring_pattern: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub board_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Option<TaskPriority>,
    pub created_by: Uuid,
    pub reminder: Option<NewNotification>,
}

impl NewTask {
    /// Materialise the task and its optional notification with fresh ids
    pub fn into_records(self, now: DateTime<Utc>) -> (Task, Option<Notification>) {
        let task = Task {
            id: Uuid::new_v4(),
            board_id: self.board_id,
            name: self.name,
            description: self.description,
            status: self.status,
            priority: self.priority,
            created_by: self.created_by,
            updated_at: now,
        };
        let notification = self.reminder.map(|reminder| Notification {
            id: Uuid::new_v4(),
            task_id: task.id,
            due_date: reminder.due_date,
            before_due_date: reminder.before_due_date,
            recurring_pattern: reminder.recurring_pattern,
            snooze: None,
            is_sent: false,
            updated_at: now,
        });
        (task, notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TaskStatus::from_code("2").unwrap(), TaskStatus::Completed);
        assert_eq!(TaskStatus::InProgress.code(), "1");
        assert!(TaskStatus::from_code("3").is_err());
    }

    #[test]
    fn test_priority_codes() {
        assert_eq!(TaskPriority::from_code("3").unwrap(), TaskPriority::High);
        assert!(TaskPriority::from_code("0").is_err());
    }

    #[test]
    fn test_into_records_links_notification() {
        let new_task = NewTask {
            board_id: Uuid::new_v4(),
            name: "Buy milk".into(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: Some(TaskPriority::Low),
            created_by: Uuid::new_v4(),
            reminder: Some(NewNotification {
                due_date: Some(Utc::now()),
                before_due_date: None,
                recurring_pattern: Some("daily".into()),
            }),
        };
        let (task, notification) = new_task.into_records(Utc::now());
        let notification = notification.unwrap();
        assert_eq!(notification.task_id, task.id);
        assert!(!notification.is_sent);
        assert!(notification.snooze.is_none());
    }
}
