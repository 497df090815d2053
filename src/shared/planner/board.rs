//! Boards and board membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    Private,
    Group,
}

impl BoardKind {
    /// Parse the `is_group` flag sent by clients (`"0"` private, `"1"` group)
    pub fn from_flag(flag: &str) -> Result<Self, SharedError> {
        match flag {
            "0" => Ok(BoardKind::Private),
            "1" => Ok(BoardKind::Group),
            other => Err(SharedError::invalid_code("is_group", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardKind::Private => "private",
            BoardKind::Group => "group",
        }
    }

    pub fn parse(value: &str) -> Result<Self, SharedError> {
        match value {
            "private" => Ok(BoardKind::Private),
            "group" => Ok(BoardKind::Group),
            other => Err(SharedError::invalid_code("board kind", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub kind: BoardKind,
    /// Share link payload, group boards only
    pub deep_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBoard {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub kind: BoardKind,
    pub deep_link: Option<String>,
}

impl NewBoard {
    pub fn into_board(self, now: DateTime<Utc>) -> Board {
        Board {
            id: self.id,
            name: self.name,
            created_by: self.created_by,
            kind: self.kind,
            deep_link: self.deep_link,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardMember {
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub added_at: DateTime<Utc>,
}
