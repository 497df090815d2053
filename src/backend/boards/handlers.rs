/**
 * Board Handlers
 *
 * - POST /board - create a private or group board
 * - GET /board?is_group=0|1 - the caller's personal or shared boards
 *
 * Personal boards are the ones the caller created that have no members;
 * shared boards are the ones the caller belongs to through a membership.
 */

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::boards::deep_link::share_payload;
use crate::backend::error::{AppJson, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::error::require_non_empty;
use crate::shared::planner::{Board, BoardKind, NewBoard};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateBoardRequest {
    pub board_name: String,
    /// `"0"` private, `"1"` group
    pub is_group: String,
}

#[derive(Serialize, Debug)]
pub struct CreateBoardResponse {
    #[serde(rename = "boardId")]
    pub board_id: Uuid,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_link: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct BoardListQuery {
    pub is_group: String,
}

pub async fn create_board(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(request): AppJson<CreateBoardRequest>,
) -> Result<(StatusCode, Json<CreateBoardResponse>), BackendError> {
    require_non_empty("board_name", &request.board_name)?;
    let kind = BoardKind::from_flag(&request.is_group)?;

    let id = Uuid::new_v4();
    let deep_link = match kind {
        BoardKind::Group => Some(share_payload(id, Utc::now())),
        BoardKind::Private => None,
    };

    let board = app_state
        .store
        .create_board(NewBoard {
            id,
            name: request.board_name,
            created_by: caller.user_id,
            kind,
            deep_link,
        })
        .await?;

    tracing::info!("Board {} ({}) created by {}", board.id, kind.as_str(), caller.user_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateBoardResponse {
            board_id: board.id,
            message: "Board created successfully".to_string(),
            deep_link: board.deep_link,
        }),
    ))
}

pub async fn list_boards(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<BoardListQuery>,
) -> Result<Json<Vec<Board>>, BackendError> {
    let boards = match BoardKind::from_flag(&query.is_group)? {
        BoardKind::Group => app_state.store.shared_boards(caller.user_id).await?,
        BoardKind::Private => app_state.store.personal_boards(caller.user_id).await?,
    };
    Ok(Json(boards))
}
