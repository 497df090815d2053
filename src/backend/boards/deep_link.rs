//! Share payload for group boards: URL-safe base64 of
//! `boardId=<id>&expire=<unix seconds>`, valid for seven days.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

pub const SHARE_LINK_DAYS: i64 = 7;

pub fn share_payload(board_id: Uuid, now: DateTime<Utc>) -> String {
    let expire = (now + Duration::days(SHARE_LINK_DAYS)).timestamp();
    URL_SAFE.encode(format!("boardId={}&expire={}", board_id, expire))
}
