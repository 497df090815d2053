/**
 * File Upload Handler
 *
 * POST /attachments/fileupload
 *
 * Reads the multipart field `file` and stores it as
 * `<upload_dir>/<unix-nanos>-<0..10000>.<ext>`, keeping only the original
 * extension. The route carries a 64 MiB body limit.
 *
 * # Example Response
 *
 * ```json
 * { "filename": "/uploads/1718000000000000000-4821.png" }
 * ```
 */

use std::path::Path;

use axum::{
    extract::{Multipart, State},
    response::Json,
};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub filename: String,
}

fn extension(original: &str) -> &str {
    Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

/// `<unix-nanos>-<rand>.<ext>`; the dot is kept even without an extension
pub fn stored_name(original: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let suffix = rand::rng().random_range(0..10_000);
    format!("{}-{}.{}", nanos, suffix, extension(original))
}

pub async fn upload_file(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, BackendError> {
    let bad_request = || BackendError::bad_request("Failed to get file from request");

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Malformed multipart body: {}", e);
        bad_request()
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload: {}", e);
            bad_request()
        })?;
        upload = Some((original, data));
        break;
    }
    let (original, data) = upload.ok_or_else(bad_request)?;

    let dir = &app_state.config.upload_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| BackendError::internal("Failed to create uploads directory", e))?;

    let filename = stored_name(&original);
    tokio::fs::write(dir.join(&filename), &data)
        .await
        .map_err(|e| BackendError::internal("Failed to save file", e))?;

    tracing::info!("Stored upload {} ({} bytes)", filename, data.len());

    Ok(Json(UploadResponse {
        filename: format!("/uploads/{}", filename),
    }))
}
