/**
 * Media Routes
 * Multipart upload to local disk, listing, and deletion
 */
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use uuid::Uuid;

use crate::db::models::NewMedia;
use crate::routes::{bad_request, error, forbidden, not_found, storage_error, CurrentUser,
    SuccessResponse};
use crate::AppState;

/// Per-file size cap. The router's body limit sits slightly above this so
/// oversized files reach the handler and get a clean 400.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "mp4", "mov", "avi", "pdf"];

const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "application/pdf",
];

fn extension_of(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/media - The current user's uploads, newest first
pub async fn list_media(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    match state.portfolio.media_by_user(user.0).await {
        Ok(media) => (StatusCode::OK, Json(media)).into_response(),
        Err(e) => storage_error(e, "media"),
    }
}

/// POST /api/media - Accept one `file` field. Both the extension and the
/// declared content type must be on the allow-list; stored under a fresh
/// UUID filename and served back at /uploads/{filename}.
pub async fn upload_media(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Response {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return bad_request("No file provided"),
            Err(e) => {
                tracing::warn!(error = %e, "malformed multipart body");
                return bad_request("No file provided");
            }
        }
    };

    let original_name = match field.file_name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return bad_request("No file provided"),
    };
    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let extension = match extension_of(&original_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => ext,
        _ => return bad_request("Unsupported file type"),
    };
    if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
        return bad_request("Unsupported file type");
    }

    let data = match field.bytes().await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read upload body");
            return bad_request("No file provided");
        }
    };
    if data.len() > MAX_UPLOAD_BYTES {
        return bad_request("File too large");
    }

    let filename = format!("{}.{}", Uuid::new_v4(), extension);
    let destination = state.upload_dir.join(&filename);
    if let Err(e) = tokio::fs::create_dir_all(&state.upload_dir).await {
        tracing::error!(error = %e, "failed to create upload directory");
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store file");
    }
    if let Err(e) = tokio::fs::write(&destination, &data).await {
        tracing::error!(error = %e, path = %destination.display(), "failed to write upload");
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store file");
    }

    match state
        .portfolio
        .create_media(NewMedia {
            user_id: user.0,
            filename: filename.clone(),
            original_name,
            mime_type,
            size: data.len() as i64,
            url: format!("/uploads/{}", filename),
        })
        .await
    {
        Ok(media) => (StatusCode::CREATED, Json(media)).into_response(),
        Err(e) => storage_error(e, "media"),
    }
}

/// DELETE /api/media/:id - Remove the record; the disk unlink is best-effort
pub async fn delete_media(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Response {
    let media = match state.portfolio.get_media(id).await {
        Ok(Some(media)) => media,
        Ok(None) => return not_found("Media not found"),
        Err(e) => return storage_error(e, "media"),
    };
    if media.user_id != user.0 {
        return forbidden();
    }

    let path = state.upload_dir.join(&media.filename);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(error = %e, path = %path.display(), "failed to unlink media file");
    }

    match state.portfolio.delete_media(id).await {
        Ok(true) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Ok(false) => not_found("Media not found"),
        Err(e) => storage_error(e, "media"),
    }
}
