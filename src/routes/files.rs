/**
 * File Routes
 * CRUD API endpoints for the project file tree
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::db::models::{NewFile, UpdateFile};
use crate::routes::{bad_request, not_found, storage_error, SuccessResponse};
use crate::templates::FILE_KINDS;
use crate::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Request body for POST /api/projects/:id/files
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub parent_id: Option<i32>,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/projects/:id/files - Flat listing, client assembles the tree
pub async fn list_files(State(state): State<AppState>, Path(project_id): Path<i32>) -> Response {
    match state.playground.get_project(project_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Project not found"),
        Err(e) => return storage_error(e, "project"),
    }
    match state.playground.files_by_project(project_id).await {
        Ok(files) => (StatusCode::OK, Json(files)).into_response(),
        Err(e) => storage_error(e, "files"),
    }
}

/// POST /api/projects/:id/files - Create a file or folder node
pub async fn create_file(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    Json(payload): Json<CreateFileRequest>,
) -> Response {
    if payload.name.trim().is_empty() || payload.path.trim().is_empty() {
        return bad_request("Invalid file data");
    }
    if !FILE_KINDS.contains(&payload.kind.as_str()) {
        return bad_request("Invalid file data");
    }

    match state.playground.get_project(project_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Project not found"),
        Err(e) => return storage_error(e, "project"),
    }

    match state
        .playground
        .create_file(NewFile {
            project_id,
            parent_id: payload.parent_id,
            name: payload.name,
            path: payload.path,
            kind: payload.kind,
            content: payload.content,
        })
        .await
    {
        Ok(file) => (StatusCode::CREATED, Json(file)).into_response(),
        Err(e) => storage_error(e, "file"),
    }
}

/// GET /api/files/:id
pub async fn get_file(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.playground.get_file(id).await {
        Ok(Some(file)) => (StatusCode::OK, Json(file)).into_response(),
        Ok(None) => not_found("File not found"),
        Err(e) => storage_error(e, "file"),
    }
}

/// PATCH /api/files/:id - Partial merge (name, path, content)
pub async fn update_file(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(updates): Json<UpdateFile>,
) -> Response {
    match state.playground.update_file(id, updates).await {
        Ok(Some(file)) => (StatusCode::OK, Json(file)).into_response(),
        Ok(None) => not_found("File not found"),
        Err(e) => storage_error(e, "file"),
    }
}

/// DELETE /api/files/:id - Deletes the addressed node only
pub async fn delete_file(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.playground.delete_file(id).await {
        Ok(true) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Ok(false) => not_found("File not found"),
        Err(e) => storage_error(e, "file"),
    }
}
