/**
 * Routes Module
 * API route handlers
 */
pub mod chat;
pub mod files;
pub mod health;
pub mod media;
pub mod pages;
pub mod portfolios;
pub mod projects;
pub mod public;
pub mod sections;
pub mod user;
pub mod ws;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;
use crate::AppState;

/// Error response shared by every handler
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

/// Success response (for delete and reorder)
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Per-request identity, inserted by `inject_demo_identity`. Handlers read
/// it from request extensions instead of mutating ambient request state.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i32);

/// Session simulation: every request runs as the configured demo user.
/// Real authentication is deferred to an external identity provider.
pub async fn inject_demo_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(CurrentUser(state.demo_user_id));
    next.run(request).await
}

pub(crate) fn error(status: StatusCode, msg: &str) -> Response {
    (status, Json(ErrorResponse::new(msg))).into_response()
}

pub(crate) fn bad_request(msg: &str) -> Response {
    error(StatusCode::BAD_REQUEST, msg)
}

pub(crate) fn not_found(msg: &str) -> Response {
    error(StatusCode::NOT_FOUND, msg)
}

pub(crate) fn forbidden() -> Response {
    error(StatusCode::FORBIDDEN, "Access denied")
}

/// Map a storage failure: unique-key conflicts surface as 409, everything
/// else is logged and reported as a generic 500.
pub(crate) fn storage_error(e: StorageError, what: &str) -> Response {
    match e {
        StorageError::Conflict(detail) => {
            tracing::debug!(what, detail = %detail, "storage conflict");
            error(StatusCode::CONFLICT, &format!("{} already exists", what))
        }
        StorageError::Database(e) => {
            tracing::error!(what, error = %e, "storage error");
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to access {}", what),
            )
        }
    }
}
