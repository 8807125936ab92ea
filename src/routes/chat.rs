/**
 * Chat Routes
 * Per-project AI assistant conversation
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{ChatMessage, NewChatMessage};
use crate::routes::{bad_request, error, not_found, storage_error};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/projects/:id/chat
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub content: String,
}

/// Both halves of a completed exchange.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/projects/:id/chat - Conversation history in creation order
pub async fn list_messages(State(state): State<AppState>, Path(project_id): Path<i32>) -> Response {
    match state.playground.get_project(project_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Project not found"),
        Err(e) => return storage_error(e, "project"),
    }
    match state.playground.chat_messages_by_project(project_id).await {
        Ok(messages) => (StatusCode::OK, Json(messages)).into_response(),
        Err(e) => storage_error(e, "chat messages"),
    }
}

/// POST /api/projects/:id/chat - Store the user message, fetch a completion,
/// store the assistant reply. If the completion fails the user message stays
/// stored and the request reports a 500.
pub async fn post_message(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    Json(payload): Json<PostMessageRequest>,
) -> Response {
    if payload.content.trim().is_empty() {
        return bad_request("Message content is required");
    }

    match state.playground.get_project(project_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Project not found"),
        Err(e) => return storage_error(e, "project"),
    }

    let user_message = match state
        .playground
        .create_chat_message(NewChatMessage {
            project_id,
            role: "user".to_string(),
            content: payload.content.clone(),
        })
        .await
    {
        Ok(message) => message,
        Err(e) => return storage_error(e, "chat message"),
    };

    let reply = match state.completions.complete(&payload.content).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(project_id, error = %e, "completion request failed");
            return error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process chat message",
            );
        }
    };

    let assistant_message = match state
        .playground
        .create_chat_message(NewChatMessage {
            project_id,
            role: "assistant".to_string(),
            content: reply,
        })
        .await
    {
        Ok(message) => message,
        Err(e) => return storage_error(e, "chat message"),
    };

    (
        StatusCode::OK,
        Json(ChatExchange {
            user_message,
            assistant_message,
        }),
    )
        .into_response()
}
