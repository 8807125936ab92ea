/**
 * User Routes
 * Current-user endpoint for the playground (demo session identity)
 */
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use crate::db::models::User;
use crate::routes::{not_found, storage_error, CurrentUser};
use crate::AppState;

/// User payload with the password stripped out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

/// GET /api/user - Return the current (demo) user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    match state.playground.get_user(user.0).await {
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Ok(None) => not_found("User not found"),
        Err(e) => storage_error(e, "user"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, get, state, state_as_user};

    #[tokio::test]
    async fn test_get_user_returns_demo_user_without_password() {
        let (status, body) = get(app(state()), "/api/user").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["username"], "demo");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_get_user_404_for_unknown_identity() {
        let (status, body) = get(app(state_as_user(42)), "/api/user").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }
}
