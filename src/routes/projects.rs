/**
 * Project Routes
 * CRUD API endpoints for playground projects + mocked code execution
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::db::models::{NewProject, UpdateProject};
use crate::routes::{bad_request, not_found, storage_error, CurrentUser, SuccessResponse};
use crate::templates;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/projects
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub template: String,
}

/// Request body for POST /api/projects/:id/run
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub file_id: i32,
}

/// Mocked execution result. Nothing is actually executed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub execution_time: f64,
}

const MOCK_RUN_OUTPUT: &str = "\u{2713} Compiled successfully!\n\
     Local: http://localhost:3000\n\
     Network: http://192.168.1.100:3000\n\
     webpack compiled with 0 warnings";

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/projects - List the current user's projects
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    match state.playground.projects_by_user(user.0).await {
        Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
        Err(e) => storage_error(e, "projects"),
    }
}

/// POST /api/projects - Create a project and seed its template's file set
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateProjectRequest>,
) -> Response {
    if payload.name.trim().is_empty() {
        return bad_request("Invalid project data");
    }
    if payload.template.trim().is_empty() {
        return bad_request("Invalid project data");
    }

    let project = match state
        .playground
        .create_project(NewProject {
            user_id: user.0,
            name: payload.name,
            description: payload.description,
            template: payload.template,
        })
        .await
    {
        Ok(project) => project,
        Err(e) => return storage_error(e, "project"),
    };

    for file in templates::starter_files(&project.template, project.id) {
        if let Err(e) = state.playground.create_file(file).await {
            return storage_error(e, "project files");
        }
    }

    (StatusCode::CREATED, Json(project)).into_response()
}

/// GET /api/projects/:id
pub async fn get_project(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.playground.get_project(id).await {
        Ok(Some(project)) => (StatusCode::OK, Json(project)).into_response(),
        Ok(None) => not_found("Project not found"),
        Err(e) => storage_error(e, "project"),
    }
}

/// PATCH /api/projects/:id - Partial merge, re-stamps updatedAt
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(updates): Json<UpdateProject>,
) -> Response {
    if updates.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return bad_request("Invalid update data");
    }

    match state.playground.update_project(id, updates).await {
        Ok(Some(project)) => (StatusCode::OK, Json(project)).into_response(),
        Ok(None) => not_found("Project not found"),
        Err(e) => storage_error(e, "project"),
    }
}

/// DELETE /api/projects/:id
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.playground.delete_project(id).await {
        Ok(true) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Ok(false) => not_found("Project not found"),
        Err(e) => storage_error(e, "project"),
    }
}

/// POST /api/projects/:id/run - Mocked execution, returns a canned payload
pub async fn run_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RunRequest>,
) -> Response {
    let file = match state.playground.get_file(payload.file_id).await {
        Ok(Some(file)) => file,
        Ok(None) => return not_found("File not found"),
        Err(e) => return storage_error(e, "file"),
    };
    if file.project_id != id {
        return not_found("File not found");
    }

    let execution_time = rand::rng().random_range(500.0..2500.0);
    let output = RunResponse {
        success: true,
        output: MOCK_RUN_OUTPUT.to_string(),
        error: None,
        execution_time,
    };
    (StatusCode::OK, Json(output)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, get, post_json, send, state};
    use axum::http::Method;
    use serde_json::json;

    fn create_body(template: &str) -> serde_json::Value {
        json!({ "name": "my project", "template": template })
    }

    #[tokio::test]
    async fn test_create_project_seeds_react_template_files() {
        let state = state();
        let (status, project) = post_json(
            app(state.clone()),
            "/api/projects",
            create_body("React App"),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = project["id"].as_i64().unwrap();

        let (status, files) = get(app(state), &format!("/api/projects/{}/files", id)).await;
        assert_eq!(status, StatusCode::OK);
        let paths: Vec<&str> = files
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["path"].as_str().unwrap())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/README.md",
                "/src",
                "/src/App.js",
                "/src/App.css",
                "/src/index.js",
                "/public/index.html",
                "/package.json",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_project_unknown_template_seeds_readme_only() {
        let state = state();
        let (_, project) = post_json(
            app(state.clone()),
            "/api/projects",
            create_body("Fortran IV"),
        )
        .await;
        let id = project["id"].as_i64().unwrap();

        let (_, files) = get(app(state), &format!("/api/projects/{}/files", id)).await;
        assert_eq!(files.as_array().unwrap().len(), 1);
        assert_eq!(files[0]["path"], "/README.md");
    }

    #[tokio::test]
    async fn test_create_project_rejects_blank_name() {
        let (status, body) = post_json(
            app(state()),
            "/api/projects",
            json!({ "name": "  ", "template": "React App" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid project data");
    }

    #[tokio::test]
    async fn test_get_and_delete_missing_project_return_404() {
        let state = state();
        let (status, _) = get(app(state.clone()), "/api/projects/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app(state), Method::DELETE, "/api/projects/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_project_merges_partially() {
        let state = state();
        let (_, project) = post_json(
            app(state.clone()),
            "/api/projects",
            json!({ "name": "old", "description": "d", "template": "HTML/CSS/JS" }),
        )
        .await;
        let id = project["id"].as_i64().unwrap();

        let (status, updated) = send(
            app(state),
            Method::PATCH,
            &format!("/api/projects/{}", id),
            Some(json!({ "name": "new" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "new");
        assert_eq!(updated["description"], "d");
        assert_eq!(updated["template"], "HTML/CSS/JS");
    }

    #[tokio::test]
    async fn test_run_returns_canned_output_for_existing_file() {
        let state = state();
        let (_, project) = post_json(
            app(state.clone()),
            "/api/projects",
            create_body("HTML/CSS/JS"),
        )
        .await;
        let id = project["id"].as_i64().unwrap();
        let (_, files) = get(app(state.clone()), &format!("/api/projects/{}/files", id)).await;
        let file_id = files[0]["id"].as_i64().unwrap();

        let (status, run) = post_json(
            app(state),
            &format!("/api/projects/{}/run", id),
            json!({ "fileId": file_id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(run["success"], true);
        assert!(run["output"].as_str().unwrap().contains("Compiled successfully"));
        assert!(run["error"].is_null());
        let time = run["executionTime"].as_f64().unwrap();
        assert!((500.0..2500.0).contains(&time));
    }

    #[tokio::test]
    async fn test_run_with_missing_or_foreign_file_returns_404() {
        let state = state();
        let (_, a) = post_json(app(state.clone()), "/api/projects", create_body("React App")).await;
        let (_, b) = post_json(app(state.clone()), "/api/projects", create_body("React App")).await;
        let a_id = a["id"].as_i64().unwrap();
        let b_id = b["id"].as_i64().unwrap();

        let (status, _) = post_json(
            app(state.clone()),
            &format!("/api/projects/{}/run", a_id),
            json!({ "fileId": 9999 }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // A file from project B cannot be run through project A.
        let (_, b_files) = get(app(state.clone()), &format!("/api/projects/{}/files", b_id)).await;
        let b_file = b_files[0]["id"].as_i64().unwrap();
        let (status, _) = post_json(
            app(state),
            &format!("/api/projects/{}/run", a_id),
            json!({ "fileId": b_file }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_projects_listed_for_current_user_only() {
        let state = state();
        post_json(app(state.clone()), "/api/projects", create_body("React App")).await;

        let (status, list) = get(app(state.clone()), "/api/projects").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        // A different demo identity over the same store sees nothing.
        let other = crate::routes::testing::state_as_user(2);
        let (_, list) = get(app(other), "/api/projects").await;
        assert_eq!(list.as_array().unwrap().len(), 0);
    }
}
