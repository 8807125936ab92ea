/**
 * Section Routes
 * Typed content blocks within a page, including bulk reorder
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::db::models::{NewSection, Page, Section, UpdateSection};
use crate::routes::portfolios::owned_portfolio;
use crate::routes::{bad_request, not_found, storage_error, CurrentUser, SuccessResponse};
use crate::templates::SECTION_KINDS;
use crate::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Request body for POST /api/pages/:id/sections
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default)]
    pub styles: serde_json::Value,
    pub order: Option<i32>,
}

/// Request body for POST /api/pages/:id/sections/reorder
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub section_ids: Vec<i32>,
}

// ============================================================================
// Ownership helpers
// ============================================================================

async fn owned_page(state: &AppState, user: CurrentUser, page_id: i32) -> Result<Page, Response> {
    let page = match state.portfolio.get_page(page_id).await {
        Ok(Some(page)) => page,
        Ok(None) => return Err(not_found("Page not found")),
        Err(e) => return Err(storage_error(e, "page")),
    };
    owned_portfolio(state, user, page.portfolio_id).await?;
    Ok(page)
}

async fn owned_section(
    state: &AppState,
    user: CurrentUser,
    section_id: i32,
) -> Result<Section, Response> {
    let section = match state.portfolio.get_section(section_id).await {
        Ok(Some(section)) => section,
        Ok(None) => return Err(not_found("Section not found")),
        Err(e) => return Err(storage_error(e, "section")),
    };
    owned_page(state, user, section.page_id).await?;
    Ok(section)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/pages/:id/sections - Sections in display order
pub async fn list_sections(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(page_id): Path<i32>,
) -> Response {
    if let Err(response) = owned_page(&state, user, page_id).await {
        return response;
    }
    match state.portfolio.sections_by_page(page_id).await {
        Ok(sections) => (StatusCode::OK, Json(sections)).into_response(),
        Err(e) => storage_error(e, "sections"),
    }
}

/// POST /api/pages/:id/sections - Append a section of a known kind
pub async fn create_section(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(page_id): Path<i32>,
    Json(payload): Json<CreateSectionRequest>,
) -> Response {
    if !SECTION_KINDS.contains(&payload.kind.as_str()) {
        return bad_request("Invalid section type");
    }
    if let Err(response) = owned_page(&state, user, page_id).await {
        return response;
    }

    let order = match payload.order {
        Some(order) => order,
        None => match state.portfolio.sections_by_page(page_id).await {
            Ok(sections) => sections.len() as i32,
            Err(e) => return storage_error(e, "sections"),
        },
    };

    let content = if payload.content.is_null() {
        serde_json::json!({})
    } else {
        payload.content
    };
    let styles = if payload.styles.is_null() {
        serde_json::json!({})
    } else {
        payload.styles
    };

    match state
        .portfolio
        .create_section(NewSection {
            page_id,
            kind: payload.kind,
            content,
            styles,
            order,
        })
        .await
    {
        Ok(section) => (StatusCode::CREATED, Json(section)).into_response(),
        Err(e) => storage_error(e, "section"),
    }
}

/// POST /api/pages/:id/sections/reorder - Rewrite each listed section's order
/// to its index in the submitted list. Ids outside the page are ignored.
pub async fn reorder_sections(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(page_id): Path<i32>,
    Json(payload): Json<ReorderRequest>,
) -> Response {
    if let Err(response) = owned_page(&state, user, page_id).await {
        return response;
    }
    match state
        .portfolio
        .reorder_sections(page_id, &payload.section_ids)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => storage_error(e, "sections"),
    }
}

/// PUT /api/sections/:id - Partial merge of type/content/styles/order
pub async fn update_section(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(updates): Json<UpdateSection>,
) -> Response {
    if updates
        .kind
        .as_deref()
        .is_some_and(|k| !SECTION_KINDS.contains(&k))
    {
        return bad_request("Invalid section type");
    }
    if let Err(response) = owned_section(&state, user, id).await {
        return response;
    }
    match state.portfolio.update_section(id, updates).await {
        Ok(Some(section)) => (StatusCode::OK, Json(section)).into_response(),
        Ok(None) => not_found("Section not found"),
        Err(e) => storage_error(e, "section"),
    }
}

/// DELETE /api/sections/:id
pub async fn delete_section(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Response {
    if let Err(response) = owned_section(&state, user, id).await {
        return response;
    }
    match state.portfolio.delete_section(id).await {
        Ok(true) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Ok(false) => not_found("Section not found"),
        Err(e) => storage_error(e, "section"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, get, post_json, send, state};
    use axum::http::Method;
    use serde_json::json;

    /// Create a portfolio and return its seeded home page id.
    async fn seeded_home_page(state: &crate::AppState) -> i64 {
        let (_, portfolio) = post_json(
            app(state.clone()),
            "/api/portfolios",
            json!({ "title": "p" }),
        )
        .await;
        let id = portfolio["id"].as_i64().unwrap();
        let (_, pages) = get(app(state.clone()), &format!("/api/portfolios/{}/pages", id)).await;
        pages[0]["id"].as_i64().unwrap()
    }

    async fn section_ids(state: &crate::AppState, page_id: i64) -> Vec<i64> {
        let (_, sections) = get(app(state.clone()), &format!("/api/pages/{}/sections", page_id)).await;
        sections
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_create_section_appends_with_defaults() {
        let state = state();
        let page_id = seeded_home_page(&state).await;

        let (status, section) = post_json(
            app(state.clone()),
            &format!("/api/pages/{}/sections", page_id),
            json!({ "type": "video" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        // Four starter sections occupy orders 0..=3.
        assert_eq!(section["order"], 4);
        assert_eq!(section["content"], json!({}));
        assert_eq!(section["styles"], json!({}));
    }

    #[tokio::test]
    async fn test_create_section_rejects_unknown_kind() {
        let state = state();
        let page_id = seeded_home_page(&state).await;

        let (status, body) = post_json(
            app(state),
            &format!("/api/pages/{}/sections", page_id),
            json!({ "type": "carousel" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid section type");
    }

    #[tokio::test]
    async fn test_reorder_rewrites_orders_positionally() {
        let state = state();
        let page_id = seeded_home_page(&state).await;
        let ids = section_ids(&state, page_id).await;

        let reversed: Vec<i64> = ids.iter().rev().copied().collect();
        let (status, body) = post_json(
            app(state.clone()),
            &format!("/api/pages/{}/sections/reorder", page_id),
            json!({ "sectionIds": reversed.clone() }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let after = section_ids(&state, page_id).await;
        assert_eq!(after, reversed);
    }

    #[tokio::test]
    async fn test_reorder_ignores_ids_from_other_pages() {
        let state = state();
        let page_a = seeded_home_page(&state).await;
        let page_b = seeded_home_page(&state).await;
        let a_ids = section_ids(&state, page_a).await;
        let b_ids = section_ids(&state, page_b).await;

        // Submit page B's ids against page A: nothing on either page moves.
        let (status, _) = post_json(
            app(state.clone()),
            &format!("/api/pages/{}/sections/reorder", page_a),
            json!({ "sectionIds": b_ids.clone() }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(section_ids(&state, page_a).await, a_ids);
        assert_eq!(section_ids(&state, page_b).await, b_ids);
    }

    #[tokio::test]
    async fn test_update_and_delete_section() {
        let state = state();
        let page_id = seeded_home_page(&state).await;
        let ids = section_ids(&state, page_id).await;

        let (status, updated) = send(
            app(state.clone()),
            Method::PUT,
            &format!("/api/sections/{}", ids[0]),
            Some(json!({ "content": { "heading": "Hi" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["content"]["heading"], "Hi");

        let (status, _) = send(
            app(state.clone()),
            Method::DELETE,
            &format!("/api/sections/{}", ids[0]),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(section_ids(&state, page_id).await.len(), ids.len() - 1);
    }

    #[tokio::test]
    async fn test_update_section_rejects_unknown_kind() {
        let state = state();
        let page_id = seeded_home_page(&state).await;
        let ids = section_ids(&state, page_id).await;

        let (status, _) = send(
            app(state),
            Method::PUT,
            &format!("/api/sections/{}", ids[0]),
            Some(json!({ "type": "marquee" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_foreign_user_cannot_read_or_edit_sections() {
        let state = state();
        let page_id = seeded_home_page(&state).await;
        let ids = section_ids(&state, page_id).await;

        // Same store, different identity.
        let mut other = crate::routes::testing::state_as_user(2);
        other.portfolio = state.portfolio.clone();
        other.playground = state.playground.clone();

        let (status, body) = get(
            app(other.clone()),
            &format!("/api/pages/{}/sections", page_id),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Access denied");

        let (status, _) = send(
            app(other),
            Method::PUT,
            &format!("/api/sections/{}", ids[0]),
            Some(json!({ "content": { "heading": "hijack" } })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // The owner still sees the section untouched.
        let (_, sections) = get(app(state), &format!("/api/pages/{}/sections", page_id)).await;
        assert_eq!(sections[0]["content"], json!({}));
    }

    #[tokio::test]
    async fn test_section_routes_404_on_missing_page_or_section() {
        let state = state();
        let (status, _) = get(app(state.clone()), "/api/pages/999/sections").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app(state), Method::DELETE, "/api/sections/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
