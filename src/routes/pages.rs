/**
 * Page Routes
 * Pages within a portfolio
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::db::models::NewPage;
use crate::routes::portfolios::owned_portfolio;
use crate::routes::{bad_request, storage_error, CurrentUser};
use crate::AppState;

/// Request body for POST /api/portfolios/:id/pages
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub is_home_page: bool,
    pub order: Option<i32>,
}

/// GET /api/portfolios/:id/pages - Pages in display order
pub async fn list_pages(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(portfolio_id): Path<i32>,
) -> Response {
    if let Err(response) = owned_portfolio(&state, user, portfolio_id).await {
        return response;
    }
    match state.portfolio.pages_by_portfolio(portfolio_id).await {
        Ok(pages) => (StatusCode::OK, Json(pages)).into_response(),
        Err(e) => storage_error(e, "pages"),
    }
}

/// POST /api/portfolios/:id/pages - Append a page. `isHomePage` is stored as
/// given; no uniqueness is enforced across the portfolio's pages.
pub async fn create_page(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(portfolio_id): Path<i32>,
    Json(payload): Json<CreatePageRequest>,
) -> Response {
    if payload.title.trim().is_empty() {
        return bad_request("Invalid page data");
    }
    if let Err(response) = owned_portfolio(&state, user, portfolio_id).await {
        return response;
    }

    let order = match payload.order {
        Some(order) => order,
        None => match state.portfolio.pages_by_portfolio(portfolio_id).await {
            Ok(pages) => pages.len() as i32,
            Err(e) => return storage_error(e, "pages"),
        },
    };

    match state
        .portfolio
        .create_page(NewPage {
            portfolio_id,
            title: payload.title,
            slug: payload.slug,
            is_home_page: payload.is_home_page,
            order,
        })
        .await
    {
        Ok(page) => (StatusCode::CREATED, Json(page)).into_response(),
        Err(e) => storage_error(e, "page"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, get, post_json, state};
    use serde_json::json;

    async fn seeded_portfolio(state: &crate::AppState) -> i64 {
        let (_, portfolio) = post_json(
            app(state.clone()),
            "/api/portfolios",
            json!({ "title": "p" }),
        )
        .await;
        portfolio["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_create_page_appends_after_home() {
        let state = state();
        let id = seeded_portfolio(&state).await;

        let (status, page) = post_json(
            app(state.clone()),
            &format!("/api/portfolios/{}/pages", id),
            json!({ "title": "About", "slug": "about" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(page["order"], 1);
        assert_eq!(page["isHomePage"], false);

        let (_, pages) = get(app(state), &format!("/api/portfolios/{}/pages", id)).await;
        let titles: Vec<&str> = pages
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Home", "About"]);
    }

    #[tokio::test]
    async fn test_second_home_page_is_not_rejected() {
        let state = state();
        let id = seeded_portfolio(&state).await;

        let (status, page) = post_json(
            app(state.clone()),
            &format!("/api/portfolios/{}/pages", id),
            json!({ "title": "Home 2", "slug": "home2", "isHomePage": true }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(page["isHomePage"], true);

        let (_, pages) = get(app(state), &format!("/api/portfolios/{}/pages", id)).await;
        let homes = pages
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["isHomePage"] == true)
            .count();
        assert_eq!(homes, 2);
    }

    #[tokio::test]
    async fn test_page_routes_404_on_missing_portfolio() {
        let state = state();
        let (status, _) = get(app(state.clone()), "/api/portfolios/999/pages").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = post_json(
            app(state),
            "/api/portfolios/999/pages",
            json!({ "title": "x", "slug": "x" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
