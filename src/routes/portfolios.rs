/**
 * Portfolio Routes
 * CRUD API endpoints for portfolios, including the assembled detail view
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{NewPage, NewPortfolio, NewSection, Page, Portfolio, Section,
    UpdatePortfolio};
use crate::routes::{bad_request, forbidden, not_found, storage_error, CurrentUser,
    SuccessResponse};
use crate::templates;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/portfolios
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    pub title: String,
    pub domain: Option<String>,
    pub template: Option<String>,
    pub theme: Option<serde_json::Value>,
}

/// Page with its sections inlined, for the detail view.
#[derive(Debug, Serialize)]
pub struct PageDetail {
    #[serde(flatten)]
    pub page: Page,
    pub sections: Vec<Section>,
}

/// Portfolio with its full page/section tree inlined.
#[derive(Debug, Serialize)]
pub struct PortfolioDetail {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub pages: Vec<PageDetail>,
}

/// Assemble the full detail view: the portfolio row plus every page with its
/// sections, both in their stored order. Shared with the public route.
pub(crate) async fn assemble_detail(
    state: &AppState,
    portfolio: Portfolio,
) -> Result<PortfolioDetail, Response> {
    let pages = state
        .portfolio
        .pages_by_portfolio(portfolio.id)
        .await
        .map_err(|e| storage_error(e, "pages"))?;

    let mut detail_pages = Vec::with_capacity(pages.len());
    for page in pages {
        let sections = state
            .portfolio
            .sections_by_page(page.id)
            .await
            .map_err(|e| storage_error(e, "sections"))?;
        detail_pages.push(PageDetail { page, sections });
    }

    Ok(PortfolioDetail {
        portfolio,
        pages: detail_pages,
    })
}

/// Look up a portfolio and check it belongs to the current user.
pub(crate) async fn owned_portfolio(
    state: &AppState,
    user: CurrentUser,
    id: i32,
) -> Result<Portfolio, Response> {
    match state.portfolio.get_portfolio(id).await {
        Ok(Some(portfolio)) if portfolio.user_id == user.0 => Ok(portfolio),
        Ok(Some(_)) => Err(forbidden()),
        Ok(None) => Err(not_found("Portfolio not found")),
        Err(e) => Err(storage_error(e, "portfolio")),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/portfolios - List the current user's portfolios
pub async fn list_portfolios(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Response {
    match state.portfolio.portfolios_by_user(user.0).await {
        Ok(portfolios) => (StatusCode::OK, Json(portfolios)).into_response(),
        Err(e) => storage_error(e, "portfolios"),
    }
}

/// POST /api/portfolios - Create a portfolio, its Home page, and the
/// template's starter sections
pub async fn create_portfolio(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreatePortfolioRequest>,
) -> Response {
    if payload.title.trim().is_empty() {
        return bad_request("Invalid portfolio data");
    }

    let template = payload
        .template
        .unwrap_or_else(|| templates::DEFAULT_PORTFOLIO_TEMPLATE.to_string());
    let theme = payload.theme.unwrap_or_else(templates::default_theme);

    let portfolio = match state
        .portfolio
        .create_portfolio(NewPortfolio {
            user_id: user.0,
            title: payload.title,
            domain: payload.domain,
            template,
            theme,
            is_published: false,
        })
        .await
    {
        Ok(portfolio) => portfolio,
        Err(e) => return storage_error(e, "portfolio"),
    };

    let home = match state
        .portfolio
        .create_page(NewPage {
            portfolio_id: portfolio.id,
            title: "Home".to_string(),
            slug: "".to_string(),
            is_home_page: true,
            order: 0,
        })
        .await
    {
        Ok(page) => page,
        Err(e) => return storage_error(e, "page"),
    };

    for (index, kind) in templates::starter_sections(&portfolio.template)
        .iter()
        .enumerate()
    {
        let seeded = state
            .portfolio
            .create_section(NewSection {
                page_id: home.id,
                kind: kind.to_string(),
                content: serde_json::json!({}),
                styles: serde_json::json!({}),
                order: index as i32,
            })
            .await;
        if let Err(e) = seeded {
            return storage_error(e, "sections");
        }
    }

    (StatusCode::CREATED, Json(portfolio)).into_response()
}

/// GET /api/portfolios/:id - Assembled detail view (pages with sections)
pub async fn get_portfolio(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Response {
    let portfolio = match owned_portfolio(&state, user, id).await {
        Ok(portfolio) => portfolio,
        Err(response) => return response,
    };
    match assemble_detail(&state, portfolio).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(response) => response,
    }
}

/// PUT /api/portfolios/:id - Partial merge; publishing flips isPublished
pub async fn update_portfolio(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(updates): Json<UpdatePortfolio>,
) -> Response {
    if let Err(response) = owned_portfolio(&state, user, id).await {
        return response;
    }
    if updates.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return bad_request("Invalid update data");
    }

    match state.portfolio.update_portfolio(id, updates).await {
        Ok(Some(portfolio)) => (StatusCode::OK, Json(portfolio)).into_response(),
        Ok(None) => not_found("Portfolio not found"),
        Err(e) => storage_error(e, "portfolio"),
    }
}

/// DELETE /api/portfolios/:id
pub async fn delete_portfolio(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Response {
    if let Err(response) = owned_portfolio(&state, user, id).await {
        return response;
    }
    match state.portfolio.delete_portfolio(id).await {
        Ok(true) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Ok(false) => not_found("Portfolio not found"),
        Err(e) => storage_error(e, "portfolio"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, get, post_json, send, state, state_as_user};
    use axum::http::Method;
    use serde_json::json;

    pub(crate) async fn created_portfolio(
        state: &crate::AppState,
        body: serde_json::Value,
    ) -> serde_json::Value {
        let (status, portfolio) = post_json(app(state.clone()), "/api/portfolios", body).await;
        assert_eq!(status, StatusCode::CREATED);
        portfolio
    }

    #[tokio::test]
    async fn test_create_portfolio_applies_defaults_and_seeds_home_page() {
        let state = state();
        let portfolio = created_portfolio(&state, json!({ "title": "My Work" })).await;
        assert_eq!(portfolio["template"], "minimal");
        assert_eq!(portfolio["isPublished"], false);
        assert_eq!(portfolio["theme"]["colors"]["primary"], "#2563eb");

        let id = portfolio["id"].as_i64().unwrap();
        let (status, detail) = get(app(state), &format!("/api/portfolios/{}", id)).await;
        assert_eq!(status, StatusCode::OK);

        let pages = detail["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0]["title"], "Home");
        assert_eq!(pages[0]["slug"], "");
        assert_eq!(pages[0]["isHomePage"], true);

        let kinds: Vec<&str> = pages[0]["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["type"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["hero", "gallery", "text", "contact"]);
        assert_eq!(pages[0]["sections"][0]["content"], json!({}));
    }

    #[tokio::test]
    async fn test_creative_template_seeds_video_section() {
        let state = state();
        let portfolio =
            created_portfolio(&state, json!({ "title": "Art", "template": "creative" })).await;
        let id = portfolio["id"].as_i64().unwrap();

        let (_, detail) = get(app(state), &format!("/api/portfolios/{}", id)).await;
        let kinds: Vec<&str> = detail["pages"][0]["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["type"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["hero", "gallery", "text", "video", "contact"]);
    }

    #[tokio::test]
    async fn test_duplicate_domain_conflicts() {
        let state = state();
        created_portfolio(&state, json!({ "title": "a", "domain": "me.example" })).await;

        let (status, err) = post_json(
            app(state),
            "/api/portfolios",
            json!({ "title": "b", "domain": "me.example" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["error"], "portfolio already exists");
    }

    #[tokio::test]
    async fn test_foreign_portfolio_is_forbidden() {
        let state = state();
        let portfolio = created_portfolio(&state, json!({ "title": "mine" })).await;
        let id = portfolio["id"].as_i64().unwrap();

        // Same store, different identity.
        let mut other = state_as_user(2);
        other.portfolio = state.portfolio.clone();
        other.playground = state.playground.clone();

        let (status, body) = get(app(other.clone()), &format!("/api/portfolios/{}", id)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Access denied");

        let (status, _) = send(
            app(other),
            Method::DELETE,
            &format!("/api/portfolios/{}", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_publish_via_update() {
        let state = state();
        let portfolio =
            created_portfolio(&state, json!({ "title": "soon", "domain": "soon.example" })).await;
        let id = portfolio["id"].as_i64().unwrap();

        let (status, updated) = send(
            app(state),
            Method::PUT,
            &format!("/api/portfolios/{}", id),
            Some(json!({ "isPublished": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["isPublished"], true);
        assert_eq!(updated["title"], "soon");
    }

    #[tokio::test]
    async fn test_missing_portfolio_404() {
        let (status, _) = get(app(state()), "/api/portfolios/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
