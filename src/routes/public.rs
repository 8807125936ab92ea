/**
 * Public Routes
 * Unauthenticated read access to published portfolios by domain
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::routes::portfolios::assemble_detail;
use crate::routes::{not_found, storage_error};
use crate::AppState;

/// GET /api/public/portfolios/domain/:domain - Full detail view for a
/// published portfolio. Unpublished portfolios are indistinguishable from
/// missing ones.
pub async fn get_portfolio_by_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Response {
    let portfolio = match state.portfolio.get_portfolio_by_domain(&domain).await {
        Ok(Some(portfolio)) if portfolio.is_published => portfolio,
        Ok(_) => return not_found("Portfolio not found"),
        Err(e) => return storage_error(e, "portfolio"),
    };
    match assemble_detail(&state, portfolio).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(response) => response,
    }
}
