/**
 * Health Routes
 * Liveness ping and a detailed status report
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use serde_json::json;
use std::time::Instant;

use crate::db;

static SERVER_START: OnceCell<Instant> = OnceCell::new();

/// Record process start. Called once from `run()`; uptime reads fall back to
/// zero if it never was.
pub fn init_start_time() {
    let _ = SERVER_START.set(Instant::now());
}

fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// GET /health - Cheap liveness probe
pub async fn health_ping() -> Response {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "uptimeSecs": uptime_secs() })),
    )
        .into_response()
}

/// GET /health/detailed - Uptime plus storage backend status. Reports
/// degraded (but still 200) when the database pool exists and fails its
/// probe; an in-memory deployment is healthy with no database at all.
pub async fn health_detailed() -> Response {
    let database = if db::get_pool().is_some() {
        match db::health_check().await {
            Ok(latency) => json!({
                "backend": "postgres",
                "status": "connected",
                "latencyMs": latency.as_millis() as u64,
            }),
            Err(e) => {
                tracing::error!(error = %e, "database health check failed");
                json!({ "backend": "postgres", "status": "error" })
            }
        }
    } else {
        json!({ "backend": "memory", "status": "ok" })
    };

    let body = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": uptime_secs(),
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{app, get, state};

    #[tokio::test]
    async fn test_health_ping() {
        let (status, body) = get(app(state()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["uptimeSecs"].is_u64());
    }

    #[tokio::test]
    async fn test_health_detailed_reports_memory_backend() {
        let (status, body) = get(app(state()), "/health/detailed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"]["backend"], "memory");
        assert!(body["version"].as_str().unwrap().len() > 0);
        assert!(body["uptimeSecs"].is_u64());
    }
}
