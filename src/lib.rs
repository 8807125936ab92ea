//! Studio Backend - library for app logic and testing
//!
//! One axum service hosting two bundled products: the DevStudio code
//! playground (projects, files, AI chat, mocked execution, WebSocket relay)
//! and the CreativePort portfolio builder (portfolios, pages, sections,
//! media, public publishing by domain).

pub mod ai;
pub mod db;
pub mod logging;
pub mod relay;
pub mod routes;
pub mod storage;
pub mod templates;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::ai::{CompletionBackend, OpenAiCompletions};
use crate::relay::Relay;
use crate::storage::{MemStorage, PgStorage, PlaygroundStore, PortfolioStore};

/// Request bodies above this are rejected outright; the media route applies
/// its own 10 MB per-file cap under it.
const BODY_LIMIT_BYTES: usize = 12 * 1024 * 1024;

/// Everything the handlers need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub playground: Arc<dyn PlaygroundStore>,
    pub portfolio: Arc<dyn PortfolioStore>,
    pub completions: Arc<dyn CompletionBackend>,
    pub relay: Relay,
    pub upload_dir: PathBuf,
    pub demo_user_id: i32,
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
/// Falls back to the local dev origins.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                "http://localhost:3000".parse().unwrap(),
                "http://127.0.0.1:3000".parse().unwrap(),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();

    Router::new()
        // Playground
        .route("/api/user", get(routes::user::get_user))
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/api/projects/{id}/run", post(routes::projects::run_project))
        .route(
            "/api/projects/{id}/files",
            get(routes::files::list_files).post(routes::files::create_file),
        )
        .route(
            "/api/files/{id}",
            get(routes::files::get_file)
                .patch(routes::files::update_file)
                .delete(routes::files::delete_file),
        )
        .route(
            "/api/projects/{id}/chat",
            get(routes::chat::list_messages).post(routes::chat::post_message),
        )
        // Portfolio builder
        .route(
            "/api/portfolios",
            get(routes::portfolios::list_portfolios).post(routes::portfolios::create_portfolio),
        )
        .route(
            "/api/portfolios/{id}",
            get(routes::portfolios::get_portfolio)
                .put(routes::portfolios::update_portfolio)
                .delete(routes::portfolios::delete_portfolio),
        )
        .route(
            "/api/portfolios/{id}/pages",
            get(routes::pages::list_pages).post(routes::pages::create_page),
        )
        .route(
            "/api/pages/{id}/sections",
            get(routes::sections::list_sections).post(routes::sections::create_section),
        )
        .route(
            "/api/pages/{id}/sections/reorder",
            post(routes::sections::reorder_sections),
        )
        .route(
            "/api/sections/{id}",
            axum::routing::put(routes::sections::update_section)
                .delete(routes::sections::delete_section),
        )
        .route(
            "/api/media",
            get(routes::media::list_media).post(routes::media::upload_media),
        )
        .route("/api/media/{id}", axum::routing::delete(routes::media::delete_media))
        .route(
            "/api/public/portfolios/domain/{domain}",
            get(routes::public::get_portfolio_by_domain),
        )
        // Realtime + health
        .route("/ws", get(routes::ws::ws_handler))
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        // Uploaded files are served statically, no content addressing.
        .nest_service("/uploads", ServeDir::new(&state.upload_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::inject_demo_identity,
        ))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn select_storage() -> (Arc<dyn PlaygroundStore>, Arc<dyn PortfolioStore>) {
    if std::env::var("DATABASE_URL").is_ok() {
        match db::init_pool(None).await {
            // Serving against a half-created schema is worse than no database
            // at all, so a migration failure drops the Pg path entirely.
            Ok(pool) => match db::run_migrations(&pool).await {
                Ok(()) => {
                    if let Err(e) = db::seed_demo_users(&pool).await {
                        tracing::error!("Failed to seed demo users: {}", e);
                    }
                    let storage = Arc::new(PgStorage::new(pool));
                    return (storage.clone(), storage);
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to run database migrations: {}. Falling back to in-memory storage.",
                        e
                    );
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Falling back to in-memory storage.",
                    e
                );
            }
        }
    } else {
        tracing::info!("DATABASE_URL not set. Using in-memory storage.");
    }

    let storage = Arc::new(MemStorage::new());
    (storage.clone(), storage)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    let (playground, portfolio) = select_storage().await;

    let upload_dir =
        PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
    if let Err(e) = tokio::fs::create_dir_all(&upload_dir).await {
        tracing::warn!("Failed to create upload directory: {}", e);
    }

    let demo_user_id = std::env::var("DEMO_USER_ID")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    let state = AppState {
        playground,
        portfolio,
        completions: Arc::new(OpenAiCompletions::from_env()),
        relay: Relay::new(),
        upload_dir,
        demo_user_id,
    };

    let app = create_app(state);

    // Bind address is configurable via HOST / PORT env vars.
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
