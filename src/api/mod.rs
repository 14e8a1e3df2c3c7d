//! HTTP interface - router, shared state, authentication and error mapping.
//!
//! Handlers are thin: they authenticate, consult `core::policy`, call into `core`
//! and wrap the result in a `{"success": true, ...}` envelope. Errors become
//! `{"success": false, "error": ...}` responses in [`response`].

/// Bearer-token authentication extractor
pub mod extract;
/// Error-to-response mapping and JSON helpers
pub mod response;
/// Route handlers grouped by resource
pub mod routes;

use crate::{config::AppConfig, core::auth::TokenKeys};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Instant};
use tokio::sync::Mutex;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// Loaded application configuration
    pub config: Arc<AppConfig>,
    /// Token signing and verification keys
    pub keys: TokenKeys,
    /// Held while an investment is checked against capacity and inserted
    pub capacity_lock: Arc<Mutex<()>>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Bundles the shared state.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig, keys: TokenKeys) -> Self {
        Self {
            db,
            config: Arc::new(config),
            keys,
            capacity_lock: Arc::new(Mutex::new(())),
            started_at: Instant::now(),
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        origins.push(HeaderValue::from_static(DEFAULT_FRONTEND_ORIGIN));
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health::health))
        .nest("/auth", routes::auth::router())
        .nest("/contributions", routes::contributions::router())
        .nest("/investments", routes::investments::router())
        .nest("/dashboard", routes::dashboard::router())
        .nest("/settings", routes::settings::router())
        .nest("/announcements", routes::announcements::router())
        .nest("/admin", routes::admin::router());

    Router::new()
        .route("/", get(routes::health::index))
        .nest("/api", api)
        .fallback(routes::health::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors.allowed_origins))
        .with_state(state)
}
