use crate::{
    api::{AppState, response::success},
    errors::Error,
};
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::warn;

/// Pings the database.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let uptime = state.started_at.elapsed().as_secs();
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            success(json!({
                "status": "healthy",
                "database": "connected",
                "uptimeSeconds": uptime,
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "status": "unhealthy",
                    "database": "disconnected",
                    "uptimeSeconds": uptime,
                })),
            )
        }
    }
}

/// Describes the API at `/`.
pub async fn index() -> Json<Value> {
    success(json!({
        "message": "Family Fund API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "auth": "/api/auth",
            "contributions": "/api/contributions",
            "investments": "/api/investments",
            "dashboard": "/api/dashboard",
            "settings": "/api/settings",
            "announcements": "/api/announcements",
            "admin": "/api/admin",
        },
    }))
}

/// Fallback for unknown paths.
pub async fn not_found() -> Error {
    Error::NotFound {
        entity: "Route",
        id: "requested path".to_string(),
    }
}
