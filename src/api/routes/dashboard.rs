use crate::{
    api::{
        AppState,
        extract::AuthUser,
        response::{ApiResult, success},
    },
    core::dashboard::{self, DashboardContext},
};
use axum::{Router, extract::State, routing::get};
use chrono::Utc;

/// Routes under `/api/dashboard`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(show))
}

async fn show(State(state): State<AppState>, auth: AuthUser) -> ApiResult {
    let ctx = DashboardContext {
        now: Utc::now(),
        currency: &state.config.ledger.currency,
        uptime: state.started_at.elapsed(),
    };
    let data = dashboard::build_dashboard(&state.db, &auth.actor, ctx).await?;
    Ok(success(serde_json::to_value(data)?))
}
