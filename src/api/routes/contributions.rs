use crate::{
    api::{
        AppState,
        extract::AuthUser,
        response::{ApiJson, ApiPath, ApiQuery, ApiResult, success},
    },
    core::{
        contribution::{self, ContributionStatus, NewContribution},
        policy,
    },
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Routes under `/api/contributions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/my", get(list_mine))
        .route("/:id/status", patch(update_status))
        .route("/:id", delete(remove))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    amount: f64,
    payment_method: String,
    transaction_id: Option<String>,
    notes: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let created = contribution::create_contribution(
        &state.db,
        auth.actor.id,
        NewContribution {
            amount: req.amount,
            payment_method: req.payment_method,
            transaction_id: req.transaction_id,
            notes: req.notes,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        success(json!({
            "message": "Contribution submitted successfully",
            "contribution": created,
        })),
    ))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

fn parse_status_filter(query: &ListQuery) -> crate::errors::Result<Option<ContributionStatus>> {
    query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .transpose()
}

/// Admins see every contribution, everyone else only their own.
async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult {
    let owner =
        (!policy::can_list_all_contributions(&auth.actor)).then_some(auth.actor.id);
    let contributions =
        contribution::list_contributions(&state.db, owner, parse_status_filter(&query)?).await?;
    Ok(success(json!({
        "count": contributions.len(),
        "contributions": contributions,
    })))
}

async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult {
    let contributions = contribution::list_contributions(
        &state.db,
        Some(auth.actor.id),
        parse_status_filter(&query)?,
    )
    .await?;
    Ok(success(json!({
        "count": contributions.len(),
        "contributions": contributions,
    })))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: String,
}

async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult {
    policy::require(
        policy::can_review_contributions(&auth.actor),
        "review contributions",
    )?;
    let updated = contribution::update_contribution_status(&state.db, id, &req.status).await?;
    Ok(success(json!({
        "message": format!("Contribution {}", updated.status),
        "contribution": updated,
    })))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult {
    contribution::delete_contribution(&state.db, &auth.actor, id).await?;
    Ok(success(json!({ "message": "Contribution deleted successfully" })))
}
