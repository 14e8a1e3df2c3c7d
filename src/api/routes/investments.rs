use crate::{
    api::{
        AppState,
        extract::AuthUser,
        response::{ApiJson, ApiPath, ApiResult, success},
    },
    core::{
        investment::{self, InvestmentStatus, InvestmentType, InvestmentUpdate, NewInvestment, RiskLevel},
        policy, valuation,
    },
    errors::Result,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Routes under `/api/investments`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/:id", get(show).put(update))
        .route("/:id/currentValue", put(update_current_value))
        .route(
            "/:id/current-value",
            put(update_current_value).patch(update_current_value),
        )
}

async fn list(State(state): State<AppState>, _auth: AuthUser) -> ApiResult {
    let investments = investment::list_investments(&state.db).await?;
    Ok(success(json!({ "investments": investments })))
}

async fn stats(State(state): State<AppState>, _auth: AuthUser) -> ApiResult {
    let stats = valuation::portfolio_stats(&state.db).await?;
    Ok(success(json!({ "stats": stats })))
}

async fn show(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult {
    let found = investment::get_investment_with_creator(&state.db, id).await?;
    Ok(success(json!({ "investment": found })))
}

fn parse_optional<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = crate::errors::Error>,
{
    raw.filter(|s| !s.is_empty()).map(str::parse).transpose()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    name: String,
    #[serde(rename = "type")]
    investment_type: String,
    category: String,
    amount_invested: f64,
    expected_return_rate: Option<f64>,
    risk_level: Option<String>,
    status: Option<String>,
    description: Option<String>,
}

/// Capacity check and insert run under the process-wide capacity lock.
async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    policy::require(
        policy::can_manage_investments(&auth.actor),
        "create investments",
    )?;

    let new_investment = NewInvestment {
        name: req.name,
        investment_type: req.investment_type.parse()?,
        category: req.category,
        amount_invested: req.amount_invested,
        expected_return_rate: req.expected_return_rate.unwrap_or(0.0),
        risk_level: parse_optional::<RiskLevel>(req.risk_level.as_deref())?.unwrap_or_default(),
        status: parse_optional::<InvestmentStatus>(req.status.as_deref())?.unwrap_or_default(),
        description: req.description,
    };

    let created = {
        let _guard = state.capacity_lock.lock().await;
        debug!("Acquired capacity lock for user_id {}", auth.actor.id);
        investment::create_investment(&state.db, auth.actor.id, new_investment).await?
    };

    Ok((
        StatusCode::CREATED,
        success(json!({ "investment": created })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest {
    name: Option<String>,
    #[serde(rename = "type")]
    investment_type: Option<String>,
    category: Option<String>,
    expected_return_rate: Option<f64>,
    risk_level: Option<String>,
    status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    description: Option<Option<String>>,
}

/// Distinguishes an explicit `null` (clear) from an absent field (keep).
fn deserialize_some<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Descriptive fields only; valuation goes through the current-value route.
async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateRequest>,
) -> ApiResult {
    policy::require(
        policy::can_manage_investments(&auth.actor),
        "update investments",
    )?;

    let update = InvestmentUpdate {
        name: req.name,
        investment_type: parse_optional::<InvestmentType>(req.investment_type.as_deref())?,
        category: req.category,
        expected_return_rate: req.expected_return_rate,
        risk_level: parse_optional::<RiskLevel>(req.risk_level.as_deref())?,
        status: parse_optional::<InvestmentStatus>(req.status.as_deref())?,
        description: req.description,
    };
    let updated = investment::update_investment(&state.db, id, update).await?;
    Ok(success(json!({ "investment": updated })))
}

async fn update_current_value(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult {
    policy::require(
        policy::can_manage_investments(&auth.actor),
        "revalue investments",
    )?;

    let new_value = valuation::parse_value(body.get("currentValue"))?;
    let updated = valuation::update_current_value(&state.db, id, new_value).await?;
    Ok(success(json!({ "investment": updated })))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::{errors::Result, test_utils::*};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn investment_body(amount: f64) -> serde_json::Value {
        json!({
            "name": "Kigali plot",
            "type": "real_estate",
            "category": "Land",
            "amountInvested": amount,
            "expectedReturnRate": 12,
        })
    }

    #[tokio::test]
    async fn test_create_respects_capacity() -> Result<()> {
        let state = test_state(setup_test_db().await?);
        let admin = create_test_admin(&state.db, "admin@example.com").await?;
        create_completed_contribution(&state.db, admin.id, 1_000_000.0).await?;
        insert_test_investment(&state.db, admin.id, 800_000.0, "active").await?;
        let auth = bearer_for(&state, &admin)?;

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/investments",
            Some(&auth),
            Some(investment_body(40_000.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["requested"], 40_000.0);
        assert_eq!(body["remaining"], 30_000.0);
        assert_eq!(body["capPercentage"], 83.0);

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/investments",
            Some(&auth),
            Some(investment_body(25_000.0)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["investment"]["currentValue"], 25_000.0);
        assert_eq!(body["investment"]["roi"], 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_members_cannot_create() -> Result<()> {
        let state = test_state(setup_test_db().await?);
        let member = create_test_member(&state.db, "member@example.com").await?;

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/investments",
            Some(&bearer_for(&state, &member)?),
            Some(investment_body(10.0)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_current_value_updates_roi() -> Result<()> {
        let state = test_state(setup_test_db().await?);
        let admin = create_test_admin(&state.db, "admin@example.com").await?;
        let row = insert_test_investment(&state.db, admin.id, 100_000.0, "active").await?;
        let auth = bearer_for(&state, &admin)?;

        let (status, body) = call(
            &state,
            Method::PUT,
            &format!("/api/investments/{}/currentValue", row.id),
            Some(&auth),
            Some(json!({ "currentValue": 115_000 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["investment"]["roi"], 15.0);

        let (status, body) = call(
            &state,
            Method::PATCH,
            &format!("/api/investments/{}/current-value", row.id),
            Some(&auth),
            Some(json!({ "currentValue": "90000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["investment"]["roi"], -10.0);

        let (status, _) = call(
            &state,
            Method::PUT,
            &format!("/api/investments/{}/currentValue", row.id),
            Some(&auth),
            Some(json!({ "currentValue": -5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_show_update_and_stats() -> Result<()> {
        let state = test_state(setup_test_db().await?);
        let admin = create_test_admin(&state.db, "admin@example.com").await?;
        let row = insert_test_investment(&state.db, admin.id, 1_000.0, "active").await?;
        let auth = bearer_for(&state, &admin)?;

        let (status, body) = call(
            &state,
            Method::GET,
            &format!("/api/investments/{}", row.id),
            Some(&auth),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["investment"]["creator"]["email"], "admin@example.com");

        let (status, body) = call(
            &state,
            Method::PUT,
            &format!("/api/investments/{}", row.id),
            Some(&auth),
            Some(json!({ "name": "Renamed", "riskLevel": "high", "description": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["investment"]["name"], "Renamed");
        assert_eq!(body["investment"]["riskLevel"], "high");

        let (status, _) = call(&state, Method::GET, "/api/investments/999", Some(&auth), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&state, Method::GET, "/api/investments/stats", Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["activeInvestments"], 1);
        assert_eq!(body["stats"]["totalInvested"], 1_000.0);
        Ok(())
    }
    #[tokio::test]
    async fn test_expected_return_rate_may_be_null_or_absent() -> Result<()> {
        let state = test_state(setup_test_db().await?);
        let admin = create_test_admin(&state.db, "admin@example.com").await?;
        create_completed_contribution(&state.db, admin.id, 100_000.0).await?;
        let auth = bearer_for(&state, &admin)?;

        let mut body = investment_body(1_000.0);
        body["expectedReturnRate"] = serde_json::Value::Null;
        let (status, created) = call(&state, Method::POST, "/api/investments", Some(&auth), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        assert_eq!(created["investment"]["expectedReturnRate"], 0.0);

        let mut body = investment_body(1_000.0);
        body.as_object_mut().unwrap().remove("expectedReturnRate");
        let (status, _) = call(&state, Method::POST, "/api/investments", Some(&auth), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() -> Result<()> {
        let state = test_state(setup_test_db().await?);
        let admin = create_test_admin(&state.db, "admin@example.com").await?;
        let auth = bearer_for(&state, &admin)?;

        let (status, body) = call(&state, Method::GET, "/api/investments/abc", Some(&auth), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        let (status, body) = call(
            &state,
            Method::PUT,
            "/api/investments/abc/currentValue",
            Some(&auth),
            Some(json!({ "currentValue": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        Ok(())
    }
}
