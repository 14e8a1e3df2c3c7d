use crate::{
    api::{
        AppState,
        extract::AuthUser,
        response::{ApiJson, ApiResult, success},
    },
    core::user::{self, ProfileUpdate, UserProfile},
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Routes under `/api/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile).put(update_profile))
        .route("/change-password", post(change_password).put(change_password))
        .route("/verify", get(verify))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let created = user::register_member(
        &state.db,
        req.first_name,
        req.last_name,
        req.email,
        req.password,
        req.phone,
    )
    .await?;
    let token = state.keys.issue(&created)?;

    Ok((
        StatusCode::CREATED,
        success(json!({ "token": token, "user": UserProfile::from(&created) })),
    ))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> ApiResult {
    let signed_in = user::authenticate(&state.db, &req.email, &req.password).await?;
    let token = state.keys.issue(&signed_in)?;
    Ok(success(
        json!({ "token": token, "user": UserProfile::from(&signed_in) }),
    ))
}

async fn profile(auth: AuthUser) -> ApiResult {
    Ok(success(json!({ "user": UserProfile::from(&auth.user) })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
}

async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> ApiResult {
    let updated = user::update_profile(
        &state.db,
        auth.actor.id,
        ProfileUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
        },
    )
    .await?;
    Ok(success(json!({
        "message": "Profile updated successfully",
        "user": UserProfile::from(&updated),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult {
    user::change_password(
        &state.db,
        auth.actor.id,
        &req.current_password,
        &req.new_password,
    )
    .await?;
    Ok(success(json!({ "message": "Password changed successfully" })))
}

async fn verify(auth: AuthUser) -> ApiResult {
    Ok(success(json!({
        "valid": true,
        "user": UserProfile::from(&auth.user),
    })))
}
