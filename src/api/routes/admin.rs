//! User management for administrators.

use crate::{
    api::{
        AppState,
        extract::AuthUser,
        response::{ApiJson, ApiPath, ApiResult, success},
    },
    core::{
        policy,
        user::{self, NewUser, Role, UserProfile, UserStatus, UserUpdate},
    },
    errors::Result,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Routes under `/api/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(show_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/role", patch(set_role))
}

fn require_admin(auth: &AuthUser) -> Result<()> {
    policy::require(policy::can_manage_users(&auth.actor), "manage users")
}

async fn list_users(State(state): State<AppState>, auth: AuthUser) -> ApiResult {
    require_admin(&auth)?;
    let users: Vec<UserProfile> = user::list_users(&state.db)
        .await?
        .iter()
        .map(UserProfile::from)
        .collect();
    Ok(success(json!({ "count": users.len(), "users": users })))
}

async fn show_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult {
    require_admin(&auth)?;
    let found = user::require_user(&state.db, id).await?;
    Ok(success(json!({ "user": UserProfile::from(&found) })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: Option<String>,
    role: Option<String>,
    status: Option<String>,
}

async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_admin(&auth)?;
    let role = req.role.as_deref().map(str::parse::<Role>).transpose()?;
    let status = req.status.as_deref().map(str::parse::<UserStatus>).transpose()?;
    let created = user::create_user(
        &state.db,
        NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            role: role.unwrap_or(Role::Member),
            status: status.unwrap_or(UserStatus::Active),
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        success(json!({ "user": UserProfile::from(&created) })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    status: Option<String>,
    phone: Option<String>,
}

async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult {
    require_admin(&auth)?;
    let update = UserUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        role: req.role.as_deref().map(str::parse).transpose()?,
        status: req.status.as_deref().map(str::parse).transpose()?,
        phone: req.phone.map(Some),
    };
    let updated = user::update_user(&state.db, id, update).await?;
    Ok(success(json!({ "user": UserProfile::from(&updated) })))
}

#[derive(Debug, Deserialize)]
struct RoleRequest {
    role: String,
}

async fn set_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<RoleRequest>,
) -> ApiResult {
    require_admin(&auth)?;
    let updated = user::set_role(&state.db, id, req.role.parse()?).await?;
    Ok(success(json!({ "user": UserProfile::from(&updated) })))
}

async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult {
    require_admin(&auth)?;
    user::delete_user(&state.db, auth.actor.id, id).await?;
    Ok(success(json!({ "message": "User deleted successfully" })))
}
