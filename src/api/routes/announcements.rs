use crate::{
    api::{
        AppState,
        extract::AuthUser,
        response::{ApiJson, ApiPath, ApiResult, success},
    },
    core::{
        announcement::{self, AnnouncementUpdate, NewAnnouncement, Priority},
        policy,
    },
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Routes under `/api/announcements`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", put(update).delete(remove))
        .route("/:id/visibility", patch(set_visibility))
}

fn require_manager(auth: &AuthUser) -> crate::errors::Result<()> {
    policy::require(
        policy::can_manage_announcements(&auth.actor),
        "manage announcements",
    )
}

const fn default_visible() -> bool {
    true
}

async fn list(State(state): State<AppState>, auth: AuthUser) -> ApiResult {
    let announcements = announcement::list_announcements(&state.db, &auth.actor).await?;
    Ok(success(json!({ "announcements": announcements })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    title: String,
    content: String,
    priority: Option<String>,
    #[serde(default = "default_visible")]
    is_visible: bool,
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_manager(&auth)?;
    let priority = match req.priority.as_deref() {
        Some(raw) if !raw.is_empty() => raw.parse()?,
        _ => Priority::default(),
    };
    let created = announcement::create_announcement(
        &state.db,
        auth.actor.id,
        NewAnnouncement {
            title: req.title,
            content: req.content,
            priority,
            is_visible: req.is_visible,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        success(json!({ "announcement": created })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest {
    title: Option<String>,
    content: Option<String>,
    priority: Option<String>,
    is_visible: Option<bool>,
}

async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateRequest>,
) -> ApiResult {
    require_manager(&auth)?;
    let priority = req
        .priority
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(str::parse::<Priority>)
        .transpose()?;
    let updated = announcement::update_announcement(
        &state.db,
        id,
        AnnouncementUpdate {
            title: req.title,
            content: req.content,
            priority,
            is_visible: req.is_visible,
        },
    )
    .await?;
    Ok(success(json!({ "announcement": updated })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisibilityRequest {
    is_visible: bool,
}

async fn set_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<VisibilityRequest>,
) -> ApiResult {
    require_manager(&auth)?;
    let updated = announcement::set_visibility(&state.db, id, req.is_visible).await?;
    Ok(success(json!({ "announcement": updated })))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult {
    require_manager(&auth)?;
    announcement::delete_announcement(&state.db, id).await?;
    Ok(success(json!({ "message": "Announcement deleted successfully" })))
}
