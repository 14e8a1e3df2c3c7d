use crate::{
    api::{
        AppState,
        extract::AuthUser,
        response::{ApiJson, ApiPath, ApiResult, success},
    },
    core::{
        policy,
        settings::{self, MeetingSettings, MeetingUpdate},
        user::{self, NotificationPreferences},
    },
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Routes under `/api/settings`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/meeting", get(meeting))
        .route("/next-meeting", patch(update_next_meeting))
        .route("/notifications", get(notifications).put(update_notifications))
        .route("/:key", get(show).put(update).delete(remove))
}

fn require_manager(auth: &AuthUser) -> crate::errors::Result<()> {
    policy::require(policy::can_manage_settings(&auth.actor), "manage settings")
}

async fn list(State(state): State<AppState>, auth: AuthUser) -> ApiResult {
    require_manager(&auth)?;
    let rows = settings::list_settings(&state.db).await?;
    Ok(success(json!({ "settings": settings::settings_by_key(rows) })))
}

async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(key): ApiPath<String>,
) -> ApiResult {
    require_manager(&auth)?;
    let found = settings::get_setting(&state.db, &key)
        .await?
        .ok_or_else(|| crate::errors::Error::NotFound {
            entity: "Setting",
            id: key.clone(),
        })?;
    Ok(success(json!({ "setting": found })))
}

#[derive(Debug, Deserialize)]
struct CreateRequest {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
    description: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_manager(&auth)?;
    let created =
        settings::create_setting(&state.db, &req.key, &req.value, req.description).await?;
    Ok((StatusCode::CREATED, success(json!({ "setting": created }))))
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    value: String,
    description: Option<String>,
}

async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(key): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateRequest>,
) -> ApiResult {
    require_manager(&auth)?;
    let updated = settings::update_setting(&state.db, &key, &req.value, req.description).await?;
    Ok(success(json!({ "setting": updated })))
}

async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(key): ApiPath<String>,
) -> ApiResult {
    require_manager(&auth)?;
    settings::delete_setting(&state.db, &key).await?;
    Ok(success(json!({ "message": "Setting deleted successfully" })))
}

/// Raw meeting fields plus the parsed meeting, for any member.
async fn meeting(State(state): State<AppState>, _auth: AuthUser) -> ApiResult {
    let fields = MeetingSettings::load(&state.db).await?;
    let next = fields.next_meeting();
    Ok(success(json!({ "meeting": fields, "nextMeeting": next })))
}

#[derive(Debug, Default, Deserialize)]
struct MeetingRequest {
    title: Option<String>,
    date: Option<String>,
    time: Option<String>,
    location: Option<String>,
    agenda: Option<String>,
}

async fn update_next_meeting(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<MeetingRequest>,
) -> ApiResult {
    require_manager(&auth)?;
    let fields = settings::update_meeting(
        &state.db,
        MeetingUpdate {
            title: req.title,
            date: req.date,
            time: req.time,
            location: req.location,
            agenda: req.agenda,
        },
    )
    .await?;
    let next = fields.next_meeting();
    Ok(success(json!({
        "message": "Meeting details updated successfully",
        "meeting": fields,
        "nextMeeting": next,
    })))
}

async fn notifications(State(state): State<AppState>, auth: AuthUser) -> ApiResult {
    let prefs = user::get_notification_preferences(&state.db, auth.actor.id).await?;
    Ok(success(json!({ "preferences": prefs })))
}

async fn update_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(prefs): ApiJson<NotificationPreferences>,
) -> ApiResult {
    let saved = user::set_notification_preferences(&state.db, auth.actor.id, &prefs).await?;
    Ok(success(json!({ "preferences": saved })))
}
