//! Activity API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::ApiResponse;
use shared::models::{Activity, ActivityCreate, ActivityQuery};

use crate::AppResult;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::activity::{self, NewActivity, Viewer};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};

fn viewer(current: &CurrentUser) -> Viewer<'_> {
    Viewer {
        username: &current.username,
        role: current.role,
    }
}

/// Activity feed, newest first (`limit` default 50, max 200)
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<Activity>>> {
    let activities = activity::find_visible(state.pool(), viewer(&current), query.limit).await?;
    Ok(Json(activities))
}

/// Log a client-side action on behalf of the caller
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ActivityCreate>,
) -> AppResult<(StatusCode, Json<Activity>)> {
    validate_required_text(&payload.action, "action", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.message, "message", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.target_id, "target_id", MAX_NAME_LEN)?;

    let created = activity::create(
        state.pool(),
        NewActivity {
            actor: current.username.clone(),
            action: payload.action.trim().to_string(),
            category: payload.category,
            message: payload.message,
            target_id: payload.target_id,
            recipient_role: payload.recipient_role,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn mark_read(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    activity::mark_read(state.pool(), id, viewer(&current)).await?;
    Ok(Json(ApiResponse::ok()))
}
