//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::error::{ApiResponse, ErrorCode};
use shared::models::{Notification, NotificationCreate, NotificationQuery};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{activity, notification, user};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text};
use crate::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// Notifications addressed to the caller or the caller's role
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications =
        notification::find_for_user(state.pool(), current.id, current.role, query.unread_only)
            .await?;
    Ok(Json(notifications))
}

/// Send a notification to one user or a whole role (managers)
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<NotificationCreate>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.message, "message", MAX_NOTE_LEN)?;
    if let Some(user_id) = payload.recipient_user_id
        && user::find_by_id(state.pool(), user_id).await?.is_none()
    {
        return Err(AppError::with_message(
            ErrorCode::UserNotFound,
            format!("User {user_id} not found"),
        ));
    }

    let created = notification::create(state.pool(), payload).await?;

    activity::record(
        state.pool(),
        &current.username,
        "notification.sent",
        format!("Sent notification \"{}\"", created.title),
        Some(&created.id.to_string()),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn mark_read(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    notification::mark_read(state.pool(), id, current.id, current.role).await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn mark_all_read(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let updated = notification::mark_all_read(state.pool(), current.id, current.role).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
