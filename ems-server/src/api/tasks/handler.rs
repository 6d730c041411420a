//! Task API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{ApiResponse, ErrorCode};
use shared::models::{
    NotificationCategory, Task, TaskCreate, TaskQuery, TaskStatus, TaskStatusUpdate, TaskUpdate,
    UserRole,
};

use crate::auth::CurrentUser;
use crate::auth::permissions::{ensure_manager, require_employee_id};
use crate::core::ServerState;
use crate::db::repository::{activity, employee, notification, task};
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::{AppError, AppResult};

async fn ensure_employee_exists(state: &ServerState, employee_id: &str) -> AppResult<()> {
    if employee::exists(state.pool(), employee_id).await? {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {employee_id} not found"),
        ))
    }
}

fn ensure_can_see(current: &CurrentUser, task: &Task) -> AppResult<()> {
    if current.is_manager() || current.owns(&task.assigned_to) {
        return Ok(());
    }
    security_log!("WARN", "permission_denied", user_id = current.id, task_id = task.id);
    Err(AppError::forbidden("You can only access tasks assigned to you"))
}

/// List tasks
///
/// Managers see all (filters `status`, `assigned_to`, `priority`);
/// employees only tasks assigned to them.
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(mut query): Query<TaskQuery>,
) -> AppResult<Json<Vec<Task>>> {
    if !current.is_manager() {
        query.assigned_to = Some(require_employee_id(&current)?.to_string());
    }
    let tasks = task::find_all(state.pool(), &query).await?;
    Ok(Json(tasks))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Task>> {
    let found = task::get(state.pool(), id).await?;
    ensure_can_see(&current, &found)?;
    Ok(Json(found))
}

/// Assign a new task (managers)
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<TaskCreate>,
) -> AppResult<(StatusCode, Json<Task>)> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.assigned_to, "assigned_to", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    ensure_employee_exists(&state, &payload.assigned_to).await?;

    // System accounts have no employee row to reference
    let assigned_by = match current.employee_id.as_deref() {
        Some(id) if employee::exists(state.pool(), id).await? => Some(id),
        _ => None,
    };

    let created = task::create(state.pool(), payload, assigned_by).await?;

    let message = format!("New task assigned: {}", created.title);
    notification::notify_employee(
        state.pool(),
        &created.assigned_to,
        "New task",
        &message,
        NotificationCategory::Task,
    )
    .await;
    activity::record(
        state.pool(),
        &current.username,
        "task.created",
        format!("Assigned task \"{}\" to {}", created.title, created.assigned_to),
        Some(&created.id.to_string()),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit task details (managers)
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TaskUpdate>,
) -> AppResult<Json<Task>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(assignee) = &payload.assigned_to {
        ensure_employee_exists(&state, assignee).await?;
    }

    let previous = task::get(state.pool(), id).await?;
    let updated = task::update(state.pool(), id, payload).await?;

    if updated.assigned_to != previous.assigned_to {
        notification::notify_employee(
            state.pool(),
            &updated.assigned_to,
            "New task",
            &format!("New task assigned: {}", updated.title),
            NotificationCategory::Task,
        )
        .await;
    }
    activity::record(
        state.pool(),
        &current.username,
        "task.updated",
        format!("Updated task \"{}\"", updated.title),
        Some(&id.to_string()),
        None,
    )
    .await;

    Ok(Json(updated))
}

/// Move a task through its lifecycle (assignee or manager)
pub async fn update_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TaskStatusUpdate>,
) -> AppResult<Json<Task>> {
    let found = task::get(state.pool(), id).await?;
    ensure_can_see(&current, &found)?;

    let is_manager = current.is_manager();
    if payload.status == TaskStatus::Cancelled {
        ensure_manager(&current)?;
    }
    if !found.status.can_transition_to(payload.status, is_manager) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!(
                "Cannot change task status from {} to {}",
                found.status.as_str(),
                payload.status.as_str()
            ),
        ));
    }

    let updated = task::update_status(state.pool(), id, found.status, payload.status).await?;

    let message = format!("Task \"{}\" is now {}", updated.title, updated.status.as_str());
    if current.owns(&updated.assigned_to) {
        // Assignee progress goes to the managers' feed
        activity::record(
            state.pool(),
            &current.username,
            "task.status_changed",
            message,
            Some(&id.to_string()),
            Some(UserRole::Hr),
        )
        .await;
    } else {
        notification::notify_employee(
            state.pool(),
            &updated.assigned_to,
            "Task updated",
            &message,
            NotificationCategory::Task,
        )
        .await;
        activity::record(
            state.pool(),
            &current.username,
            "task.status_changed",
            message,
            Some(&id.to_string()),
            None,
        )
        .await;
    }

    Ok(Json(updated))
}

/// Delete a task (managers)
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let found = task::get(state.pool(), id).await?;
    task::delete(state.pool(), id).await?;

    activity::record(
        state.pool(),
        &current.username,
        "task.deleted",
        format!("Deleted task \"{}\"", found.title),
        Some(&id.to_string()),
        None,
    )
    .await;

    Ok(Json(ApiResponse::ok()))
}
