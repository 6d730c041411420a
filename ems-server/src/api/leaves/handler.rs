//! Leave Request API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{ApiResponse, ErrorCode};
use shared::models::{
    LeaveCreate, LeaveQuery, LeaveRequest, LeaveStatus, LeaveStatusUpdate, NotificationCategory,
    UserRole,
};

use crate::auth::CurrentUser;
use crate::auth::permissions::{ensure_can_access_employee, require_employee_id};
use crate::core::ServerState;
use crate::db::repository::leave::{self, NewLeave};
use crate::db::repository::{activity, employee, notification};
use crate::security_log;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::{AppError, AppResult};

/// List leave requests
///
/// Managers see all (optionally filtered); employees only their own.
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(mut query): Query<LeaveQuery>,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    if !current.is_manager() {
        query.employee_id = Some(require_employee_id(&current)?.to_string());
    }
    let leaves = leave::find_all(state.pool(), &query).await?;
    Ok(Json(leaves))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LeaveRequest>> {
    let request = leave::get(state.pool(), id).await?;
    ensure_can_access_employee(&current, &request.employee_id)?;
    Ok(Json(request))
}

/// File a leave request
///
/// Employees always file for themselves; managers may name an employee.
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<LeaveCreate>,
) -> AppResult<(StatusCode, Json<LeaveRequest>)> {
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let employee_id = match payload.employee_id.as_deref().filter(|s| !s.is_empty()) {
        Some(id) if current.is_manager() => id.to_string(),
        _ => require_employee_id(&current)?.to_string(),
    };
    if !employee::exists(state.pool(), &employee_id).await? {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {employee_id} not found"),
        ));
    }

    let created = leave::create(
        state.pool(),
        NewLeave {
            employee_id: employee_id.clone(),
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason: payload.reason,
        },
    )
    .await?;

    let message = format!(
        "{employee_id} requested {} day(s) of leave from {} to {}",
        created.days, created.start_date, created.end_date
    );
    // Both reviewing roles hear about it
    for role in [UserRole::Hr, UserRole::Admin] {
        notification::notify_role(
            state.pool(),
            role,
            "New leave request",
            &message,
            NotificationCategory::Leave,
        )
        .await;
    }
    activity::record(
        state.pool(),
        &current.username,
        "leave.created",
        message,
        Some(&created.id.to_string()),
        Some(UserRole::Hr),
    )
    .await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Review (managers, never their own request) or cancel (owner)
pub async fn update_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<LeaveStatusUpdate>,
) -> AppResult<Json<LeaveRequest>> {
    validate_optional_text(&payload.comment, "comment", MAX_NOTE_LEN)?;

    let request = leave::get(state.pool(), id).await?;
    let owner = current.owns(&request.employee_id);
    if owner && payload.status != LeaveStatus::Cancelled {
        security_log!("WARN", "leave_self_review", user_id = current.id, leave_id = id);
        return Err(AppError::forbidden("You cannot review your own leave request"));
    }
    if !current.is_manager() {
        if !owner {
            security_log!("WARN", "permission_denied", user_id = current.id, leave_id = id);
            return Err(AppError::forbidden("You can only change your own leave requests"));
        }
        if payload.status != LeaveStatus::Cancelled {
            return Err(AppError::new(ErrorCode::ManagerRequired));
        }
    }

    let updated = leave::update_status(
        state.pool(),
        id,
        payload.status,
        &current.username,
        payload.comment.as_deref(),
    )
    .await?;

    let message = format!(
        "Leave request #{id} ({} to {}) is now {}",
        updated.start_date,
        updated.end_date,
        updated.status.as_str()
    );
    if !owner {
        notification::notify_employee(
            state.pool(),
            &updated.employee_id,
            "Leave request updated",
            &message,
            NotificationCategory::Leave,
        )
        .await;
    }
    activity::record(
        state.pool(),
        &current.username,
        &format!("leave.{}", updated.status.as_str()),
        message,
        Some(&id.to_string()),
        None,
    )
    .await;

    Ok(Json(updated))
}

/// Owner while pending, or any manager
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let request = leave::get(state.pool(), id).await?;
    let owner_pending = current.owns(&request.employee_id) && request.status == LeaveStatus::Pending;
    if !current.is_manager() && !owner_pending {
        security_log!("WARN", "permission_denied", user_id = current.id, leave_id = id);
        return Err(AppError::forbidden("Only pending requests of your own can be deleted"));
    }

    leave::delete(state.pool(), id).await?;

    activity::record(
        state.pool(),
        &current.username,
        "leave.deleted",
        format!("Deleted leave request #{id} of {}", request.employee_id),
        Some(&id.to_string()),
        None,
    )
    .await;

    Ok(Json(ApiResponse::ok()))
}
