//! Attendance API Handlers
//!
//! Days are UTC calendar days; lateness compares the check-in time with
//! `WORK_START_HOUR`.

use axum::{
    Json,
    extract::{Query, State},
};
use shared::error::ErrorCode;
use shared::models::{Attendance, AttendanceMark, AttendanceQuery, AttendanceStatus};

use crate::auth::CurrentUser;
use crate::auth::permissions::require_employee_id;
use crate::core::ServerState;
use crate::db::repository::{activity, attendance, employee};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::{AppError, AppResult};

/// The caller's employee id, which must exist
async fn own_employee_id(state: &ServerState, current: &CurrentUser) -> AppResult<String> {
    let employee_id = require_employee_id(current)?;
    if !employee::exists(state.pool(), employee_id).await? {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {employee_id} not found"),
        ));
    }
    Ok(employee_id.to_string())
}

fn notes_of(payload: &Option<Json<AttendanceMark>>) -> AppResult<Option<String>> {
    let notes = payload.as_ref().and_then(|Json(p)| p.notes.clone());
    validate_optional_text(&notes, "notes", MAX_NOTE_LEN)?;
    Ok(notes)
}

/// Attendance records
///
/// Managers see all (filters `employee_id`, `from`, `to`); employees only
/// their own.
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(mut query): Query<AttendanceQuery>,
) -> AppResult<Json<Vec<Attendance>>> {
    if !current.is_manager() {
        query.employee_id = Some(require_employee_id(&current)?.to_string());
    }
    let records = attendance::find_all(state.pool(), &query).await?;
    Ok(Json(records))
}

/// The caller's record for today, if any
pub async fn today(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Option<Attendance>>> {
    let employee_id = require_employee_id(&current)?;
    let record = attendance::find_for_day(state.pool(), employee_id, shared::util::today()).await?;
    Ok(Json(record))
}

/// Open today's record; 409 when already checked in
pub async fn check_in(
    State(state): State<ServerState>,
    current: CurrentUser,
    payload: Option<Json<AttendanceMark>>,
) -> AppResult<Json<Attendance>> {
    let notes = notes_of(&payload)?;
    let employee_id = own_employee_id(&state, &current).await?;

    let record = attendance::check_in(
        state.pool(),
        &employee_id,
        shared::util::today(),
        shared::util::now_millis(),
        state.config.work_start_hour,
        notes.as_deref(),
    )
    .await?;

    activity::record(
        state.pool(),
        &current.username,
        "attendance.check_in",
        if record.status == AttendanceStatus::Late {
            format!("{employee_id} checked in late")
        } else {
            format!("{employee_id} checked in")
        },
        Some(&employee_id),
        None,
    )
    .await;

    Ok(Json(record))
}

/// Close today's record; 400 without a check-in
pub async fn check_out(
    State(state): State<ServerState>,
    current: CurrentUser,
    payload: Option<Json<AttendanceMark>>,
) -> AppResult<Json<Attendance>> {
    let notes = notes_of(&payload)?;
    let employee_id = own_employee_id(&state, &current).await?;

    let record = attendance::check_out(
        state.pool(),
        &employee_id,
        shared::util::today(),
        shared::util::now_millis(),
        notes.as_deref(),
    )
    .await?;

    activity::record(
        state.pool(),
        &current.username,
        "attendance.check_out",
        format!("{employee_id} checked out"),
        Some(&employee_id),
        None,
    )
    .await;

    Ok(Json(record))
}
