//! Leave Request Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{LeaveQuery, LeaveRequest, LeaveStatus, LeaveType, leave_days};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use chrono::NaiveDate;

const SELECT_LEAVE: &str = "SELECT l.id, l.employee_id, e.name AS employee_name, l.leave_type, l.start_date, l.end_date, l.days, l.reason, l.status, l.reviewed_by, l.review_comment, l.reviewed_at, l.created_at, l.updated_at FROM leave_requests l LEFT JOIN employees e ON e.employee_id = l.employee_id";

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub employee_id: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::LeaveNotFound, format!("Leave request {id} not found"))
}

/// List leave requests, newest first
///
/// `query.employee_id` restricts to one employee; callers scope employees
/// to their own id before calling.
pub async fn find_all(pool: &SqlitePool, query: &LeaveQuery) -> RepoResult<Vec<LeaveRequest>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_LEAVE);
    qb.push(" WHERE 1 = 1");
    if let Some(status) = query.status {
        qb.push(" AND l.status = ").push_bind(status);
    }
    if let Some(employee_id) = query.employee_id.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND l.employee_id = ").push_bind(employee_id.to_string());
    }
    qb.push(" ORDER BY l.created_at DESC, l.id DESC");

    let leaves = qb.build_query_as::<LeaveRequest>().fetch_all(pool).await?;
    Ok(leaves)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<LeaveRequest>> {
    let sql = format!("{SELECT_LEAVE} WHERE l.id = ?");
    let leave = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(leave)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<LeaveRequest> {
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn create(pool: &SqlitePool, data: NewLeave) -> RepoResult<LeaveRequest> {
    if data.start_date > data.end_date {
        return Err(RepoError::Business(
            ErrorCode::LeaveInvalidDateRange,
            "start_date must not be after end_date".into(),
        ));
    }
    let days = leave_days(data.start_date, data.end_date);
    let now = shared::util::now_millis();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO leave_requests (employee_id, leave_type, start_date, end_date, days, reason, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7, ?7) RETURNING id",
    )
    .bind(&data.employee_id)
    .bind(data.leave_type)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(days)
    .bind(&data.reason)
    .bind(now)
    .fetch_one(pool)
    .await?;

    get(pool, id).await
}

/// Move a leave request to `next`
///
/// The current status is re-checked in the UPDATE itself so two concurrent
/// reviews cannot both succeed. Approve/reject record the reviewer.
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    next: LeaveStatus,
    reviewer: &str,
    comment: Option<&str>,
) -> RepoResult<LeaveRequest> {
    let current = get(pool, id).await?;
    if !current.status.can_transition_to(next) {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!(
                "Cannot change leave status from {} to {}",
                current.status.as_str(),
                next.as_str()
            ),
        ));
    }

    let now = shared::util::now_millis();
    let reviewed = matches!(next, LeaveStatus::Approved | LeaveStatus::Rejected);

    let rows = sqlx::query(
        "UPDATE leave_requests SET status = ?1, reviewed_by = CASE WHEN ?2 THEN ?3 ELSE reviewed_by END, review_comment = CASE WHEN ?2 THEN ?4 ELSE review_comment END, reviewed_at = CASE WHEN ?2 THEN ?5 ELSE reviewed_at END, updated_at = ?5 WHERE id = ?6 AND status = ?7",
    )
    .bind(next)
    .bind(reviewed)
    .bind(reviewer)
    .bind(comment)
    .bind(now)
    .bind(id)
    .bind(current.status)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            "Leave request was modified concurrently".into(),
        ));
    }

    get(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
