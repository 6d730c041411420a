//! Attendance Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Attendance, AttendanceQuery, AttendanceStatus};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use chrono::{DateTime, NaiveDate, Timelike};

const SELECT_ATTENDANCE: &str = "SELECT a.id, a.employee_id, e.name AS employee_name, a.date, a.check_in, a.check_out, a.status, a.notes FROM attendance a LEFT JOIN employees e ON e.employee_id = a.employee_id";

/// Present when checked in at or before `HH:00:00` UTC, late afterwards
pub fn status_for_check_in(timestamp_ms: i64, work_start_hour: u32) -> AttendanceStatus {
    let Some(at) = DateTime::from_timestamp_millis(timestamp_ms) else {
        return AttendanceStatus::Present;
    };
    let seconds = at.num_seconds_from_midnight();
    if seconds > work_start_hour * 3600 {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

pub async fn find_all(pool: &SqlitePool, query: &AttendanceQuery) -> RepoResult<Vec<Attendance>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_ATTENDANCE);
    qb.push(" WHERE 1 = 1");
    if let Some(employee_id) = query.employee_id.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND a.employee_id = ").push_bind(employee_id.to_string());
    }
    if let Some(from) = query.from {
        qb.push(" AND a.date >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        qb.push(" AND a.date <= ").push_bind(to);
    }
    qb.push(" ORDER BY a.date DESC, a.employee_id");

    let records = qb.build_query_as::<Attendance>().fetch_all(pool).await?;
    Ok(records)
}

pub async fn find_for_day(
    pool: &SqlitePool,
    employee_id: &str,
    date: NaiveDate,
) -> RepoResult<Option<Attendance>> {
    let sql = format!("{SELECT_ATTENDANCE} WHERE a.employee_id = ? AND a.date = ?");
    let record = sqlx::query_as::<_, Attendance>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

async fn get_for_day(pool: &SqlitePool, employee_id: &str, date: NaiveDate) -> RepoResult<Attendance> {
    find_for_day(pool, employee_id, date).await?.ok_or_else(|| {
        RepoError::Business(
            ErrorCode::AttendanceNotFound,
            format!("No attendance for {employee_id} on {date}"),
        )
    })
}

/// Open the day's record; a second check-in hits the UNIQUE(employee_id, date)
/// constraint and surfaces as `AlreadyCheckedIn`
pub async fn check_in(
    pool: &SqlitePool,
    employee_id: &str,
    date: NaiveDate,
    now_ms: i64,
    work_start_hour: u32,
    notes: Option<&str>,
) -> RepoResult<Attendance> {
    let status = status_for_check_in(now_ms, work_start_hour);
    sqlx::query(
        "INSERT INTO attendance (employee_id, date, check_in, status, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(employee_id)
    .bind(date)
    .bind(now_ms)
    .bind(status)
    .bind(notes)
    .execute(pool)
    .await?;

    get_for_day(pool, employee_id, date).await
}

pub async fn check_out(
    pool: &SqlitePool,
    employee_id: &str,
    date: NaiveDate,
    now_ms: i64,
    notes: Option<&str>,
) -> RepoResult<Attendance> {
    let rows = sqlx::query(
        "UPDATE attendance SET check_out = ?1, notes = COALESCE(?2, notes) WHERE employee_id = ?3 AND date = ?4 AND check_in IS NOT NULL AND check_out IS NULL",
    )
    .bind(now_ms)
    .bind(notes)
    .bind(employee_id)
    .bind(date)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_for_day(pool, employee_id, date).await? {
            Some(record) if record.check_out.is_some() => Err(RepoError::Business(
                ErrorCode::AlreadyCheckedOut,
                "Already checked out today".into(),
            )),
            _ => Err(RepoError::Business(
                ErrorCode::NotCheckedIn,
                "Check in before checking out".into(),
            )),
        };
    }

    get_for_day(pool, employee_id, date).await
}
