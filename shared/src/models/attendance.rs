//! Attendance Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AttendanceStatus {
    #[default]
    Present,
    Late,
    Absent,
    HalfDay,
}

/// One attendance record per employee per day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attendance {
    pub id: i64,
    pub employee_id: String,
    pub employee_name: Option<String>,
    pub date: NaiveDate,
    pub check_in: Option<i64>,
    pub check_out: Option<i64>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// Check-in / check-out payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceQuery {
    pub employee_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
