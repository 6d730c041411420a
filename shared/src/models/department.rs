//! Department aggregates

use serde::{Deserialize, Serialize};

/// Per-department headcount and payroll summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DepartmentOverview {
    pub department: String,
    pub employee_count: i64,
    pub active_count: i64,
    pub on_leave_count: i64,
    pub average_salary: f64,
    pub total_salary: f64,
}
