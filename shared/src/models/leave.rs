//! Leave Request Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum LeaveType {
    #[default]
    Annual,
    Sick,
    Personal,
    Maternity,
    Paternity,
    Unpaid,
    Other,
}

/// Leave request lifecycle
///
/// ```text
/// pending ──► approved ──► cancelled
///    │
///    ├──────► rejected
///    └──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Cancelled)
                | (Self::Approved, Self::Cancelled)
        )
    }
}

/// Leave request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: String,
    /// Joined from employees
    pub employee_name: Option<String>,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive day count
    pub days: i64,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    /// Username of the reviewer
    pub reviewed_by: Option<String>,
    pub review_comment: Option<String>,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create leave payload
///
/// `employee_id` is only honoured for managers; employees always file for
/// themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveCreate {
    pub employee_id: Option<String>,
    #[serde(default)]
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Review / cancel payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveStatusUpdate {
    pub status: LeaveStatus,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveQuery {
    pub status: Option<LeaveStatus>,
    pub employee_id: Option<String>,
}

/// Inclusive number of calendar days between two dates
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_from_pending() {
        let p = LeaveStatus::Pending;
        assert!(p.can_transition_to(LeaveStatus::Approved));
        assert!(p.can_transition_to(LeaveStatus::Rejected));
        assert!(p.can_transition_to(LeaveStatus::Cancelled));
        assert!(!p.can_transition_to(LeaveStatus::Pending));
    }

    #[test]
    fn test_terminal_states() {
        assert!(LeaveStatus::Approved.can_transition_to(LeaveStatus::Cancelled));
        assert!(!LeaveStatus::Approved.can_transition_to(LeaveStatus::Rejected));
        assert!(!LeaveStatus::Rejected.can_transition_to(LeaveStatus::Approved));
        assert!(!LeaveStatus::Cancelled.can_transition_to(LeaveStatus::Pending));
    }

    #[test]
    fn test_leave_days_inclusive() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(leave_days(d("2024-03-01"), d("2024-03-01")), 1);
        assert_eq!(leave_days(d("2024-02-28"), d("2024-03-01")), 3);
    }
}
