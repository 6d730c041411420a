//! Employee Model

use super::user::UserRole;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Employment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    Terminated,
    OnLeave,
}

/// Employee entity
///
/// `employee_id` is the human-facing identifier (`E001`, `E002`, ...);
/// `id` is the row id it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub address: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
///
/// `username` defaults to the local part of `email`; `password` defaults to
/// the server's configured initial password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub salary: f64,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
    pub address: Option<String>,
}

/// Login credentials of an employee's linked user account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Employee list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
    /// Substring match on name, email or employee_id
    pub search: Option<String>,
}

/// Employee together with its linked account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: Employee,
    pub username: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Result of creating an employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreated {
    #[serde(flatten)]
    pub employee: Employee,
    pub username: String,
    pub role: UserRole,
}
