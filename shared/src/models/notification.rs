//! Notification Model

use super::user::UserRole;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum NotificationCategory {
    Leave,
    Task,
    Attendance,
    Employee,
    #[default]
    System,
}

/// Notification addressed to one user or to every user of a role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub recipient_user_id: Option<i64>,
    pub recipient_role: Option<UserRole>,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    pub is_read: bool,
    pub created_at: i64,
}

/// Create notification payload (exactly one recipient)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreate {
    pub recipient_user_id: Option<i64>,
    pub recipient_role: Option<UserRole>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub category: NotificationCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}
