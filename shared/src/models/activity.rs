//! Activity Model

use super::user::UserRole;
use serde::{Deserialize, Serialize};

/// Activity feed entry
///
/// `action` is a dotted verb such as `employee.created`; `recipient_role`
/// makes the entry visible to every user of that role in addition to the
/// actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Activity {
    pub id: i64,
    pub actor: String,
    pub action: String,
    pub category: String,
    pub message: String,
    pub target_id: Option<String>,
    pub recipient_role: Option<UserRole>,
    pub is_read: bool,
    pub created_at: i64,
}

/// Client-side activity payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityCreate {
    #[serde(default)]
    pub action: String,
    pub category: Option<String>,
    #[serde(default)]
    pub message: String,
    pub target_id: Option<String>,
    pub recipient_role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}
