//! Role-based access rules
//!
//! Three fixed roles:
//! - `admin`: everything, including granting the admin role
//! - `hr`: manages employees, reviews leave, assigns tasks
//! - `employee`: own records only
//!
//! Route-level gates live in [`crate::auth::middleware`]; the checks here are
//! for record-level decisions inside handlers.

use shared::error::ErrorCode;
use shared::models::UserRole;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::security_log;

/// Require admin or HR
pub fn ensure_manager(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_manager() {
        return Ok(());
    }
    security_log!(
        "WARN",
        "manager_required",
        user_id = user.id,
        username = user.username.clone()
    );
    Err(AppError::new(ErrorCode::ManagerRequired))
}

/// Managers see every employee record; everyone else only their own
pub fn ensure_can_access_employee(user: &CurrentUser, employee_id: &str) -> Result<(), AppError> {
    if user.is_manager() || user.owns(employee_id) {
        return Ok(());
    }
    security_log!(
        "WARN",
        "permission_denied",
        user_id = user.id,
        username = user.username.clone(),
        employee_id = employee_id.to_string()
    );
    Err(AppError::forbidden("You can only access your own records"))
}

/// Only admins may hand out the admin role
pub fn ensure_can_grant_role(user: &CurrentUser, role: UserRole) -> Result<(), AppError> {
    if role == UserRole::Admin && !user.is_admin() {
        security_log!(
            "WARN",
            "admin_grant_denied",
            user_id = user.id,
            username = user.username.clone()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(())
}

/// The caller's linked employee id, or 400 for accounts without one
pub fn require_employee_id(user: &CurrentUser) -> Result<&str, AppError> {
    user.employee_id
        .as_deref()
        .ok_or_else(|| AppError::invalid("This account is not linked to an employee record"))
}
