//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{ApiResponse, ErrorCode};
use shared::models::{
    CredentialsUpdate, Employee, EmployeeCreate, EmployeeCreated, EmployeeDetail, EmployeeQuery,
    EmployeeUpdate, UserRole,
};

use crate::auth::permissions::{
    ensure_can_access_employee, ensure_can_grant_role, require_employee_id,
};
use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::employee::{self, NewEmployee};
use crate::db::repository::user::{self, CredentialChanges};
use crate::db::repository::activity;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_password, validate_required_text, validate_salary,
};
use crate::{AppError, AppResult};

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

fn validate_username(username: &str) -> AppResult<()> {
    validate_required_text(username, "username", MAX_SHORT_TEXT_LEN)?;
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::validation("username must not contain whitespace"));
    }
    Ok(())
}

/// List employees
///
/// Filters: `employee_id`, `department`, `status`, `search` (name / email /
/// employee_id). Managers see everyone; employees only their own record.
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(mut query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    if !current.is_manager() {
        query.employee_id = Some(require_employee_id(&current)?.to_string());
    }
    let employees = employee::find_all(state.pool(), &query).await?;
    Ok(Json(employees))
}

/// Get one employee by `E001` style id or row id
///
/// Employees may only read their own record.
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<EmployeeDetail>> {
    let detail = employee::find_detail(state.pool(), &id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {id} not found")))?;
    ensure_can_access_employee(&current, &detail.employee.employee_id)?;
    Ok(Json(detail))
}

/// Create an employee together with its login account
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<(StatusCode, Json<EmployeeCreated>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let email = validate_email(&payload.email)?;
    validate_required_text(&payload.department, "department", MAX_NAME_LEN)?;
    validate_required_text(&payload.position, "position", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_salary(payload.salary)?;

    let role = payload.role.unwrap_or(UserRole::Employee);
    ensure_can_grant_role(&current, role)?;

    let username = match payload.username.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => email.split('@').next().unwrap_or(&email).to_string(),
    };
    validate_username(&username)?;

    let password = payload
        .password
        .clone()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| state.config.default_employee_password.clone());
    validate_password(&password)?;

    // Friendly pre-checks; the unique constraints still catch races
    if employee::email_exists(state.pool(), &email, None).await? {
        return Err(AppError::with_message(
            ErrorCode::EmailExists,
            format!("Email {email} is already in use"),
        ));
    }
    if user::username_exists(state.pool(), &username, None).await? {
        return Err(AppError::with_message(
            ErrorCode::UsernameExists,
            format!("Username {username} is already taken"),
        ));
    }

    let created = employee::create(
        state.pool(),
        NewEmployee {
            name: payload.name.trim().to_string(),
            email,
            phone: payload.phone,
            department: payload.department.trim().to_string(),
            position: payload.position.trim().to_string(),
            salary: payload.salary,
            hire_date: payload.hire_date.unwrap_or_else(shared::util::today),
            status: payload.status.unwrap_or_default(),
            address: payload.address,
            username,
            password_hash: hash(&password)?,
            role,
        },
    )
    .await?;

    let employee_id = &created.employee.employee_id;
    tracing::info!(employee_id = %employee_id, username = %created.username, "Employee created");
    activity::record(
        state.pool(),
        &current.username,
        "employee.created",
        format!("Created employee {} ({employee_id})", created.employee.name),
        Some(employee_id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial update
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(mut payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    let existing = employee::get(state.pool(), &id).await?;
    let employee_id = existing.employee_id;

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(department) = &payload.department {
        validate_required_text(department, "department", MAX_NAME_LEN)?;
    }
    if let Some(position) = &payload.position {
        validate_required_text(position, "position", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    if let Some(salary) = payload.salary {
        validate_salary(salary)?;
    }
    if let Some(email) = payload.email.take() {
        let email = validate_email(&email)?;
        if employee::email_exists(state.pool(), &email, Some(&employee_id)).await? {
            return Err(AppError::with_message(
                ErrorCode::EmailExists,
                format!("Email {email} is already in use"),
            ));
        }
        payload.email = Some(email);
    }

    let updated = employee::update(state.pool(), &employee_id, payload).await?;

    activity::record(
        state.pool(),
        &current.username,
        "employee.updated",
        format!("Updated employee {} ({employee_id})", updated.name),
        Some(&employee_id),
        None,
    )
    .await;

    Ok(Json(updated))
}

/// Delete the employee and its account
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let existing = employee::get(state.pool(), &id).await?;
    if current.owns(&existing.employee_id) {
        return Err(AppError::new(ErrorCode::EmployeeCannotDeleteSelf));
    }

    employee::delete(state.pool(), &existing.employee_id).await?;

    tracing::info!(employee_id = %existing.employee_id, "Employee deleted");
    activity::record(
        state.pool(),
        &current.username,
        "employee.deleted",
        format!("Deleted employee {} ({})", existing.name, existing.employee_id),
        Some(&existing.employee_id),
        None,
    )
    .await;

    Ok(Json(ApiResponse::ok()))
}

/// Change the linked account's username / password / role / active flag
///
/// Creates the account when the employee has none (username and password
/// then required).
pub async fn update_credentials(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CredentialsUpdate>,
) -> AppResult<Json<EmployeeDetail>> {
    let existing = employee::get(state.pool(), &id).await?;
    let employee_id = existing.employee_id.clone();

    let username = payload.username.as_deref().map(str::trim).map(str::to_string);
    if let Some(username) = &username {
        validate_username(username)?;
    }
    if let Some(password) = &payload.password {
        validate_password(password)?;
    }
    if let Some(role) = payload.role {
        ensure_can_grant_role(&current, role)?;
    }

    let account = user::find_by_employee_id(state.pool(), &employee_id).await?;
    if account.as_ref().is_some_and(|a| a.role == UserRole::Admin) && !current.is_admin() {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    if let Some(username) = &username
        && user::username_exists(state.pool(), username, account.as_ref().map(|a| a.id)).await?
    {
        return Err(AppError::with_message(
            ErrorCode::UsernameExists,
            format!("Username {username} is already taken"),
        ));
    }

    let password_hash = payload.password.as_deref().map(hash).transpose()?;
    user::upsert_credentials(
        state.pool(),
        &employee_id,
        &existing.email,
        CredentialChanges {
            username,
            password_hash,
            role: payload.role,
            is_active: payload.is_active,
        },
    )
    .await?;

    activity::record(
        state.pool(),
        &current.username,
        "employee.credentials_updated",
        format!("Updated login credentials of {employee_id}"),
        Some(&employee_id),
        None,
    )
    .await;

    let detail = employee::find_detail(state.pool(), &employee_id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {employee_id} not found")))?;
    Ok(Json(detail))
}
