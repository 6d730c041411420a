//! Authentication Handlers
//!
//! Handles login, logout, current user and password change

use axum::{Json, extract::State};
use shared::client::{ChangePasswordRequest, LoginRequest, LoginResponse, UserInfo};
use shared::error::{ApiResponse, ErrorCode};
use shared::models::{User, UserRole};

use crate::auth::{CurrentUser, demo, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::{activity, employee, user};
use crate::security_log;
use crate::utils::validation::validate_password;
use crate::{AppError, AppResult};

/// Issue a token and build the login response
fn issue(
    state: &ServerState,
    id: i64,
    username: &str,
    email: Option<String>,
    role: UserRole,
    employee_id: Option<&str>,
) -> AppResult<LoginResponse> {
    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(id, username, role, employee_id)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    Ok(LoginResponse {
        token,
        expires_in: jwt_service.expires_in_seconds(),
        user: UserInfo {
            id,
            username: username.to_string(),
            email,
            role,
            employee_id: employee_id.map(str::to_string),
            employee: None,
        },
    })
}

/// Login handler
///
/// Demo accounts (when enabled) are checked first, then the users table by
/// username or email. Unknown user and wrong password produce the same error.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "username and password are required",
        ));
    }

    if state.config.demo_users_enabled
        && let Some(demo_user) = demo::authenticate(username, &req.password)
    {
        let response = issue(
            &state,
            demo_user.id,
            demo_user.username,
            Some(demo_user.email.to_string()),
            demo_user.role,
            demo_user.employee_id,
        )?;
        tracing::info!(username = %demo_user.username, role = %demo_user.role, "Demo user logged in");
        activity::record(
            state.pool(),
            demo_user.username,
            "auth.login",
            format!("{} logged in", demo_user.username),
            None,
            None,
        )
        .await;
        return Ok(Json(response));
    }

    let found: Option<User> = user::find_by_login(state.pool(), username).await?;

    // Unified error message to prevent username enumeration
    let account = match found {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        Some(_) => {
            security_log!("WARN", "login_failed", username = username.to_string(), reason = "invalid_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", username = username.to_string(), reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    if !account.is_active {
        security_log!("WARN", "login_disabled", username = account.username.clone());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let response = issue(
        &state,
        account.id,
        &account.username,
        Some(account.email.clone()),
        account.role,
        account.employee_id.as_deref(),
    )?;

    if let Err(e) = user::touch_last_login(state.pool(), account.id).await {
        tracing::warn!(user_id = account.id, error = %e, "Failed to update last_login");
    }
    activity::record(
        state.pool(),
        &account.username,
        "auth.login",
        format!("{} logged in", account.username),
        None,
        None,
    )
    .await;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = %account.role,
        "User logged in successfully"
    );

    Ok(Json(response))
}

/// Get current user info
///
/// Persisted accounts are re-read so deleted or disabled users lose access
/// before their token expires.
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> AppResult<Json<UserInfo>> {
    let (email, employee_id) = if current.id < 0 {
        let demo_user = demo::find_by_id(current.id).ok_or_else(AppError::unauthorized)?;
        (
            Some(demo_user.email.to_string()),
            demo_user.employee_id.map(str::to_string),
        )
    } else {
        let account = user::find_by_id(state.pool(), current.id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(AppError::unauthorized)?;
        (Some(account.email), account.employee_id)
    };

    let profile = match employee_id.as_deref() {
        Some(id) => employee::find_by_employee_id(state.pool(), id).await?,
        None => None,
    };

    Ok(Json(UserInfo {
        id: current.id,
        username: current.username,
        email,
        role: current.role,
        employee_id,
        employee: profile,
    }))
}

/// Logout handler
///
/// Tokens are stateless; this only records the event.
pub async fn logout(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<()>>> {
    activity::record(
        state.pool(),
        &current.username,
        "auth.logout",
        format!("{} logged out", current.username),
        None,
        None,
    )
    .await;

    tracing::info!(user_id = current.id, username = %current.username, "User logged out");

    Ok(Json(ApiResponse::ok()))
}

/// Change own password (requires the current one)
pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    if current.id < 0 {
        return Err(AppError::invalid("Demo accounts cannot change their password"));
    }
    validate_password(&req.new_password)?;

    let account = user::find_by_id(state.pool(), current.id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    if !verify_password(&req.current_password, &account.password_hash) {
        security_log!("WARN", "password_change_failed", user_id = current.id);
        return Err(AppError::invalid_credentials());
    }

    let password_hash = hash_password(&req.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    user::update_password(state.pool(), current.id, &password_hash).await?;

    activity::record(
        state.pool(),
        &current.username,
        "auth.password_changed",
        format!("{} changed their password", current.username),
        None,
        None,
    )
    .await;
    security_log!("INFO", "password_changed", user_id = current.id);

    Ok(Json(ApiResponse::ok()))
}
