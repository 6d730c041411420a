//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role gates

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::ErrorCode;

use crate::AppError;
use crate::auth::{Claims, CurrentUser, JwtError, JwtService, demo};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;

/// API routes reachable without a token
const PUBLIC_API_ROUTES: &[&str] = &["/api/auth/login", "/api/health"];

/// Map a token validation failure to the client-facing error
pub(crate) fn token_error(e: &JwtError) -> AppError {
    match e {
        JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid token"),
    }
}

/// Resolve the caller behind validated claims
///
/// Persisted accounts are re-read on every request, so deactivation,
/// deletion and role changes apply to tokens that are already issued.
/// Demo accounts come from the built-in table and only while enabled.
pub(crate) async fn resolve_user(state: &ServerState, claims: Claims) -> Result<CurrentUser, AppError> {
    let claimed = CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))?;

    if claimed.id < 0 {
        return match demo::find_by_id(claimed.id) {
            Some(demo_user) if state.config.demo_users_enabled => Ok(CurrentUser {
                id: demo_user.id,
                username: demo_user.username.to_string(),
                role: demo_user.role,
                employee_id: demo_user.employee_id.map(str::to_string),
            }),
            _ => {
                security_log!("WARN", "auth_stale_account", user_id = claimed.id);
                Err(AppError::unauthorized())
            }
        };
    }

    match user::find_by_id(state.pool(), claimed.id).await? {
        Some(account) if account.is_active => Ok(CurrentUser {
            id: account.id,
            username: account.username,
            role: account.role,
            employee_id: account.employee_id,
        }),
        Some(_) => {
            security_log!("WARN", "auth_account_disabled", user_id = claimed.id);
            Err(AppError::unauthorized())
        }
        None => {
            security_log!("WARN", "auth_stale_account", user_id = claimed.id);
            Err(AppError::unauthorized())
        }
    }
}

/// Authentication middleware - requires a valid bearer token
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`,
/// resolves the account through [`resolve_user`] and inserts
/// [`CurrentUser`] into the request extensions.
///
/// # Skipped
///
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths (so they 404 normally)
/// - `/api/auth/login`, `/api/health`
///
/// # Errors
///
/// | Condition | Status |
/// |-----------|--------|
/// | no Authorization header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | anything else wrong with the token | 401 TokenInvalid |
/// | account deleted or deactivated | 401 NotAuthenticated |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") || PUBLIC_API_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.get_jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let current = resolve_user(&state, claims).await?;
            req.extensions_mut().insert(current);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            Err(token_error(&e))
        }
    }
}

/// Manager middleware - requires the `admin` or `hr` role
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_manager));
/// ```
pub async fn require_manager(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_manager() {
        security_log!(
            "WARN",
            "manager_required",
            user_id = user.id,
            username = user.username.clone(),
            user_role = user.role.as_str(),
            uri = format!("{:?}", req.uri())
        );
        return Err(AppError::new(ErrorCode::ManagerRequired));
    }

    Ok(next.run(req).await)
}
