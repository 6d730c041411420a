//! Authentication Routes

mod handler;

use axum::{Router, middleware, routing::get, routing::post, routing::put};

use crate::auth::login_rate_limit;
use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/login: public, rate limited per client IP
/// - everything else: bearer token (global require_auth middleware)
pub fn router(state: &ServerState) -> Router<ServerState> {
    let login = Router::new()
        .route("/api/auth/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    Router::new()
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/logout", post(handler::logout))
        .route("/api/auth/password", put(handler::change_password))
        .merge(login)
}
