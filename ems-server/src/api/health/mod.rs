//! Health check route
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/health | GET | none |
//!
//! ```json
//! { "status": "ok", "service": "ems-server", "version": "0.1.0", "database": "connected" }
//! ```

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use shared::client::HealthResponse;

use crate::core::ServerState;
use crate::db::DbService;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// 200 when the database answers `SELECT 1`, 503 `degraded` otherwise
async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = DbService::ping(state.pool()).await;
    if !db_ok {
        tracing::warn!("Health check: database unavailable");
    }

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if db_ok { "ok" } else { "degraded" }.to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: if db_ok { "connected" } else { "unavailable" }.to_string(),
        }),
    )
}
