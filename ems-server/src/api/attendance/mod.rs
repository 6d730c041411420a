//! Attendance API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/attendance", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/today", get(handler::today))
        .route("/check-in", post(handler::check_in))
        .route("/check-out", post(handler::check_out))
}
