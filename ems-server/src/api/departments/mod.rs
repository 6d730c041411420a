//! Department API Module
//!
//! Departments are not a table of their own; both routes aggregate the
//! `department` column of employees.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/departments", get(handler::list))
        .route("/api/departments/overview", get(handler::overview))
}
