//! Department API Handlers

use axum::{Json, extract::State};
use shared::models::DepartmentOverview;

use crate::AppResult;
use crate::core::ServerState;
use crate::db::repository::department;

/// Distinct department names
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(department::names(state.pool()).await?))
}

/// Headcount and payroll per department
pub async fn overview(State(state): State<ServerState>) -> AppResult<Json<Vec<DepartmentOverview>>> {
    Ok(Json(department::overview(state.pool()).await?))
}
