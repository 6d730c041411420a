//! Shared types for the EMS service
//!
//! Error codes, response envelope, domain models and request/response DTOs
//! used by ems-server and its API clients.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
