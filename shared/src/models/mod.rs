//! Data models
//!
//! Shared between ems-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Row IDs are `i64` (SQLite INTEGER PRIMARY KEY); timestamps are Unix millis.

pub mod activity;
pub mod attendance;
pub mod department;
pub mod employee;
pub mod leave;
pub mod notification;
pub mod task;
pub mod user;

// Re-exports
pub use activity::*;
pub use attendance::*;
pub use department::*;
pub use employee::*;
pub use leave::*;
pub use notification::*;
pub use task::*;
pub use user::*;
