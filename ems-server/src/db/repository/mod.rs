//! Repository Module
//!
//! Free functions over `&SqlitePool` (or an open transaction), one module per
//! table. Every function returns [`RepoResult`].

pub mod activity;
pub mod attendance;
pub mod department;
pub mod employee;
pub mod leave;
pub mod notification;
pub mod task;
pub mod user;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint hit; carries the constraint description
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Pool exhausted, file locked or I/O failure; safe to retry
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{1}")]
    Business(ErrorCode, String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                RepoError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    RepoError::Duplicate(db_err.message().to_string())
                } else if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
                    RepoError::Validation(db_err.message().to_string())
                } else if matches!(db_err.code().as_deref(), Some("5" | "6" | "517")) {
                    // SQLITE_BUSY / SQLITE_LOCKED / SQLITE_BUSY_SNAPSHOT
                    RepoError::Unavailable(db_err.message().to_string())
                } else {
                    RepoError::Database(db_err.message().to_string())
                }
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Map a unique-constraint message (`UNIQUE constraint failed: users.email`)
/// to the matching conflict code
fn duplicate_code(constraint: &str) -> ErrorCode {
    if constraint.contains(".username") {
        ErrorCode::UsernameExists
    } else if constraint.contains(".email") {
        ErrorCode::EmailExists
    } else if constraint.contains("attendance.") {
        ErrorCode::AlreadyCheckedIn
    } else {
        ErrorCode::AlreadyExists
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => {
                let code = duplicate_code(&msg);
                AppError::new(code).with_detail("constraint", msg)
            }
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
            RepoError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "Database unavailable");
                AppError::new(ErrorCode::DatabaseUnavailable)
            }
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    /// In-memory database with the real migrations applied
    ///
    /// A single connection, since every `:memory:` connection is its own
    /// database.
    pub async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }
}
