use thiserror::Error;

/// Startup and lifecycle errors
///
/// Request-level failures are [`crate::AppError`]; this type only covers
/// things that stop the process from serving.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result alias for startup code
pub type Result<T> = std::result::Result<T, ServerError>;
