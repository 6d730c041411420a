//! EMS Server - employee management REST service
//!
//! # Module layout
//!
//! ```text
//! ems-server/src/
//! ├── core/     # config, state, server wiring, startup errors
//! ├── auth/     # JWT, password hashing, middleware, rate limiting
//! ├── api/      # HTTP routes and handlers (one module per resource)
//! ├── db/       # SQLite pool, migrations, repositories, seeding
//! └── utils/    # logging, input validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger;

/// Security event logging
///
/// Emits an event under target `security`, which the logger can route to a
/// dedicated sink.
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ______  ___ _____
   / ____/ /  |/  / ___/
  / __/   / /|_/ /\__ \
 / /___  / /  / /___/ /
/_____/ /_/  /_//____/
    "#
    );
}
