//! Core module - configuration, state and server wiring
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - shared state handed to every handler
//! - [`Server`] - HTTP server lifecycle
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{Config, LogConfig};
pub use error::{Result, ServerError};
pub use server::{Server, build_app};
pub use state::ServerState;
