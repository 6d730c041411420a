//! Authentication and authorization
//!
//! - [`JwtService`] - token signing and validation
//! - [`CurrentUser`] - authenticated caller
//! - [`require_auth`] - global bearer-token middleware
//! - [`require_manager`] - admin / hr route gate
//! - [`RateLimiter`] - login throttling

pub mod demo;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod rate_limit;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_manager};
pub use password::{hash_password, verify_password};
pub use rate_limit::{RateLimiter, login_rate_limit};
