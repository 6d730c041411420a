use std::str::FromStr;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// Default origins of the local frontend dev servers
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Directory for daily rolling files (stdout only when unset)
    pub dir: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            dir: None,
            json: false,
        }
    }
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENVIRONMENT | development | development / staging / production |
/// | HTTP_HOST | 0.0.0.0 | bind address |
/// | HTTP_PORT | 3001 | HTTP port |
/// | DATABASE_PATH | ./data/ems.db | SQLite file |
/// | DB_MAX_CONNECTIONS | 5 | pool size |
/// | JWT_SECRET | random in development | HS256 key, >= 32 chars |
/// | JWT_EXPIRATION_MINUTES | 1440 | token lifetime |
/// | JWT_ISSUER / JWT_AUDIENCE | ems-server / ems-clients | token iss / aud |
/// | CORS_ORIGINS | local dev origins | comma separated allow-list |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | DEMO_USERS_ENABLED | true in development | built-in demo logins |
/// | LOGIN_RATE_LIMIT | 10 | logins per IP per minute |
/// | DEFAULT_EMPLOYEE_PASSWORD | changeme123 | initial password of new employees |
/// | ADMIN_USERNAME / ADMIN_PASSWORD / ADMIN_EMAIL | admin / admin123 / admin@ems.local | bootstrap admin |
/// | WORK_START_HOUR | 9 | check-ins after this UTC hour are late |
/// | SEED_DEMO_DATA | false | insert sample employees at startup |
/// | LOG_LEVEL / LOG_DIR / LOG_JSON | info / unset / false | logging |
///
/// # Example
///
/// ```ignore
/// HTTP_PORT=8080 DATABASE_PATH=/tmp/ems.db cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub http_host: String,
    pub http_port: u16,
    pub database_path: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
    pub request_timeout_ms: u64,
    pub demo_users_enabled: bool,
    pub login_rate_limit: u32,
    pub default_employee_password: String,
    pub admin_username: String,
    pub admin_password: String,
    pub admin_email: String,
    pub work_start_hour: u32,
    pub seed_demo_data: bool,
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to the development defaults of
    /// [`Config::default`]. Outside development a real `JWT_SECRET` is
    /// mandatory and demo logins are off unless explicitly enabled.
    pub fn from_env() -> Result<Self, ServerError> {
        let base = Self::default();
        let environment = env_string("ENVIRONMENT", &base.environment);
        let is_development = environment == "development";

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                return Err(ServerError::Config(
                    "JWT_SECRET must be at least 32 characters long".into(),
                ));
            }
            Err(_) if is_development => {
                tracing::warn!("JWT_SECRET not set, using a random development key");
                base.jwt.secret.clone()
            }
            Err(_) => {
                return Err(ServerError::Config(format!(
                    "JWT_SECRET must be set when ENVIRONMENT={environment}"
                )));
            }
        };

        let cors_origins = match std::env::var("CORS_ORIGINS") {
            Ok(v) => v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => base.cors_origins.clone(),
        };

        let work_start_hour = env_parse("WORK_START_HOUR", base.work_start_hour);
        if work_start_hour > 23 {
            return Err(ServerError::Config(format!(
                "WORK_START_HOUR must be 0-23, got {work_start_hour}"
            )));
        }

        Ok(Self {
            http_host: env_string("HTTP_HOST", &base.http_host),
            http_port: env_parse("HTTP_PORT", base.http_port),
            database_path: env_string("DATABASE_PATH", &base.database_path),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", base.db_max_connections).max(1),
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_minutes: env_parse("JWT_EXPIRATION_MINUTES", base.jwt.expiration_minutes),
                issuer: env_string("JWT_ISSUER", &base.jwt.issuer),
                audience: env_string("JWT_AUDIENCE", &base.jwt.audience),
            },
            cors_origins,
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", base.request_timeout_ms),
            demo_users_enabled: env_parse("DEMO_USERS_ENABLED", is_development),
            login_rate_limit: env_parse("LOGIN_RATE_LIMIT", base.login_rate_limit),
            default_employee_password: env_string(
                "DEFAULT_EMPLOYEE_PASSWORD",
                &base.default_employee_password,
            ),
            admin_username: env_string("ADMIN_USERNAME", &base.admin_username),
            admin_password: env_string("ADMIN_PASSWORD", &base.admin_password),
            admin_email: env_string("ADMIN_EMAIL", &base.admin_email),
            work_start_hour,
            seed_demo_data: env_parse("SEED_DEMO_DATA", base.seed_demo_data),
            log: LogConfig {
                level: env_string("LOG_LEVEL", &base.log.level),
                dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
                json: env_parse("LOG_JSON", base.log.json),
            },
            environment,
        })
    }

    /// Address to bind the HTTP listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    /// Development defaults, independent of the process environment
    fn default() -> Self {
        Self {
            environment: "development".into(),
            http_host: "0.0.0.0".into(),
            http_port: 3001,
            database_path: "./data/ems.db".into(),
            db_max_connections: 5,
            jwt: JwtConfig::default(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            request_timeout_ms: 30_000,
            demo_users_enabled: true,
            login_rate_limit: 10,
            default_employee_password: "changeme123".into(),
            admin_username: "admin".into(),
            admin_password: "admin123".into(),
            admin_email: "admin@ems.local".into(),
            work_start_hour: 9,
            seed_demo_data: false,
            log: LogConfig::default(),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_development() {
        let config = Config::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(config.demo_users_enabled);
        assert_eq!(config.http_port, 3001);
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
        assert_eq!(config.cors_origins.len(), 4);
    }

    #[test]
    fn test_default_jwt_secret_is_long_enough() {
        let config = Config::default();
        assert!(config.jwt.secret.len() >= 32);
        assert_eq!(config.jwt.issuer, "ems-server");
        assert_eq!(config.jwt.audience, "ems-clients");
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        assert_eq!(env_parse("EMS_TEST_UNSET_VARIABLE_XYZ", 42u32), 42);
    }
}
