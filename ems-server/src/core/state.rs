use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::{JwtService, RateLimiter};
use crate::core::{Config, Result};
use crate::db::{DbService, seed};

/// Server state - shared references to every service
///
/// Cloning is cheap: the pool and services are reference counted.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | immutable configuration |
/// | pool | SqlitePool | SQLite connection pool |
/// | jwt_service | `Arc<JwtService>` | token signing / validation |
/// | rate_limiter | RateLimiter | per-IP login throttling |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub rate_limiter: RateLimiter,
}

impl ServerState {
    /// Build state from already-initialized parts
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            rate_limiter: RateLimiter::new(),
        }
    }

    /// Initialize server state
    ///
    /// 1. Open the database and apply migrations
    /// 2. Make sure a bootstrap admin exists
    /// 3. Optionally insert demo data
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_path, config.db_max_connections).await?;
        let state = Self::new(config.clone(), db.pool);

        seed::ensure_admin(&state.pool, config)
            .await
            .map_err(|e| crate::core::ServerError::Database(format!("admin seed failed: {e}")))?;

        if config.seed_demo_data {
            seed::seed_demo_data(&state.pool, config)
                .await
                .map_err(|e| crate::core::ServerError::Database(format!("demo seed failed: {e}")))?;
        }

        Ok(state)
    }

    /// Start background tasks
    ///
    /// - rate limiter cleanup every 5 minutes
    pub fn start_background_tasks(&self) {
        let rate_limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                rate_limiter.cleanup().await;
            }
        });
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
