use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tokio::sync::RwLock;

use flowops_core::config::StoreConfig;
use flowops_core::error::{FlowOpsError, Result};

/// Lazily connected Postgres pool.
///
/// The first call to [`Database::pool`] connects; every later call returns
/// the same pool until [`Database::close`] is called. Broken connections
/// inside the pool are replaced by sqlx on checkout.
pub struct Database {
    config: StoreConfig,
    pool: RwLock<Option<PgPool>>,
}

impl Database {
    /// Create an unconnected database handle.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    /// Get the pool, connecting on first use.
    pub async fn pool(&self) -> Result<PgPool> {
        if let Some(pool) = self.pool.read().await.as_ref() {
            return Ok(pool.clone());
        }

        let mut slot = self.pool.write().await;
        // Another task may have connected while we waited for the lock.
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let pool = self.create_pool().await?;
        tracing::info!(
            database = self.config.database.as_deref().unwrap_or("<from url>"),
            pool_size = self.config.pool_size,
            "Connected to workflow database"
        );
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Whether a pool has been established and not closed.
    pub async fn is_connected(&self) -> bool {
        self.pool.read().await.is_some()
    }

    async fn create_pool(&self) -> Result<PgPool> {
        let mut options: PgConnectOptions = self
            .config
            .url
            .parse()
            .map_err(|e| FlowOpsError::Config(format!("Invalid database URL: {}", e)))?;
        if let Some(name) = &self.config.database {
            options = options.database(name);
        }

        PgPoolOptions::new()
            .max_connections(self.config.pool_size)
            .acquire_timeout(Duration::from_secs(self.config.pool_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| FlowOpsError::Persistence(format!("Failed to connect to database: {}", e)))
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| FlowOpsError::Persistence(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Close all connections. The next `pool()` call reconnects.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.write().await.take() {
            pool.close().await;
            tracing::info!("Closed workflow database pool");
        }
    }
}
