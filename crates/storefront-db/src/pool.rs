//! # Database Handle
//!
//! Opens the storefront SQLite file and hands out repositories.
//!
//! ```text
//! DbConfig::new("storefront.db")          DbConfig::in_memory()
//!        │  WAL, busy_timeout, FKs on            │  one pinned connection
//!        └──────────────┬────────────────────────┘
//!                       ▼
//!              Database::new(config) ──► migrations
//!                       │
//!        ┌──────────────┼──────────────┐
//!        ▼              ▼              ▼
//!   db.carts()     db.orders()    db.products()
//! ```
//!
//! Two requests saving the same cart serialize on SQLite's write lock; the
//! loser waits up to `busy_timeout` and then sees the bumped version.

use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::cart::CartRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;

/// Where the database lives and how the pool around it behaves.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file; `None` is a private in-memory database.
    pub path: Option<PathBuf>,

    /// Upper bound on pooled connections. Default: 5
    pub pool_size: u32,

    /// How long a request waits for a free connection. Default: 10s
    pub acquire_timeout: Duration,

    /// How long a writer waits on SQLite's lock before failing. Default: 5s
    pub busy_timeout: Duration,

    /// Apply pending migrations when connecting. Default: true
    pub migrate: bool,
}

impl DbConfig {
    /// File-backed database, created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: Some(path.into()),
            pool_size: 5,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    /// Throwaway database for tests.
    ///
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            path: None,
            // Each in-memory connection is its own database
            pool_size: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            migrate: true,
        }
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            // The default options open a private in-memory database
            None => SqliteConnectOptions::new(),
        };

        options
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
    }
}

/// Shared handle to the storefront database.
///
/// Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let location = config
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        info!(path = %location, pool_size = config.pool_size, "Connecting to database");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(config.acquire_timeout);

        if config.path.is_none() {
            // Dropping the only connection would drop the data with it
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        if config.migrate {
            migrations::run_migrations(&db.pool).await?;
        }

        Ok(db)
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later calls through this handle fail.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// True if a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        a.carts().get_or_create("session:a").await.unwrap();

        assert!(b.carts().get_by_owner("session:a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/storefront-test.db")
            .pool_size(0)
            .busy_timeout(Duration::from_millis(250))
            .migrate(false);

        assert_eq!(config.pool_size, 1);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.migrate);
        assert!(DbConfig::in_memory().path.is_none());
    }
}
