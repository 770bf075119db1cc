//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                  Database Connection Pool                         │
//! │                                                                  │
//! │  App Startup                                                     │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  DbConfig::new(path) ← Configure pool settings                   │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  Database::new(config).await ← Create pool + reconcile schema    │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  ┌──────────────────────────────────────┐                        │
//! │  │            SqlitePool                │                        │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐    │  (max_connections)     │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│    │                        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘    │                        │
//! │  └──────────────────────────────────────┘                        │
//! │       │                                                          │
//! │       ▼  shared by all store handles                             │
//! │  db.customers() / db.sales() / db.stock() / db.settlement() ...  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use khata_core::{
    Customer, Employee, Expense, Order, Product, Production, RawMaterialPrice,
    RawMaterialPurchase, RawMaterialUsage, Sale,
};

use crate::error::{DbError, DbResult};
use crate::schema::{self, ReconcileReport};
use crate::store::{AttendanceRegister, EntityStore, Settlement, StockLedger};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/khata.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single-shop ledger)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to reconcile the schema on connect.
    /// Default: true
    pub reconcile_schema: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    /// The file is created if it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            reconcile_schema: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to reconcile the schema on connect.
    pub fn reconcile_schema(mut self, reconcile: bool) -> Self {
        self.reconcile_schema = reconcile;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            reconcile_schema: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing store access.
///
/// Cheap to clone; all handles share one pool. Each `db.xxx()` accessor
/// returns a store bound to that pool, so callers hold only the stores
/// they need.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Reconciles the schema (if enabled); a failure here is fatal
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path creates file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            // WAL mode: readers don't block writers and vice versa
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL synchronous: safe from corruption, may lose the last
            // transaction on power loss
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off for backwards compatibility
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.reconcile_schema {
            db.reconcile_schema().await?;
        }

        Ok(db)
    }

    /// Reconciles the live schema against the declared one.
    ///
    /// Automatically called by `new()` unless disabled in config;
    /// idempotent, so calling it again is harmless.
    pub async fn reconcile_schema(&self) -> DbResult<ReconcileReport> {
        schema::reconcile(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by the stores. Prefer store
    /// methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // -------------------------------------------------------------------------
    // Store accessors
    // -------------------------------------------------------------------------

    pub fn customers(&self) -> EntityStore<Customer> {
        EntityStore::new(self.pool.clone())
    }

    pub fn products(&self) -> EntityStore<Product> {
        EntityStore::new(self.pool.clone())
    }

    pub fn sales(&self) -> EntityStore<Sale> {
        EntityStore::new(self.pool.clone())
    }

    pub fn orders(&self) -> EntityStore<Order> {
        EntityStore::new(self.pool.clone())
    }

    pub fn expenses(&self) -> EntityStore<Expense> {
        EntityStore::new(self.pool.clone())
    }

    pub fn production(&self) -> EntityStore<Production> {
        EntityStore::new(self.pool.clone())
    }

    pub fn employees(&self) -> EntityStore<Employee> {
        EntityStore::new(self.pool.clone())
    }

    pub fn purchases(&self) -> EntityStore<RawMaterialPurchase> {
        EntityStore::new(self.pool.clone())
    }

    pub fn usage(&self) -> EntityStore<RawMaterialUsage> {
        EntityStore::new(self.pool.clone())
    }

    pub fn prices(&self) -> EntityStore<RawMaterialPrice> {
        EntityStore::new(self.pool.clone())
    }

    /// The attendance register (day-upsert keyed on employee and date).
    pub fn attendance(&self) -> AttendanceRegister {
        AttendanceRegister::new(self.pool.clone())
    }

    /// The running stock ledger (delta upserts on the composite key).
    pub fn stock(&self) -> StockLedger {
        StockLedger::new(self.pool.clone())
    }

    /// Payment settlement over unpaid sales and orders.
    pub fn settlement(&self) -> Settlement {
        Settlement::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all store operations fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DbConfig::in_memory();
        let db = Database::new(config).await.unwrap();

        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_schema_reconciled_on_connect() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // new() already reconciled; a second pass reports nothing to do.
        let report = db.reconcile_schema().await.unwrap();
        assert_eq!(report.total_changes(), 0);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
    }
}
