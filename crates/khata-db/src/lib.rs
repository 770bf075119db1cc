//! # khata-db: Database Layer for the Khata Ledger
//!
//! This crate provides database access for the khata small-business ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Khata Data Flow                             │
//! │                                                                  │
//! │  HTTP handlers (outside this workspace)                          │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  ┌──────────────────────────────────────────────────────────┐    │
//! │  │                 khata-db (THIS CRATE)                    │    │
//! │  │                                                          │    │
//! │  │  ┌────────────┐  ┌─────────────┐  ┌──────────────────┐   │    │
//! │  │  │  Database  │  │   Stores    │  │     Schema       │   │    │
//! │  │  │ (pool.rs)  │  │ EntityStore │  │  reconcile on    │   │    │
//! │  │  │            │◄─│ StockLedger │  │  every boot,     │   │    │
//! │  │  │ SqlitePool │  │ Attendance  │  │  idempotent      │   │    │
//! │  │  │            │  │ Settlement  │  │                  │   │    │
//! │  │  └────────────┘  └─────────────┘  └──────────────────┘   │    │
//! │  └──────────────────────────────────────────────────────────┘    │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  SQLite database file (WAL)                                      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and the `Database` handle
//! - [`schema`] - Idempotent schema reconciliation
//! - [`update`] - Partial-update statement builder
//! - [`error`] - Database error types
//! - [`store`] - Per-entity stores, stock ledger, attendance, settlement
//!
//! ## Usage
//!
//! ```rust,ignore
//! use khata_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/khata.db")).await?;
//!
//! let customer = db.customers().create(new_customer).await?;
//! let summary = db.settlement().settle(&customer.id, amount).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pool;
pub mod schema;
pub mod store;
pub mod update;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use schema::ReconcileReport;

// Store re-exports for convenience
pub use store::{
    AttendanceRegister, EntityStore, HardDelete, PatchFields, Record, Settlement,
    SettlementSummary, StockLedger,
};
pub use update::{SqlValue, UpdateBuilder};
