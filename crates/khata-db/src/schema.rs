//! # Schema Reconciliation
//!
//! Idempotent "create-if-missing, alter-if-missing" schema evolution, run
//! on every boot before any caller is reachable.
//!
//! ## How Reconciliation Works
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Reconcile Process                           │
//! │                                                                  │
//! │  App Startup                                                     │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  For each known table:                                           │
//! │       ├── missing? CREATE TABLE with the canonical base columns  │
//! │       └── present? leave untouched                               │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  One-time supersessions (legacy expenses layout)                 │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  For each later-revision column:                                 │
//! │       ├── PRAGMA table_info gate                                 │
//! │       └── absent? ALTER TABLE ADD COLUMN with its default        │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  Conditional indexes (incl. active-product name uniqueness)      │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  ReconcileReport (zero changes on a repeat run)                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Safety
//! - Idempotent: safe to run on every boot regardless of schema age
//!   (zero, one, or many prior revisions)
//! - Never drops or renames columns, except the explicitly superseded
//!   legacy `expenses.description`/`qty` pair
//! - Any structural failure other than "already exists" is fatal
//!   ([`DbError::Schema`]): serving against an unknown schema risks
//!   silent data corruption

use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{DbError, DbResult};

// =============================================================================
// Schema Declarations
// =============================================================================

struct TableDef {
    name: &'static str,
    create_sql: &'static str,
}

/// A column added in a revision later than its table's base layout.
///
/// `decl` is the full column declaration so ADD COLUMN can carry the
/// default (SQLite requires one for NOT NULL additions).
struct ColumnDef {
    table: &'static str,
    column: &'static str,
    decl: &'static str,
}

struct IndexDef {
    name: &'static str,
    create_sql: &'static str,
}

/// Canonical base tables. Monetary columns are INTEGER paise, quantity
/// columns INTEGER milli-units, dates ISO-8601 TEXT.
const TABLES: &[TableDef] = &[
    TableDef {
        name: "customers",
        create_sql: "CREATE TABLE customers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            mobile TEXT,
            place TEXT,
            created_at TEXT NOT NULL
        )",
    },
    TableDef {
        name: "products",
        create_sql: "CREATE TABLE products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT,
            unit TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
    },
    TableDef {
        name: "sales",
        create_sql: "CREATE TABLE sales (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            customer_id TEXT NOT NULL REFERENCES customers(id),
            discount INTEGER NOT NULL DEFAULT 0,
            total INTEGER NOT NULL,
            items TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    },
    TableDef {
        name: "orders",
        create_sql: "CREATE TABLE orders (
            id TEXT PRIMARY KEY,
            booking_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            customer_id TEXT NOT NULL REFERENCES customers(id),
            status TEXT NOT NULL DEFAULT 'pending',
            discount INTEGER NOT NULL DEFAULT 0,
            total INTEGER NOT NULL,
            items TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    },
    TableDef {
        name: "expenses",
        create_sql: "CREATE TABLE expenses (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            material_name TEXT,
            unit TEXT,
            quantity INTEGER,
            amount INTEGER NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        )",
    },
    TableDef {
        name: "production",
        create_sql: "CREATE TABLE production (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            item TEXT NOT NULL,
            qty INTEGER NOT NULL,
            unit TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    },
    // Composite business key; qty mutates only through delta upserts on
    // the creation path, absolute sets are a distinct manual operation.
    TableDef {
        name: "stock",
        create_sql: "CREATE TABLE stock (
            type TEXT NOT NULL,
            name TEXT NOT NULL,
            qty INTEGER NOT NULL DEFAULT 0,
            unit TEXT,
            PRIMARY KEY (type, name)
        )",
    },
    TableDef {
        name: "employees",
        create_sql: "CREATE TABLE employees (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            salary_type TEXT NOT NULL,
            daily_salary INTEGER NOT NULL DEFAULT 0,
            mobile TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
    },
    // Deliberately no uniqueness on (employee_id, date): the register's
    // check-then-act upsert owns that rule, and the accepted race under
    // the single-operator assumption stays observable rather than being
    // silently changed at the schema level.
    TableDef {
        name: "attendance",
        create_sql: "CREATE TABLE attendance (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            employee_id TEXT NOT NULL REFERENCES employees(id),
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    },
    TableDef {
        name: "raw_material_purchases",
        create_sql: "CREATE TABLE raw_material_purchases (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            material_name TEXT NOT NULL,
            qty INTEGER NOT NULL,
            cost INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
    },
    TableDef {
        name: "raw_material_usage",
        create_sql: "CREATE TABLE raw_material_usage (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            material_name TEXT NOT NULL,
            quantity_used INTEGER NOT NULL,
            unit TEXT NOT NULL,
            notes TEXT,
            cost INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
    },
    TableDef {
        name: "raw_material_prices",
        create_sql: "CREATE TABLE raw_material_prices (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            unit TEXT NOT NULL,
            price_per_unit INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
    },
];

/// Columns introduced after their table's base revision. On a fresh
/// database these run right after the CREATE; on an aged one only the
/// missing columns are added.
const REVISED_COLUMNS: &[ColumnDef] = &[
    ColumnDef {
        table: "sales",
        column: "payment_status",
        decl: "payment_status TEXT NOT NULL DEFAULT 'paid'",
    },
    ColumnDef {
        table: "sales",
        column: "amount_received",
        decl: "amount_received INTEGER NOT NULL DEFAULT 0",
    },
    ColumnDef {
        table: "sales",
        column: "buy_type",
        decl: "buy_type TEXT NOT NULL DEFAULT 'retail'",
    },
    ColumnDef {
        table: "orders",
        column: "payment_status",
        decl: "payment_status TEXT NOT NULL DEFAULT 'not_paid'",
    },
    ColumnDef {
        table: "orders",
        column: "amount_received",
        decl: "amount_received INTEGER NOT NULL DEFAULT 0",
    },
    ColumnDef {
        table: "production",
        column: "batch_number",
        decl: "batch_number TEXT",
    },
    ColumnDef {
        table: "production",
        column: "packed_qty",
        decl: "packed_qty INTEGER NOT NULL DEFAULT 0",
    },
    ColumnDef {
        table: "employees",
        column: "area",
        decl: "area TEXT",
    },
    ColumnDef {
        table: "attendance",
        column: "custom_salary",
        decl: "custom_salary INTEGER",
    },
];

const INDEXES: &[IndexDef] = &[
    // Name uniqueness holds among ACTIVE products only; deactivated
    // products keep their name for historical line items.
    IndexDef {
        name: "idx_products_active_name",
        create_sql:
            "CREATE UNIQUE INDEX idx_products_active_name ON products(name) WHERE active = 1",
    },
    IndexDef {
        name: "idx_sales_customer",
        create_sql: "CREATE INDEX idx_sales_customer ON sales(customer_id)",
    },
    IndexDef {
        name: "idx_orders_customer",
        create_sql: "CREATE INDEX idx_orders_customer ON orders(customer_id)",
    },
    IndexDef {
        name: "idx_attendance_employee_date",
        create_sql: "CREATE INDEX idx_attendance_employee_date ON attendance(employee_id, date)",
    },
];

// =============================================================================
// Reconcile Report
// =============================================================================

/// Structural changes applied by one reconcile pass.
///
/// A second pass against the same database reports zero changes; that is
/// the idempotence contract, and the tests hold reconcile to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub tables_created: usize,
    pub columns_added: usize,
    pub indexes_created: usize,
    pub supersessions_applied: usize,
}

impl ReconcileReport {
    /// Total structural changes in this pass.
    pub fn total_changes(&self) -> usize {
        self.tables_created + self.columns_added + self.indexes_created + self.supersessions_applied
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Reconciles the live database against the declared schema.
///
/// Safe to run on every boot regardless of current schema age. Side effect
/// only on missing objects; each structural change is logged.
///
/// ## Errors
/// [`DbError::Schema`] when a structural statement fails for any reason
/// other than the object already existing. Callers must treat this as
/// fatal and refuse to serve traffic.
pub async fn reconcile(pool: &SqlitePool) -> DbResult<ReconcileReport> {
    info!("Reconciling database schema");

    let mut report = ReconcileReport::default();

    for table in TABLES {
        if !table_exists(pool, table.name).await? {
            execute_ddl(pool, table.create_sql).await?;
            info!(table = table.name, "Created table");
            report.tables_created += 1;
        }
    }

    report.supersessions_applied += migrate_legacy_expense_columns(pool).await?;

    for col in REVISED_COLUMNS {
        if ensure_column(pool, col).await? {
            report.columns_added += 1;
        }
    }

    for index in INDEXES {
        if !index_exists(pool, index.name).await? {
            execute_ddl(pool, index.create_sql).await?;
            info!(index = index.name, "Created index");
            report.indexes_created += 1;
        }
    }

    if report.total_changes() == 0 {
        info!("Schema already up to date");
    } else {
        info!(
            tables = report.tables_created,
            columns = report.columns_added,
            indexes = report.indexes_created,
            supersessions = report.supersessions_applied,
            "Schema reconciled"
        );
    }

    Ok(report)
}

/// One-time supersession: `expenses.description`/`qty` were replaced by
/// `material_name`/`unit`/`quantity`/`notes`.
///
/// Gated on live column metadata, so invoking it when the target state
/// already holds is a no-op. Data is copied before the superseded columns
/// are dropped.
async fn migrate_legacy_expense_columns(pool: &SqlitePool) -> DbResult<usize> {
    let columns = table_columns(pool, "expenses").await?;
    let has = |name: &str| columns.iter().any(|c| c == name);

    if !has("description") && !has("qty") {
        return Ok(0);
    }

    info!("Migrating legacy expenses layout (description/qty superseded)");

    for col in [
        ("material_name", "material_name TEXT"),
        ("unit", "unit TEXT"),
        ("quantity", "quantity INTEGER"),
        ("notes", "notes TEXT"),
    ] {
        if !has(col.0) {
            execute_ddl(pool, &format!("ALTER TABLE expenses ADD COLUMN {}", col.1)).await?;
            info!(table = "expenses", column = col.0, "Added column");
        }
    }

    if has("description") {
        execute_ddl(
            pool,
            "UPDATE expenses SET material_name = description WHERE material_name IS NULL",
        )
        .await?;
        execute_ddl(pool, "ALTER TABLE expenses DROP COLUMN description").await?;
        info!(table = "expenses", "Dropped superseded column description");
    }

    if has("qty") {
        execute_ddl(
            pool,
            "UPDATE expenses SET quantity = qty WHERE quantity IS NULL",
        )
        .await?;
        execute_ddl(pool, "ALTER TABLE expenses DROP COLUMN qty").await?;
        info!(table = "expenses", "Dropped superseded column qty");
    }

    Ok(1)
}

/// Adds a column when the live table lacks it. Returns whether a change
/// was made. "Duplicate column name" from a concurrent boot is tolerated.
async fn ensure_column(pool: &SqlitePool, col: &ColumnDef) -> DbResult<bool> {
    let columns = table_columns(pool, col.table).await?;
    if columns.iter().any(|c| c == col.column) {
        return Ok(false);
    }

    let sql = format!("ALTER TABLE {} ADD COLUMN {}", col.table, col.decl);
    match sqlx::query(&sql).execute(pool).await {
        Ok(_) => {
            info!(table = col.table, column = col.column, "Added column");
            Ok(true)
        }
        Err(e) if e.to_string().contains("duplicate column name") => Ok(false),
        Err(e) => Err(DbError::Schema(e.to_string())),
    }
}

async fn table_exists(pool: &SqlitePool, name: &str) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| DbError::Schema(e.to_string()))?;

    Ok(count > 0)
}

async fn index_exists(pool: &SqlitePool, name: &str) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| DbError::Schema(e.to_string()))?;

    Ok(count > 0)
}

/// Live column names for a table. Empty when the table is absent.
async fn table_columns(pool: &SqlitePool, table: &str) -> DbResult<Vec<String>> {
    // PRAGMA arguments cannot be bound; `table` only ever comes from the
    // static declarations above.
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
        .fetch_all(pool)
        .await
        .map_err(|e| DbError::Schema(e.to_string()))?;

    Ok(rows
        .iter()
        .map(|row| row.get::<String, _>("name"))
        .collect())
}

async fn execute_ddl(pool: &SqlitePool, sql: &str) -> DbResult<()> {
    sqlx::query(sql)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| DbError::Schema(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let pool = memory_pool().await;

        let first = reconcile(&pool).await.unwrap();
        assert_eq!(first.tables_created, TABLES.len());
        assert_eq!(first.columns_added, REVISED_COLUMNS.len());
        assert!(first.total_changes() > 0);

        let second = reconcile(&pool).await.unwrap();
        assert_eq!(second.total_changes(), 0);
    }

    #[tokio::test]
    async fn test_fresh_database_applies_revision_defaults() {
        let pool = memory_pool().await;
        reconcile(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO customers (id, name, created_at) VALUES ('c1', 'Asif', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Insert omitting every later-revision column.
        sqlx::query(
            "INSERT INTO sales (id, date, customer_id, total, items, created_at)
             VALUES ('s1', '2026-01-02', 'c1', 20000, '[]', '2026-01-02T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let (status, received, buy_type): (String, i64, String) = sqlx::query_as(
            "SELECT payment_status, amount_received, buy_type FROM sales WHERE id = 's1'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(status, "paid");
        assert_eq!(received, 0);
        assert_eq!(buy_type, "retail");
    }

    #[tokio::test]
    async fn test_reconcile_upgrades_aged_database() {
        let pool = memory_pool().await;

        // A database from before payment tracking existed.
        sqlx::query(
            "CREATE TABLE sales (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                customer_id TEXT NOT NULL,
                discount INTEGER NOT NULL DEFAULT 0,
                total INTEGER NOT NULL,
                items TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO sales (id, date, customer_id, total, items, created_at)
             VALUES ('old', '2025-06-01', 'c1', 5000, '[]', '2025-06-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let report = reconcile(&pool).await.unwrap();
        // sales already existed; its three revision columns were added.
        assert_eq!(report.tables_created, TABLES.len() - 1);

        let status: String =
            sqlx::query_scalar("SELECT payment_status FROM sales WHERE id = 'old'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "paid");
    }

    #[tokio::test]
    async fn test_expense_supersession_copies_and_drops() {
        let pool = memory_pool().await;

        sqlx::query(
            "CREATE TABLE expenses (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                qty INTEGER,
                amount INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO expenses (id, date, category, description, qty, amount, created_at)
             VALUES ('e1', '2025-03-01', 'raw material', 'Sugar', 12000, 90000, '2025-03-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let report = reconcile(&pool).await.unwrap();
        assert_eq!(report.supersessions_applied, 1);

        let columns = table_columns(&pool, "expenses").await.unwrap();
        assert!(columns.iter().any(|c| c == "material_name"));
        assert!(columns.iter().any(|c| c == "notes"));
        assert!(!columns.iter().any(|c| c == "description"));
        assert!(!columns.iter().any(|c| c == "qty"));

        let (material, quantity): (Option<String>, Option<i64>) =
            sqlx::query_as("SELECT material_name, quantity FROM expenses WHERE id = 'e1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(material.as_deref(), Some("Sugar"));
        assert_eq!(quantity, Some(12000));

        // Target state now holds: re-running is a no-op.
        let again = reconcile(&pool).await.unwrap();
        assert_eq!(again.supersessions_applied, 0);
        assert_eq!(again.total_changes(), 0);
    }

    #[tokio::test]
    async fn test_active_product_name_uniqueness() {
        let pool = memory_pool().await;
        reconcile(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO products (id, name, unit, active, created_at)
             VALUES ('p1', 'Bread', 'pcs', 1, '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Same name while active: rejected.
        let dup = sqlx::query(
            "INSERT INTO products (id, name, unit, active, created_at)
             VALUES ('p2', 'Bread', 'pcs', 1, '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await;
        assert!(dup.is_err());

        // Same name after deactivation: allowed.
        sqlx::query("UPDATE products SET active = 0 WHERE id = 'p1'")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO products (id, name, unit, active, created_at)
             VALUES ('p3', 'Bread', 'pcs', 1, '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();
    }
}
