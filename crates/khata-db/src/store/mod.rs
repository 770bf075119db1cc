//! # Per-Entity Stores
//!
//! CRUD persistence for every row-per-record entity, plus the special-cased
//! stock ledger, attendance register and payment settlement.
//!
//! ## Store Shape
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Store Layout                                │
//! │                                                                  │
//! │  EntityStore<R>  ── generic CRUD over any Record                 │
//! │   ├── create(new)         INSERT, server-assigned id/created_at  │
//! │   ├── list_all()          SELECT *, entity's canonical order     │
//! │   ├── get(id)             Option - absence is not an error       │
//! │   ├── update(id, patch)   partial update, RETURNING *            │
//! │   └── delete(id)          only where R: HardDelete               │
//! │                                                                  │
//! │  Product: no HardDelete - deactivate() instead                   │
//! │  StockLedger: composite key, delta upserts (no Record)           │
//! │  AttendanceRegister: (employee_id, date) day-upsert              │
//! │  Settlement: allocation persistence over sales + orders          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absence on get/update/delete is `Ok(None)`; callers map it to 404.

use std::marker::PhantomData;

use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use tracing::debug;

use khata_core::ValidationError;

use crate::error::DbResult;
use crate::update::{BuiltUpdate, SqlValue, UpdateBuilder};

pub mod attendance;
pub mod customer;
pub mod employee;
pub mod expense;
pub mod order;
pub mod product;
pub mod production;
pub mod raw_material;
pub mod sale;
pub mod settlement;
pub mod stock;

pub use attendance::AttendanceRegister;
pub use settlement::{Settlement, SettlementSummary};
pub use stock::StockLedger;

// =============================================================================
// Record Abstraction
// =============================================================================

/// A sparse field set convertible into partial-update assignments.
///
/// Field order is the declaration order of the patch struct; only supplied
/// fields appear.
pub trait PatchFields {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)>;
}

/// A persistable entity with a UUID primary key and one row per record.
///
/// The associated constants describe the table; `from_new` performs the
/// server-assigned parts of creation (id, created_at, input defaults) so
/// the INSERT can bind a fully-formed record.
pub trait Record:
    for<'r> sqlx::FromRow<'r, SqliteRow> + Clone + Unpin + Send + Sync + 'static
{
    /// Entity name for logs and NotFound messages.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Insert columns, in `bind_values` order.
    const INSERT_COLUMNS: &'static [&'static str];
    /// Canonical listing order: `date DESC, rowid DESC` for transactional
    /// entities, `name ASC` for lookup entities.
    const ORDER_BY: &'static str;

    type New: Send;
    type Patch: PatchFields + Send;

    /// Business-rule validation of creation input. Default: accept.
    fn validate(new: &Self::New) -> Result<(), ValidationError> {
        let _ = new;
        Ok(())
    }

    /// Builds the full record from creation input (assigns id, created_at,
    /// and any server-side defaults).
    fn from_new(new: Self::New) -> Self;

    fn id(&self) -> &str;

    /// Values for `INSERT_COLUMNS`, positionally.
    fn bind_values(&self) -> Vec<SqlValue>;
}

/// Marker for entities that support hard deletion.
///
/// Product deliberately does not implement this: sale and order line items
/// reference products by name, so products are soft-deactivated instead.
pub trait HardDelete: Record {}

// =============================================================================
// Generic Entity Store
// =============================================================================

/// Generic CRUD store over a [`Record`].
///
/// Cheap to clone; all clones share the underlying pool.
pub struct EntityStore<R: Record> {
    pool: SqlitePool,
    _marker: PhantomData<R>,
}

impl<R: Record> Clone for EntityStore<R> {
    fn clone(&self) -> Self {
        EntityStore {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R: Record> EntityStore<R> {
    pub fn new(pool: SqlitePool) -> Self {
        EntityStore {
            pool,
            _marker: PhantomData,
        }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates a record from validated input.
    ///
    /// The returned record is the one built server-side, not a re-read:
    /// the INSERT either persists exactly these values or fails.
    pub async fn create(&self, new: R::New) -> DbResult<R> {
        R::validate(&new)?;
        let record = R::from_new(new);

        let placeholders = vec!["?"; R::INSERT_COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::INSERT_COLUMNS.join(", "),
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for value in record.bind_values() {
            query = value.bind_to(query);
        }
        query.execute(&self.pool).await?;

        debug!(entity = R::ENTITY, id = record.id(), "Created record");
        Ok(record)
    }

    /// Lists every record in the entity's canonical order.
    pub async fn list_all(&self) -> DbResult<Vec<R>> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", R::TABLE, R::ORDER_BY);
        let rows = sqlx::query_as::<_, R>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Fetches one record by id. `Ok(None)` when absent.
    pub async fn get(&self, id: &str) -> DbResult<Option<R>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", R::TABLE);
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Applies a partial update, touching exactly the supplied fields.
    ///
    /// ## Returns
    /// - `Ok(Some(record))` - the post-update row
    /// - `Ok(None)` - no row with this id
    ///
    /// ## Errors
    /// An all-`None` patch is rejected with
    /// [`ValidationError::NoFieldsToUpdate`] before touching the database.
    pub async fn update(&self, id: &str, patch: R::Patch) -> DbResult<Option<R>> {
        let mut builder = UpdateBuilder::new(R::TABLE);
        for (column, value) in patch.into_fields() {
            builder.set(column, value);
        }
        let built = builder.build(&[("id", id.into())])?;

        let updated = fetch_optional_built::<R>(&self.pool, built).await?;
        if updated.is_some() {
            debug!(entity = R::ENTITY, id, "Updated record");
        }
        Ok(updated)
    }
}

impl<R: HardDelete> EntityStore<R> {
    /// Hard-deletes a record, returning the removed row.
    pub async fn delete(&self, id: &str) -> DbResult<Option<R>> {
        let sql = format!("DELETE FROM {} WHERE id = ? RETURNING *", R::TABLE);
        let removed = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if removed.is_some() {
            debug!(entity = R::ENTITY, id, "Deleted record");
        }
        Ok(removed)
    }
}

/// Runs a built update and maps the returned row.
pub(crate) async fn fetch_optional_built<R>(
    pool: &SqlitePool,
    built: BuiltUpdate,
) -> DbResult<Option<R>>
where
    R: for<'r> sqlx::FromRow<'r, SqliteRow> + Unpin + Send,
{
    let BuiltUpdate { sql, args } = built;
    let mut query = sqlx::query_as::<_, R>(&sql);
    for arg in args {
        query = arg.bind_to_as(query);
    }
    Ok(query.fetch_optional(pool).await?)
}

/// Fresh UUID v4 string id, the identity scheme for every row entity.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
