//! # Stock Ledger
//!
//! Running stock levels keyed by the composite `(type, name)`.
//!
//! ## Accumulation, Not Overwrite
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Stock Delta Upsert                            │
//! │                                                                  │
//! │  adjust(product, "Bread", +200)                                  │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  INSERT INTO stock ... ON CONFLICT(type, name)                   │
//! │  DO UPDATE SET qty = stock.qty + excluded.qty                    │
//! │       │                                                          │
//! │       ├── row absent:  created with qty = +200                   │
//! │       └── row present: qty accumulated atomically in SQL         │
//! │                                                                  │
//! │  Two concurrent +200 deltas land as +400: no read-modify-write   │
//! │  window. Negative results are allowed and mean oversell.         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absolute overwrites exist only as the explicit [`StockLedger::set`]
//! correction operation; the routine path is always a delta.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use khata_core::{Quantity, StockByType, StockItem, StockType};

use crate::error::DbResult;

/// Persistence for running stock levels.
#[derive(Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Applies a signed quantity delta, creating the row if absent.
    ///
    /// The accumulation happens inside the single upsert statement, so
    /// concurrent deltas against the same row can never lose an update.
    /// A `unit` is recorded on first sight and otherwise left alone.
    pub async fn adjust(
        &self,
        stock_type: StockType,
        name: &str,
        delta: Quantity,
        unit: Option<&str>,
    ) -> DbResult<StockItem> {
        let item = sqlx::query_as::<_, StockItem>(
            "INSERT INTO stock (type, name, qty, unit) VALUES (?, ?, ?, ?)
             ON CONFLICT(type, name)
             DO UPDATE SET qty = stock.qty + excluded.qty,
                           unit = COALESCE(stock.unit, excluded.unit)
             RETURNING *",
        )
        .bind(stock_type)
        .bind(name)
        .bind(delta)
        .bind(unit)
        .fetch_one(&self.pool)
        .await?;

        if item.qty.is_negative() {
            warn!(
                stock_type = stock_type.as_str(),
                name,
                qty = item.qty.milli(),
                "Stock level went negative"
            );
        } else {
            debug!(
                stock_type = stock_type.as_str(),
                name,
                delta = delta.milli(),
                "Adjusted stock"
            );
        }
        Ok(item)
    }

    /// Overwrites a stock level with an absolute value (manual correction
    /// after a physical count). Creates the row if absent.
    pub async fn set(
        &self,
        stock_type: StockType,
        name: &str,
        qty: Quantity,
        unit: Option<&str>,
    ) -> DbResult<StockItem> {
        let item = sqlx::query_as::<_, StockItem>(
            "INSERT INTO stock (type, name, qty, unit) VALUES (?, ?, ?, ?)
             ON CONFLICT(type, name)
             DO UPDATE SET qty = excluded.qty,
                           unit = COALESCE(excluded.unit, stock.unit)
             RETURNING *",
        )
        .bind(stock_type)
        .bind(name)
        .bind(qty)
        .bind(unit)
        .fetch_one(&self.pool)
        .await?;

        debug!(
            stock_type = stock_type.as_str(),
            name,
            qty = qty.milli(),
            "Set absolute stock level"
        );
        Ok(item)
    }

    /// Fetches one stock row by its composite key.
    pub async fn get(&self, stock_type: StockType, name: &str) -> DbResult<Option<StockItem>> {
        let item = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock WHERE type = ? AND name = ?",
        )
        .bind(stock_type)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// All stock rows partitioned into the two type buckets, each sorted
    /// by name.
    pub async fn list_by_type(&self) -> DbResult<StockByType> {
        let rows = sqlx::query_as::<_, StockItem>("SELECT * FROM stock ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut by_type = StockByType::default();
        for item in rows {
            match item.stock_type {
                StockType::Product => by_type.products.push(item),
                StockType::RawMaterial => by_type.raw_materials.push(item),
            }
        }
        Ok(by_type)
    }

    /// Removes a stock row, returning it. `Ok(None)` when absent.
    pub async fn delete(&self, stock_type: StockType, name: &str) -> DbResult<Option<StockItem>> {
        let removed = sqlx::query_as::<_, StockItem>(
            "DELETE FROM stock WHERE type = ? AND name = ? RETURNING *",
        )
        .bind(stock_type)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if removed.is_some() {
            debug!(stock_type = stock_type.as_str(), name, "Deleted stock row");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::schema;

    async fn ledger() -> StockLedger {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::reconcile(&pool).await.unwrap();
        StockLedger::new(pool)
    }

    #[tokio::test]
    async fn test_first_delta_creates_row() {
        let ledger = ledger().await;

        let item = ledger
            .adjust(
                StockType::RawMaterial,
                "Flour",
                Quantity::from_whole(100),
                Some("kg"),
            )
            .await
            .unwrap();

        assert_eq!(item.qty, Quantity::from_whole(100));
        assert_eq!(item.unit.as_deref(), Some("kg"));
    }

    #[tokio::test]
    async fn test_deltas_accumulate() {
        let ledger = ledger().await;

        ledger
            .adjust(StockType::Product, "Bread", Quantity::from_whole(200), Some("pcs"))
            .await
            .unwrap();
        let item = ledger
            .adjust(StockType::Product, "Bread", Quantity::from_whole(-50), None)
            .await
            .unwrap();

        assert_eq!(item.qty, Quantity::from_whole(150));
        // Unit recorded on first sight survives later deltas.
        assert_eq!(item.unit.as_deref(), Some("pcs"));
    }

    #[tokio::test]
    async fn test_same_name_different_type_are_independent() {
        let ledger = ledger().await;

        ledger
            .adjust(StockType::Product, "Chocolate", Quantity::from_whole(10), None)
            .await
            .unwrap();
        ledger
            .adjust(StockType::RawMaterial, "Chocolate", Quantity::from_whole(25), None)
            .await
            .unwrap();

        let product = ledger.get(StockType::Product, "Chocolate").await.unwrap().unwrap();
        let material = ledger
            .get(StockType::RawMaterial, "Chocolate")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.qty, Quantity::from_whole(10));
        assert_eq!(material.qty, Quantity::from_whole(25));
    }

    #[tokio::test]
    async fn test_negative_level_is_kept_visible() {
        let ledger = ledger().await;

        // Selling more than was ever stocked must not be masked.
        let item = ledger
            .adjust(StockType::Product, "Rusk", Quantity::from_whole(-30), None)
            .await
            .unwrap();
        assert_eq!(item.qty, Quantity::from_whole(-30));
    }

    #[tokio::test]
    async fn test_set_overwrites_after_physical_count() {
        let ledger = ledger().await;

        ledger
            .adjust(StockType::RawMaterial, "Sugar", Quantity::from_whole(80), Some("kg"))
            .await
            .unwrap();
        let corrected = ledger
            .set(StockType::RawMaterial, "Sugar", Quantity::from_whole(72), None)
            .await
            .unwrap();

        assert_eq!(corrected.qty, Quantity::from_whole(72));
        assert_eq!(corrected.unit.as_deref(), Some("kg"));
    }

    #[tokio::test]
    async fn test_list_partitions_by_type() {
        let ledger = ledger().await;

        ledger
            .adjust(StockType::Product, "Bread", Quantity::from_whole(5), None)
            .await
            .unwrap();
        ledger
            .adjust(StockType::RawMaterial, "Flour", Quantity::from_whole(40), None)
            .await
            .unwrap();
        ledger
            .adjust(StockType::RawMaterial, "Sugar", Quantity::from_whole(20), None)
            .await
            .unwrap();

        let by_type = ledger.list_by_type().await.unwrap();
        assert_eq!(by_type.products.len(), 1);
        assert_eq!(by_type.raw_materials.len(), 2);
        assert_eq!(by_type.raw_materials[0].name, "Flour");
    }

    #[tokio::test]
    async fn test_delete_returns_removed_row() {
        let ledger = ledger().await;

        ledger
            .adjust(StockType::Product, "Cake", Quantity::from_whole(3), None)
            .await
            .unwrap();

        let removed = ledger.delete(StockType::Product, "Cake").await.unwrap().unwrap();
        assert_eq!(removed.name, "Cake");
        assert!(ledger.get(StockType::Product, "Cake").await.unwrap().is_none());
        assert!(ledger.delete(StockType::Product, "Cake").await.unwrap().is_none());
    }
}
