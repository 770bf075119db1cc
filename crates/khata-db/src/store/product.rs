//! Product catalogue persistence.
//!
//! Products never hard-delete: line items reference them by name, so
//! removal is a soft deactivate and the `delete` capability is simply not
//! implemented for this entity. Name uniqueness holds among active
//! products only (partial unique index).

use chrono::Utc;
use tracing::debug;

use khata_core::validation::validate_name;
use khata_core::{NewProduct, Product, ProductPatch, ValidationError};

use super::{new_id, EntityStore, PatchFields, Record};
use crate::error::DbResult;
use crate::update::SqlValue;

impl Record for Product {
    const ENTITY: &'static str = "Product";
    const TABLE: &'static str = "products";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["id", "name", "category", "unit", "active", "created_at"];
    const ORDER_BY: &'static str = "name ASC";

    type New = NewProduct;
    type Patch = ProductPatch;

    fn validate(new: &NewProduct) -> Result<(), ValidationError> {
        validate_name(&new.name)
    }

    fn from_new(new: NewProduct) -> Self {
        Product {
            id: new_id(),
            name: new.name,
            category: new.category,
            unit: new.unit,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.as_str().into(),
            self.name.as_str().into(),
            self.category.clone().into(),
            self.unit.as_str().into(),
            self.active.into(),
            self.created_at.into(),
        ]
    }
}

impl PatchFields for ProductPatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(("name", name.into()));
        }
        if let Some(category) = self.category {
            fields.push(("category", category.into()));
        }
        if let Some(unit) = self.unit {
            fields.push(("unit", unit.into()));
        }
        if let Some(active) = self.active {
            fields.push(("active", active.into()));
        }
        fields
    }
}

impl EntityStore<Product> {
    /// Soft-deletes a product by flipping it inactive.
    ///
    /// The row and its name survive for historical line items; the name
    /// immediately becomes available for a new active product.
    pub async fn deactivate(&self, id: &str) -> DbResult<Option<Product>> {
        let deactivated = sqlx::query_as::<_, Product>(
            "UPDATE products SET active = 0 WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        if deactivated.is_some() {
            debug!(entity = "Product", id, "Deactivated product");
        }
        Ok(deactivated)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::error::DbError;
    use crate::schema;

    async fn store() -> EntityStore<Product> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::reconcile(&pool).await.unwrap();
        EntityStore::new(pool)
    }

    fn bread() -> NewProduct {
        NewProduct {
            name: "Bread".to_string(),
            category: Some("bakery".to_string()),
            unit: "pcs".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_active() {
        let store = store().await;
        let created = store.create(bread()).await.unwrap();
        assert!(created.active);
        assert_eq!(created.unit, "pcs");
    }

    #[tokio::test]
    async fn test_duplicate_active_name_is_rejected() {
        let store = store().await;
        store.create(bread()).await.unwrap();

        let err = store.create(bread()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_frees_name_for_reuse() {
        let store = store().await;
        let first = store.create(bread()).await.unwrap();

        let deactivated = store.deactivate(&first.id).await.unwrap().unwrap();
        assert!(!deactivated.active);

        // Old row survives; new active product may reuse the name.
        let second = store.create(bread()).await.unwrap();
        assert_ne!(second.id, first.id);
        assert!(store.get(&first.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deactivate_absent_id_returns_none() {
        let store = store().await;
        assert!(store.deactivate("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_patch_can_reactivate() {
        let store = store().await;
        let created = store.create(bread()).await.unwrap();
        store.deactivate(&created.id).await.unwrap();

        let restored = store
            .update(
                &created.id,
                ProductPatch {
                    active: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(restored.active);
    }
}
