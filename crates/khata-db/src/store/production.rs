//! Production run persistence.

use chrono::Utc;

use khata_core::validation::validate_required;
use khata_core::{NewProduction, Production, ProductionPatch, ValidationError};

use super::{new_id, HardDelete, PatchFields, Record};
use crate::update::SqlValue;

impl Record for Production {
    const ENTITY: &'static str = "Production";
    const TABLE: &'static str = "production";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "id",
        "date",
        "item",
        "qty",
        "unit",
        "batch_number",
        "packed_qty",
        "created_at",
    ];
    const ORDER_BY: &'static str = "date DESC, rowid DESC";

    type New = NewProduction;
    type Patch = ProductionPatch;

    fn validate(new: &NewProduction) -> Result<(), ValidationError> {
        validate_required("item", &new.item)
    }

    fn from_new(new: NewProduction) -> Self {
        Production {
            id: new_id(),
            date: new.date,
            item: new.item,
            qty: new.qty,
            unit: new.unit,
            batch_number: new.batch_number,
            packed_qty: new.packed_qty,
            created_at: Utc::now(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.as_str().into(),
            self.date.into(),
            self.item.as_str().into(),
            self.qty.into(),
            self.unit.as_str().into(),
            self.batch_number.clone().into(),
            self.packed_qty.into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for Production {}

impl PatchFields for ProductionPatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(date) = self.date {
            fields.push(("date", date.into()));
        }
        if let Some(item) = self.item {
            fields.push(("item", item.into()));
        }
        if let Some(qty) = self.qty {
            fields.push(("qty", qty.into()));
        }
        if let Some(unit) = self.unit {
            fields.push(("unit", unit.into()));
        }
        if let Some(batch_number) = self.batch_number {
            fields.push(("batch_number", batch_number.into()));
        }
        if let Some(packed_qty) = self.packed_qty {
            fields.push(("packed_qty", packed_qty.into()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;

    use khata_core::Quantity;

    use super::*;
    use crate::schema;
    use crate::store::EntityStore;

    async fn store() -> EntityStore<Production> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::reconcile(&pool).await.unwrap();
        EntityStore::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_pack_progress() {
        let store = store().await;

        let run = store
            .create(NewProduction {
                date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                item: "Bread".to_string(),
                qty: Quantity::from_whole(200),
                unit: "pcs".to_string(),
                batch_number: Some("B-2026-04-01".to_string()),
                packed_qty: Quantity::zero(),
            })
            .await
            .unwrap();
        assert!(run.packed_qty.milli() == 0);

        // Packing progresses through the day without touching qty.
        let updated = store
            .update(
                &run.id,
                ProductionPatch {
                    packed_qty: Some(Quantity::from_whole(120)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.packed_qty, Quantity::from_whole(120));
        assert_eq!(updated.qty, Quantity::from_whole(200));
        assert_eq!(updated.batch_number.as_deref(), Some("B-2026-04-01"));
    }
}
