//! Raw material ledgers: purchases, production usage, and reference prices.
//!
//! Three independent row-per-record ledgers. Purchases and usage feed the
//! raw-material side of the stock ledger at the service layer; prices are a
//! lookup table for costing.

use chrono::Utc;

use khata_core::validation::{validate_name, validate_required};
use khata_core::{
    NewRawMaterialPrice, NewRawMaterialPurchase, NewRawMaterialUsage, RawMaterialPrice,
    RawMaterialPricePatch, RawMaterialPurchase, RawMaterialPurchasePatch, RawMaterialUsage,
    RawMaterialUsagePatch, ValidationError,
};

use super::{new_id, HardDelete, PatchFields, Record};
use crate::update::SqlValue;

// =============================================================================
// Purchases
// =============================================================================

impl Record for RawMaterialPurchase {
    const ENTITY: &'static str = "RawMaterialPurchase";
    const TABLE: &'static str = "raw_material_purchases";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["id", "date", "material_name", "qty", "cost", "created_at"];
    const ORDER_BY: &'static str = "date DESC, rowid DESC";

    type New = NewRawMaterialPurchase;
    type Patch = RawMaterialPurchasePatch;

    fn validate(new: &NewRawMaterialPurchase) -> Result<(), ValidationError> {
        validate_required("materialName", &new.material_name)
    }

    fn from_new(new: NewRawMaterialPurchase) -> Self {
        RawMaterialPurchase {
            id: new_id(),
            date: new.date,
            material_name: new.material_name,
            qty: new.qty,
            cost: new.cost,
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
            self.material_name.as_str().into(),
            self.qty.into(),
            self.cost.into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for RawMaterialPurchase {}

impl PatchFields for RawMaterialPurchasePatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(date) = self.date {
            fields.push(("date", date.into()));
        }
        if let Some(material_name) = self.material_name {
            fields.push(("material_name", material_name.into()));
        }
        if let Some(qty) = self.qty {
            fields.push(("qty", qty.into()));
        }
        if let Some(cost) = self.cost {
            fields.push(("cost", cost.into()));
        }
        fields
    }
}

// =============================================================================
// Usage
// =============================================================================

impl Record for RawMaterialUsage {
    const ENTITY: &'static str = "RawMaterialUsage";
    const TABLE: &'static str = "raw_material_usage";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "id",
        "date",
        "material_name",
        "quantity_used",
        "unit",
        "notes",
        "cost",
        "created_at",
    ];
    const ORDER_BY: &'static str = "date DESC, rowid DESC";

    type New = NewRawMaterialUsage;
    type Patch = RawMaterialUsagePatch;

    fn validate(new: &NewRawMaterialUsage) -> Result<(), ValidationError> {
        validate_required("materialName", &new.material_name)
    }

    fn from_new(new: NewRawMaterialUsage) -> Self {
        RawMaterialUsage {
            id: new_id(),
            date: new.date,
            material_name: new.material_name,
            quantity_used: new.quantity_used,
            unit: new.unit,
            notes: new.notes,
            cost: new.cost,
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
            self.material_name.as_str().into(),
            self.quantity_used.into(),
            self.unit.as_str().into(),
            self.notes.clone().into(),
            self.cost.into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for RawMaterialUsage {}

impl PatchFields for RawMaterialUsagePatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(date) = self.date {
            fields.push(("date", date.into()));
        }
        if let Some(material_name) = self.material_name {
            fields.push(("material_name", material_name.into()));
        }
        if let Some(quantity_used) = self.quantity_used {
            fields.push(("quantity_used", quantity_used.into()));
        }
        if let Some(unit) = self.unit {
            fields.push(("unit", unit.into()));
        }
        if let Some(notes) = self.notes {
            fields.push(("notes", notes.into()));
        }
        if let Some(cost) = self.cost {
            fields.push(("cost", cost.into()));
        }
        fields
    }
}

// =============================================================================
// Prices
// =============================================================================

impl Record for RawMaterialPrice {
    const ENTITY: &'static str = "RawMaterialPrice";
    const TABLE: &'static str = "raw_material_prices";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["id", "name", "unit", "price_per_unit", "created_at"];
    const ORDER_BY: &'static str = "name ASC";

    type New = NewRawMaterialPrice;
    type Patch = RawMaterialPricePatch;

    fn validate(new: &NewRawMaterialPrice) -> Result<(), ValidationError> {
        validate_name(&new.name)
    }

    fn from_new(new: NewRawMaterialPrice) -> Self {
        RawMaterialPrice {
            id: new_id(),
            name: new.name,
            unit: new.unit,
            price_per_unit: new.price_per_unit,
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
            self.unit.as_str().into(),
            self.price_per_unit.into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for RawMaterialPrice {}

impl PatchFields for RawMaterialPricePatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(("name", name.into()));
        }
        if let Some(unit) = self.unit {
            fields.push(("unit", unit.into()));
        }
        if let Some(price_per_unit) = self.price_per_unit {
            fields.push(("price_per_unit", price_per_unit.into()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use khata_core::{Money, Quantity};

    use super::*;
    use crate::schema;
    use crate::store::EntityStore;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::reconcile(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_purchase_roundtrip() {
        let store = EntityStore::<RawMaterialPurchase>::new(pool().await);

        let purchase = store
            .create(NewRawMaterialPurchase {
                date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
                material_name: "Flour".to_string(),
                qty: Quantity::from_whole(100),
                cost: Money::from_rupees(8500),
            })
            .await
            .unwrap();

        let fetched = store.get(&purchase.id).await.unwrap().unwrap();
        assert_eq!(fetched.qty, Quantity::from_whole(100));
        assert_eq!(fetched.cost, Money::from_rupees(8500));
    }

    #[tokio::test]
    async fn test_usage_cost_patch() {
        let store = EntityStore::<RawMaterialUsage>::new(pool().await);

        let usage = store
            .create(NewRawMaterialUsage {
                date: NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
                material_name: "Sugar".to_string(),
                quantity_used: Quantity::from_milli(12_500),
                unit: "kg".to_string(),
                notes: None,
                cost: Money::zero(),
            })
            .await
            .unwrap();

        let costed = store
            .update(
                &usage.id,
                RawMaterialUsagePatch {
                    cost: Some(Money::from_rupees(1100)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(costed.cost, Money::from_rupees(1100));
        assert_eq!(costed.quantity_used, Quantity::from_milli(12_500));
    }

    #[tokio::test]
    async fn test_price_list_orders_by_name() {
        let store = EntityStore::<RawMaterialPrice>::new(pool().await);

        for (name, price) in [("Yeast", 45000), ("Flour", 8500), ("Sugar", 9000)] {
            store
                .create(NewRawMaterialPrice {
                    name: name.to_string(),
                    unit: "kg".to_string(),
                    price_per_unit: Money::from_paise(price),
                })
                .await
                .unwrap();
        }

        let all = store.list_all().await.unwrap();
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Flour", "Sugar", "Yeast"]);
    }
}
