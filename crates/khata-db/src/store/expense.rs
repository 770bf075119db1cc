//! Expense persistence.

use chrono::Utc;

use khata_core::validation::validate_required;
use khata_core::{Expense, ExpensePatch, NewExpense, ValidationError};

use super::{new_id, HardDelete, PatchFields, Record};
use crate::update::SqlValue;

impl Record for Expense {
    const ENTITY: &'static str = "Expense";
    const TABLE: &'static str = "expenses";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "id",
        "date",
        "category",
        "material_name",
        "unit",
        "quantity",
        "amount",
        "notes",
        "created_at",
    ];
    const ORDER_BY: &'static str = "date DESC, rowid DESC";

    type New = NewExpense;
    type Patch = ExpensePatch;

    fn validate(new: &NewExpense) -> Result<(), ValidationError> {
        validate_required("category", &new.category)
    }

    fn from_new(new: NewExpense) -> Self {
        Expense {
            id: new_id(),
            date: new.date,
            category: new.category,
            material_name: new.material_name,
            unit: new.unit,
            quantity: new.quantity,
            amount: new.amount,
            notes: new.notes,
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
            self.category.as_str().into(),
            self.material_name.clone().into(),
            self.unit.clone().into(),
            self.quantity.into(),
            self.amount.into(),
            self.notes.clone().into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for Expense {}

impl PatchFields for ExpensePatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(date) = self.date {
            fields.push(("date", date.into()));
        }
        if let Some(category) = self.category {
            fields.push(("category", category.into()));
        }
        if let Some(material_name) = self.material_name {
            fields.push(("material_name", material_name.into()));
        }
        if let Some(unit) = self.unit {
            fields.push(("unit", unit.into()));
        }
        if let Some(quantity) = self.quantity {
            fields.push(("quantity", quantity.into()));
        }
        if let Some(amount) = self.amount {
            fields.push(("amount", amount.into()));
        }
        if let Some(notes) = self.notes {
            fields.push(("notes", notes.into()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;

    use khata_core::{Money, Quantity};

    use super::*;
    use crate::error::DbError;
    use crate::schema;
    use crate::store::EntityStore;

    async fn store() -> EntityStore<Expense> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::reconcile(&pool).await.unwrap();
        EntityStore::new(pool)
    }

    fn flour_expense() -> NewExpense {
        NewExpense {
            date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            category: "raw material".to_string(),
            material_name: Some("Flour".to_string()),
            unit: Some("kg".to_string()),
            quantity: Some(Quantity::from_whole(50)),
            amount: Money::from_rupees(4200),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_material_fields_are_optional() {
        let store = store().await;

        // A plain expense with only category and amount.
        let plain = store
            .create(NewExpense {
                date: NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
                category: "transport".to_string(),
                material_name: None,
                unit: None,
                quantity: None,
                amount: Money::from_rupees(500),
                notes: Some("delivery van fuel".to_string()),
            })
            .await
            .unwrap();
        assert!(plain.material_name.is_none());
        assert!(plain.quantity.is_none());

        let material = store.create(flour_expense()).await.unwrap();
        assert_eq!(material.quantity, Some(Quantity::from_whole(50)));
    }

    #[tokio::test]
    async fn test_empty_category_is_rejected() {
        let store = store().await;
        let mut new = flour_expense();
        new.category = "  ".to_string();

        let err = store.create(new).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_amount_patch_keeps_material_fields() {
        let store = store().await;
        let created = store.create(flour_expense()).await.unwrap();

        let updated = store
            .update(
                &created.id,
                ExpensePatch {
                    amount: Some(Money::from_rupees(4350)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.amount, Money::from_rupees(4350));
        assert_eq!(updated.material_name.as_deref(), Some("Flour"));
    }
}
