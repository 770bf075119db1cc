//! Customer persistence.
//!
//! Customers are referenced by sales and orders via foreign key; deleting a
//! customer with history fails on the constraint, which callers surface
//! as-is.

use chrono::Utc;

use khata_core::validation::validate_name;
use khata_core::{Customer, CustomerPatch, NewCustomer, ValidationError};

use super::{new_id, HardDelete, PatchFields, Record};
use crate::update::SqlValue;

impl Record for Customer {
    const ENTITY: &'static str = "Customer";
    const TABLE: &'static str = "customers";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["id", "name", "mobile", "place", "created_at"];
    const ORDER_BY: &'static str = "name ASC";

    type New = NewCustomer;
    type Patch = CustomerPatch;

    fn validate(new: &NewCustomer) -> Result<(), ValidationError> {
        validate_name(&new.name)
    }

    fn from_new(new: NewCustomer) -> Self {
        Customer {
            id: new_id(),
            name: new.name,
            mobile: new.mobile,
            place: new.place,
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
            self.mobile.clone().into(),
            self.place.clone().into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for Customer {}

impl PatchFields for CustomerPatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(name) = self.name {
            fields.push(("name", name.into()));
        }
        if let Some(mobile) = self.mobile {
            fields.push(("mobile", mobile.into()));
        }
        if let Some(place) = self.place {
            fields.push(("place", place.into()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use super::*;
    use crate::error::DbError;
    use crate::schema;
    use crate::store::EntityStore;

    async fn store() -> EntityStore<Customer> {
        let pool: SqlitePool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::reconcile(&pool).await.unwrap();
        EntityStore::new(pool)
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_roundtrips() {
        let store = store().await;

        let created = store
            .create(NewCustomer {
                name: "Asif Traders".to_string(),
                mobile: Some("0301-1234567".to_string()),
                place: None,
            })
            .await
            .unwrap();
        assert!(!created.id.is_empty());

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Asif Traders");
        assert_eq!(fetched.mobile.as_deref(), Some("0301-1234567"));
        assert!(fetched.place.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let store = store().await;

        let err = store
            .create(NewCustomer {
                name: "   ".to_string(),
                mobile: None,
                place: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_touches_only_supplied_fields() {
        let store = store().await;
        let created = store
            .create(NewCustomer {
                name: "Bilal".to_string(),
                mobile: Some("0300-0000000".to_string()),
                place: Some("Lahore".to_string()),
            })
            .await
            .unwrap();

        let updated = store
            .update(
                &created.id,
                CustomerPatch {
                    place: Some("Karachi".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.place.as_deref(), Some("Karachi"));
        // Untouched fields keep their values.
        assert_eq!(updated.name, "Bilal");
        assert_eq!(updated.mobile.as_deref(), Some("0300-0000000"));
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        let store = store().await;
        let created = store
            .create(NewCustomer {
                name: "Bilal".to_string(),
                mobile: None,
                place: None,
            })
            .await
            .unwrap();

        let err = store
            .update(&created.id, CustomerPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No valid fields to update");
    }

    #[tokio::test]
    async fn test_update_and_delete_absent_id_return_none() {
        let store = store().await;

        let updated = store
            .update(
                "missing",
                CustomerPatch {
                    name: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_none());

        let removed = store.delete("missing").await.unwrap();
        assert!(removed.is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_removed_row() {
        let store = store().await;
        let created = store
            .create(NewCustomer {
                name: "Temp".to_string(),
                mobile: None,
                place: None,
            })
            .await
            .unwrap();

        let removed = store.delete(&created.id).await.unwrap().unwrap();
        assert_eq!(removed.id, created.id);
        assert!(store.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let store = store().await;
        for name in ["Zain", "Ahmed", "Maryam"] {
            store
                .create(NewCustomer {
                    name: name.to_string(),
                    mobile: None,
                    place: None,
                })
                .await
                .unwrap();
        }

        let all = store.list_all().await.unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ahmed", "Maryam", "Zain"]);
    }
}
