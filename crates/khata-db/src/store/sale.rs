//! Sale persistence.
//!
//! Creation defaults: a sale with no explicit payment status is `paid`
//! (counter sales are the common case), and a paid sale with no explicit
//! `amount_received` is considered received in full. A `not_paid` sale
//! starts with whatever partial amount the caller recorded, defaulting to
//! zero.

use chrono::Utc;

use khata_core::{Money, NewSale, PaymentStatus, Sale, SalePatch};

use super::{new_id, EntityStore, HardDelete, PatchFields, Record};
use crate::error::DbResult;
use crate::update::SqlValue;

impl Record for Sale {
    const ENTITY: &'static str = "Sale";
    const TABLE: &'static str = "sales";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "id",
        "date",
        "customer_id",
        "discount",
        "total",
        "payment_status",
        "amount_received",
        "items",
        "buy_type",
        "created_at",
    ];
    const ORDER_BY: &'static str = "date DESC, rowid DESC";

    type New = NewSale;
    type Patch = SalePatch;

    fn from_new(new: NewSale) -> Self {
        let payment_status = new.payment_status.unwrap_or(PaymentStatus::Paid);
        let amount_received = new.amount_received.unwrap_or(match payment_status {
            PaymentStatus::Paid => new.total,
            PaymentStatus::NotPaid => Money::zero(),
        });

        Sale {
            id: new_id(),
            date: new.date,
            customer_id: new.customer_id,
            discount: new.discount,
            total: new.total,
            payment_status,
            amount_received,
            items: new.items,
            buy_type: new.buy_type.unwrap_or_else(|| "retail".to_string()),
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
            self.customer_id.as_str().into(),
            self.discount.into(),
            self.total.into(),
            self.payment_status.into(),
            self.amount_received.into(),
            (&self.items).into(),
            self.buy_type.as_str().into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for Sale {}

impl PatchFields for SalePatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(date) = self.date {
            fields.push(("date", date.into()));
        }
        if let Some(customer_id) = self.customer_id {
            fields.push(("customer_id", customer_id.into()));
        }
        if let Some(discount) = self.discount {
            fields.push(("discount", discount.into()));
        }
        if let Some(total) = self.total {
            fields.push(("total", total.into()));
        }
        if let Some(payment_status) = self.payment_status {
            fields.push(("payment_status", payment_status.into()));
        }
        if let Some(amount_received) = self.amount_received {
            fields.push(("amount_received", amount_received.into()));
        }
        if let Some(items) = self.items {
            fields.push(("items", items.into()));
        }
        if let Some(buy_type) = self.buy_type {
            fields.push(("buy_type", buy_type.into()));
        }
        fields
    }
}

impl EntityStore<Sale> {
    /// Unpaid sales for one customer, oldest booking first.
    ///
    /// Insertion order (rowid) is the settlement order within a day.
    pub async fn unpaid_for_customer(&self, customer_id: &str) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales
             WHERE customer_id = ? AND payment_status = 'not_paid'
             ORDER BY date ASC, rowid ASC",
        )
        .bind(customer_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
