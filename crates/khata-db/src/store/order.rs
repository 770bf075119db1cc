//! Order persistence.
//!
//! Orders are booked for later delivery, so unlike sales they default to
//! `not_paid`. The due date must not precede the booking date.

use chrono::Utc;

use khata_core::validation::validate_order_dates;
use khata_core::{Money, NewOrder, Order, OrderPatch, PaymentStatus, ValidationError};

use super::{new_id, EntityStore, HardDelete, PatchFields, Record};
use crate::error::DbResult;
use crate::update::SqlValue;

impl Record for Order {
    const ENTITY: &'static str = "Order";
    const TABLE: &'static str = "orders";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "id",
        "booking_date",
        "due_date",
        "customer_id",
        "status",
        "discount",
        "total",
        "payment_status",
        "amount_received",
        "items",
        "created_at",
    ];
    const ORDER_BY: &'static str = "booking_date DESC, rowid DESC";

    type New = NewOrder;
    type Patch = OrderPatch;

    fn validate(new: &NewOrder) -> Result<(), ValidationError> {
        validate_order_dates(new.booking_date, new.due_date)
    }

    fn from_new(new: NewOrder) -> Self {
        let payment_status = new.payment_status.unwrap_or(PaymentStatus::NotPaid);
        let amount_received = new.amount_received.unwrap_or(match payment_status {
            PaymentStatus::Paid => new.total,
            PaymentStatus::NotPaid => Money::zero(),
        });

        Order {
            id: new_id(),
            booking_date: new.booking_date,
            due_date: new.due_date,
            customer_id: new.customer_id,
            status: new.status.unwrap_or_else(|| "pending".to_string()),
            discount: new.discount,
            total: new.total,
            payment_status,
            amount_received,
            items: new.items,
            created_at: Utc::now(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn bind_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.as_str().into(),
            self.booking_date.into(),
            self.due_date.into(),
            self.customer_id.as_str().into(),
            self.status.as_str().into(),
            self.discount.into(),
            self.total.into(),
            self.payment_status.into(),
            self.amount_received.into(),
            (&self.items).into(),
            self.created_at.into(),
        ]
    }
}

impl HardDelete for Order {}

impl PatchFields for OrderPatch {
    fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(booking_date) = self.booking_date {
            fields.push(("booking_date", booking_date.into()));
        }
        if let Some(due_date) = self.due_date {
            fields.push(("due_date", due_date.into()));
        }
        if let Some(customer_id) = self.customer_id {
            fields.push(("customer_id", customer_id.into()));
        }
        if let Some(status) = self.status {
            fields.push(("status", status.into()));
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
        fields
    }
}

impl EntityStore<Order> {
    /// Unpaid orders for one customer, oldest booking first.
    pub async fn unpaid_for_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders
             WHERE customer_id = ? AND payment_status = 'not_paid'
             ORDER BY booking_date ASC, rowid ASC",
        )
        .bind(customer_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
