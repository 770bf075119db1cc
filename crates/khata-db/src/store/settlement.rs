//! # Payment Settlement
//!
//! Persistence side of payment allocation: loads a customer's unpaid bills,
//! runs the pure allocator, and writes the per-bill results back through
//! the partial-update path.
//!
//! ## Settlement Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │            settle(customer, received amount)                     │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  validate amount (must be positive)                              │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  load unpaid sales (oldest first), then unpaid orders            │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  allocate() - pure, in khata-core                                │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  per touched bill: UPDATE amount_received + payment_status       │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  SettlementSummary { allocations, remaining }                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use khata_core::{
    allocate, validate_received_amount, BillAllocation, BillKind, Money, Order, OutstandingBill,
    Sale,
};

use crate::error::{DbError, DbResult};
use crate::store::EntityStore;

/// Outcome of one settlement, reported to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    pub customer_id: String,
    /// Bills actually touched by this settlement, in consumption order.
    pub allocations: Vec<BillAllocation>,
    /// Unallocated remainder (overpayment beyond all balances).
    pub remaining: Money,
}

/// Applies received payments to a customer's outstanding bills.
#[derive(Clone)]
pub struct Settlement {
    sales: EntityStore<Sale>,
    orders: EntityStore<Order>,
}

impl Settlement {
    pub fn new(pool: SqlitePool) -> Self {
        Settlement {
            sales: EntityStore::new(pool.clone()),
            orders: EntityStore::new(pool),
        }
    }

    /// Distributes a received amount across the customer's unpaid bills:
    /// sales oldest-first, then orders oldest-first.
    ///
    /// Bills the allocation did not reach are left untouched. An amount
    /// exceeding all balances settles everything and reports the surplus
    /// as `remaining`.
    ///
    /// ## Errors
    /// - [`ValidationError::MustBePositive`] for a zero or negative amount
    /// - Absence of unpaid bills is not an error: every rupee comes back
    ///   in `remaining`
    ///
    /// [`ValidationError::MustBePositive`]: khata_core::ValidationError::MustBePositive
    pub async fn settle(&self, customer_id: &str, amount: Money) -> DbResult<SettlementSummary> {
        validate_received_amount(amount)?;

        let mut bills = Vec::new();
        for sale in self.sales.unpaid_for_customer(customer_id).await? {
            bills.push(OutstandingBill {
                id: sale.id,
                kind: BillKind::Sale,
                total: sale.total,
                amount_received: sale.amount_received,
            });
        }
        for order in self.orders.unpaid_for_customer(customer_id).await? {
            bills.push(OutstandingBill {
                id: order.id,
                kind: BillKind::Order,
                total: order.total,
                amount_received: order.amount_received,
            });
        }

        let outcome = allocate(&bills, amount);

        let mut applied = Vec::new();
        for allocation in outcome.allocations {
            if allocation.applied.is_zero() {
                continue;
            }
            self.persist(&allocation).await?;
            applied.push(allocation);
        }

        info!(
            customer_id,
            received = amount.paise(),
            bills_touched = applied.len(),
            remaining = outcome.remaining.paise(),
            "Settled payment"
        );

        Ok(SettlementSummary {
            customer_id: customer_id.to_string(),
            allocations: applied,
            remaining: outcome.remaining,
        })
    }

    /// Marks one sale fully paid regardless of its current balance.
    pub async fn mark_sale_paid(&self, id: &str) -> DbResult<Option<Sale>> {
        let updated = sqlx::query_as::<_, Sale>(
            "UPDATE sales SET amount_received = total, payment_status = 'paid'
             WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(self.sales.pool())
        .await?;
        Ok(updated)
    }

    /// Marks one order fully paid regardless of its current balance.
    pub async fn mark_order_paid(&self, id: &str) -> DbResult<Option<Order>> {
        let updated = sqlx::query_as::<_, Order>(
            "UPDATE orders SET amount_received = total, payment_status = 'paid'
             WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(self.orders.pool())
        .await?;
        Ok(updated)
    }

    /// Writes one allocation result to its bill's row.
    async fn persist(&self, allocation: &BillAllocation) -> DbResult<()> {
        let sql = match allocation.kind {
            BillKind::Sale => {
                "UPDATE sales SET amount_received = ?, payment_status = ? WHERE id = ?"
            }
            BillKind::Order => {
                "UPDATE orders SET amount_received = ?, payment_status = ? WHERE id = ?"
            }
        };

        let result = sqlx::query(sql)
            .bind(allocation.new_amount_received)
            .bind(allocation.new_status)
            .bind(&allocation.bill_id)
            .execute(self.sales.pool())
            .await?;

        // The bill was loaded inside this settlement; its disappearance
        // means a concurrent delete and the settlement must fail loudly
        // rather than drop part of the payment.
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", &allocation.bill_id));
        }
        Ok(())
    }
}
