//! # Payment Allocation
//!
//! Pure algorithm distributing a single received amount across a customer's
//! outstanding bills.
//!
//! ## How Allocation Works
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Payment Allocation                           │
//! │                                                                  │
//! │  Received: Rs 120          Bills (caller-supplied order):        │
//! │                                                                  │
//! │  ┌──────────┐   balance 100  → applied 100, remaining 20         │
//! │  │ Sale #1  │                                                    │
//! │  ├──────────┤   balance 50   → applied 20,  remaining 0          │
//! │  │ Sale #2  │                                                    │
//! │  ├──────────┤   balance 30   → applied 0   (remaining exhausted) │
//! │  │ Order #1 │                                                    │
//! │  └──────────┘                                                    │
//! │                                                                  │
//! │  Σ applied = min(received, Σ balances)                           │
//! │  No bill ever exceeds its total.                                 │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module has no I/O of its own. The `Settlement` service in khata-db
//! loads the bills, calls [`allocate`], and persists the result through the
//! partial-update path.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::PaymentStatus;

// =============================================================================
// Bill Inputs
// =============================================================================

/// Which table an outstanding bill lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillKind {
    Sale,
    Order,
}

/// A single unpaid bill as seen by the allocator.
///
/// Bills must be supplied in the order payments should consume them:
/// sales in insertion order, then orders in insertion order.
#[derive(Debug, Clone)]
pub struct OutstandingBill {
    pub id: String,
    pub kind: BillKind,
    pub total: Money,
    pub amount_received: Money,
}

impl OutstandingBill {
    /// Outstanding balance, never negative.
    pub fn balance(&self) -> Money {
        self.total.saturating_sub_zero(self.amount_received)
    }
}

// =============================================================================
// Allocation Output
// =============================================================================

/// The new state of one bill after allocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillAllocation {
    pub bill_id: String,
    pub kind: BillKind,
    /// Amount applied to this bill by this allocation (may be zero).
    pub applied: Money,
    pub new_amount_received: Money,
    pub new_status: PaymentStatus,
}

/// Result of distributing a received amount across bills.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOutcome {
    /// One entry per input bill, in input order.
    pub allocations: Vec<BillAllocation>,
    /// Unallocated remainder; non-zero when the received amount exceeded
    /// the sum of outstanding balances.
    pub remaining: Money,
}

impl AllocationOutcome {
    /// Total applied across all bills.
    pub fn total_applied(&self) -> Money {
        self.allocations
            .iter()
            .fold(Money::zero(), |acc, a| acc + a.applied)
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Validates a received amount before allocation runs.
///
/// Rejection is caller-level by design: [`allocate`] itself assumes a
/// positive amount.
pub fn validate_received_amount(amount: Money) -> Result<(), ValidationError> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amountReceived".to_string(),
        });
    }
    Ok(())
}

/// Distributes `received` across `bills` in their given order.
///
/// For each bill with a positive balance while any amount remains:
/// `applied = min(remaining, balance)`. A bill whose new balance reaches
/// zero transitions to `paid`; there is no transition back.
///
/// Deterministic for a given input order, and returns one allocation per
/// input bill so callers can report per-bill results positionally.
pub fn allocate(bills: &[OutstandingBill], received: Money) -> AllocationOutcome {
    debug_assert!(received.is_positive(), "caller must validate the amount");

    let mut remaining = received;
    let mut allocations = Vec::with_capacity(bills.len());

    for bill in bills {
        let balance = bill.balance();

        let applied = if remaining.is_positive() && balance.is_positive() {
            remaining.min(balance)
        } else {
            Money::zero()
        };

        let new_amount_received = bill.amount_received + applied;
        remaining -= applied;

        let new_status = if bill.total.saturating_sub_zero(new_amount_received).is_zero() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::NotPaid
        };

        allocations.push(BillAllocation {
            bill_id: bill.id.clone(),
            kind: bill.kind,
            applied,
            new_amount_received,
            new_status,
        });
    }

    AllocationOutcome {
        allocations,
        remaining,
    }
}

/// Marks a bill fully paid, bypassing allocation.
///
/// Used for explicit write-offs/confirmations: `amount_received` becomes
/// `total` and the status becomes `paid` regardless of prior state.
pub fn mark_fully_paid(bill: &OutstandingBill) -> BillAllocation {
    BillAllocation {
        bill_id: bill.id.clone(),
        kind: bill.kind,
        applied: bill.balance(),
        new_amount_received: bill.total,
        new_status: PaymentStatus::Paid,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(id: &str, kind: BillKind, total: i64, received: i64) -> OutstandingBill {
        OutstandingBill {
            id: id.to_string(),
            kind,
            total: Money::from_paise(total),
            amount_received: Money::from_paise(received),
        }
    }

    #[test]
    fn test_allocate_partial_across_bills() {
        // Balances [100, 50, 30], received 120 → applied [100, 20, 0].
        let bills = vec![
            bill("s1", BillKind::Sale, 100, 0),
            bill("s2", BillKind::Sale, 50, 0),
            bill("o1", BillKind::Order, 30, 0),
        ];

        let outcome = allocate(&bills, Money::from_paise(120));

        let applied: Vec<i64> = outcome.allocations.iter().map(|a| a.applied.paise()).collect();
        assert_eq!(applied, vec![100, 20, 0]);
        assert_eq!(outcome.remaining, Money::zero());

        assert_eq!(outcome.allocations[0].new_status, PaymentStatus::Paid);
        assert_eq!(outcome.allocations[1].new_status, PaymentStatus::NotPaid);
        assert_eq!(outcome.allocations[1].new_amount_received.paise(), 20);
        assert_eq!(outcome.allocations[2].new_status, PaymentStatus::NotPaid);
    }

    #[test]
    fn test_allocate_caps_at_sum_of_balances() {
        let bills = vec![
            bill("s1", BillKind::Sale, 100, 0),
            bill("s2", BillKind::Sale, 50, 0),
            bill("o1", BillKind::Order, 30, 0),
        ];

        let outcome = allocate(&bills, Money::from_paise(500));

        assert_eq!(outcome.total_applied().paise(), 180);
        assert_eq!(outcome.remaining.paise(), 320);
        assert!(outcome
            .allocations
            .iter()
            .all(|a| a.new_status == PaymentStatus::Paid));
    }

    #[test]
    fn test_allocate_respects_prior_received_amounts() {
        let bills = vec![
            bill("s1", BillKind::Sale, 100, 60), // balance 40
            bill("s2", BillKind::Sale, 80, 0),   // balance 80
        ];

        let outcome = allocate(&bills, Money::from_paise(100));

        assert_eq!(outcome.allocations[0].applied.paise(), 40);
        assert_eq!(outcome.allocations[0].new_amount_received.paise(), 100);
        assert_eq!(outcome.allocations[1].applied.paise(), 60);
        assert_eq!(outcome.allocations[1].new_amount_received.paise(), 60);
        assert_eq!(outcome.remaining, Money::zero());

        // No bill ever exceeds its total.
        for (a, b) in outcome.allocations.iter().zip(&bills) {
            assert!(a.new_amount_received <= b.total);
        }
    }

    #[test]
    fn test_allocate_is_deterministic_in_input_order() {
        let bills = vec![
            bill("a", BillKind::Sale, 50, 0),
            bill("b", BillKind::Sale, 50, 0),
        ];

        let first = allocate(&bills, Money::from_paise(50));
        let second = allocate(&bills, Money::from_paise(50));

        assert_eq!(first.allocations[0].applied.paise(), 50);
        assert_eq!(first.allocations[1].applied.paise(), 0);
        assert_eq!(
            first.allocations[0].applied,
            second.allocations[0].applied
        );
    }

    #[test]
    fn test_mark_fully_paid_any_prior_state() {
        for received in [0, 40, 100, 150] {
            let b = bill("s1", BillKind::Sale, 100, received);
            let a = mark_fully_paid(&b);
            assert_eq!(a.new_amount_received, b.total);
            assert_eq!(a.new_status, PaymentStatus::Paid);
        }
    }

    #[test]
    fn test_validate_received_amount() {
        assert!(validate_received_amount(Money::from_paise(1)).is_ok());
        assert!(validate_received_amount(Money::zero()).is_err());
        assert!(validate_received_amount(Money::from_paise(-5)).is_err());
    }
}
