//! # khata-core: Pure Business Logic for the Khata Ledger
//!
//! This crate is the **heart** of the khata small-business ledger. It
//! contains the domain model and all business logic as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Khata Data Flow                             │
//! │                                                                  │
//! │  HTTP handlers (outside this workspace)                          │
//! │       │                                                          │
//! │  ┌────▼─────────────────────────────────────────────────────┐    │
//! │  │             ★ khata-core (THIS CRATE) ★                  │    │
//! │  │                                                          │    │
//! │  │  ┌─────────┐ ┌─────────┐ ┌────────────┐ ┌────────────┐   │    │
//! │  │  │  types  │ │  money  │ │ allocation │ │ validation │   │    │
//! │  │  │ Sale    │ │ Money   │ │ allocate() │ │   rules    │   │    │
//! │  │  │ Order.. │ │ Quantity│ │ mark_paid  │ │   checks   │   │    │
//! │  │  └─────────┘ └─────────┘ └────────────┘ └────────────┘   │    │
//! │  │                                                          │    │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS      │    │
//! │  └────┬─────────────────────────────────────────────────────┘    │
//! │       │                                                          │
//! │  ┌────▼────────────────────────────────────────────────────┐     │
//! │  │                khata-db (Database Layer)                │     │
//! │  │     schema reconciliation, stores, stock, settlement    │     │
//! │  └─────────────────────────────────────────────────────────┘     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Sale, Order, StockItem, ...)
//! - [`patch`] - Sparse field sets for partial updates
//! - [`money`] - Fixed-point `Money` and `Quantity` (no floating point!)
//! - [`allocation`] - Payment allocation across outstanding bills
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Numerics**: money in paise, quantities in milli-units
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod error;
pub mod money;
pub mod patch;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocation::{
    allocate, mark_fully_paid, validate_received_amount, AllocationOutcome, BillAllocation,
    BillKind, OutstandingBill,
};
pub use error::ValidationError;
pub use money::{Money, Quantity};
pub use patch::*;
pub use types::*;
