//! # Validation Module
//!
//! Input validation utilities for the ledger core.
//!
//! ## Validation Strategy
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                           │
//! │                                                                  │
//! │  Layer 1: HTTP handler (outside this workspace)                  │
//! │  └── Shape checks, auth, request parsing                         │
//! │           │                                                      │
//! │           ▼                                                      │
//! │  Layer 2: THIS MODULE - business rule validation                 │
//! │           │                                                      │
//! │           ▼                                                      │
//! │  Layer 3: Database (SQLite)                                      │
//! │  ├── NOT NULL constraints                                        │
//! │  ├── Partial unique index (active product names)                 │
//! │  └── Foreign key constraints                                     │
//! │                                                                  │
//! │  Defense in depth: multiple layers catch different errors        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (customer, product, employee).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a required free-form field such as an expense category or a
/// production item name.
pub fn validate_required(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates that an order's due date does not precede its booking date.
///
/// Application invariant; the schema does not enforce it.
pub fn validate_order_dates(booking_date: NaiveDate, due_date: NaiveDate) -> ValidationResult<()> {
    if due_date < booking_date {
        return Err(ValidationError::InvalidFormat {
            field: "dueDate".to_string(),
            reason: format!("must not precede booking date {}", booking_date),
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use khata_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
