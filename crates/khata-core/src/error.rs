//! # Error Types
//!
//! Domain-specific error types for khata-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Error Types                              │
//! │                                                                  │
//! │  khata-core errors (this file)                                   │
//! │  └── ValidationError  - Input validation failures                │
//! │                                                                  │
//! │  khata-db errors (separate crate)                                │
//! │  └── DbError          - Database operation failures              │
//! │                                                                  │
//! │  Flow: ValidationError → DbError::Validation → HTTP layer        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity, field, id)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before persistence runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A partial update arrived with no recognized fields.
    ///
    /// Silently returning the unmodified row would mask client bugs,
    /// so an empty field set is a caller error.
    #[error("No valid fields to update")]
    NoFieldsToUpdate,
}

// =============================================================================
// Unit Tests
// =============================================================================
