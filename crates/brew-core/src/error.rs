//! # Error Types
//!
//! Domain-specific error types for brew-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  brew-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  brew-store errors (separate crate)                                    │
//! │  ├── StoreError       - Document store operation failures              │
//! │  └── TxnError         - Transaction commit / retry failures            │
//! │                                                                         │
//! │  brew-engine errors (separate crate)                                   │
//! │  └── SubmitError      - What the caller of submit_order sees           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SubmitError → UI notice           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ingredient name, field, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::measurement::MeasurementUnit;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two measurements cannot be combined or converted.
    ///
    /// ## When This Occurs
    /// - A recipe line is measured by mass but the ledger tracks volume
    /// - Adding `500 g` to `2 pc` during requirement consolidation
    ///
    /// Mass ↔ volume ↔ count conversions are never implicit; there is no
    /// density table in this system.
    #[error("Cannot convert {from:?} to {to:?}: incompatible quantity kinds")]
    IncompatibleUnits {
        from: MeasurementUnit,
        to: MeasurementUnit,
    },

    /// A recipe line uses a unit that cannot reach the ledger's unit.
    ///
    /// Only raised under [`UnitMismatchPolicy::FailOrder`]; the default
    /// policy skips the offending line instead.
    ///
    /// [`UnitMismatchPolicy::FailOrder`]: crate::requirements::UnitMismatchPolicy
    #[error("Recipe for '{menu_item}' measures '{ingredient}' in an incompatible unit")]
    RecipeUnitMismatch {
        menu_item: String,
        ingredient: String,
    },

    /// Insufficient stock to cover a consolidated requirement.
    ///
    /// ## When This Occurs
    /// - The ledger's available amount is less than the order needs
    /// - Another register consumed the same ingredient first
    ///
    /// ## User Workflow
    /// ```text
    /// Submit order (needs 500 ml milk)
    ///      │
    ///      ▼
    /// Ledger read: available = 300 ml
    ///      │
    ///      ▼
    /// InsufficientStock { ingredient: "Milk", available: 300.0, requested: 500.0 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient stock: Milk"
    /// ```
    /// Amounts are expressed in the ledger's own unit.
    #[error("Insufficient stock for {ingredient}: available {available}, requested {requested}")]
    InsufficientStock {
        ingredient: String,
        available: f64,
        requested: f64,
    },

    /// Order has exceeded maximum allowed line count.
    #[error("Order cannot have more than {max} lines")]
    OrderTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: u32, max: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before the fulfillment pipeline runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Discount larger than the amount it discounts.
    #[error("discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: f64, subtotal: f64 },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
