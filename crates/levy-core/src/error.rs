//! # Error Types
//!
//! Domain-specific error types for levy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  levy-core errors (this file)                                          │
//! │  ├── TaxError          - What `calculate` returns                      │
//! │  │   ├── ResolutionError  - Address / directory lookup unusable        │
//! │  │   └── StrategyError    - A rate's calculator failed for an item     │
//! │  └── ValidationError   - Rate table / input validation failures        │
//! │                                                                         │
//! │  levy-directory errors (separate crate)                                │
//! │  └── DirectoryError    - Rate table loading failures                   │
//! │                                                                         │
//! │  Flow: StrategyError → TaxError → anyhow (CLI) → stderr                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Zero Tax Is Not An Error
//! No matching rates, no zip-restricted zones, no category match: all of
//! these produce an empty `ItemTax` list. Only unusable lookups and failing
//! calculators are errors.

use thiserror::Error;

// =============================================================================
// Tax Error
// =============================================================================

/// Errors returned by [`TaxResolver::calculate`](crate::resolver::TaxResolver::calculate).
///
/// Any error aborts the whole order: no partial tax results are returned.
#[derive(Debug, Error)]
pub enum TaxError {
    /// The tax address or a directory lookup was unusable.
    #[error("Tax resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// A calculation strategy failed for one (item, rate) pair, or the
    /// order's totals don't fit.
    #[error("Tax calculation failed: {0}")]
    Strategy(#[from] StrategyError),
}

// =============================================================================
// Resolution Error
// =============================================================================

/// The rate or zone directory could not answer a lookup.
///
/// ## When This Occurs
/// - The directory rejects the order's tax address as malformed
/// - The directory backend is unavailable
/// - A candidate rate points at a zone the directory doesn't know
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The directory rejected the address.
    #[error("Malformed tax address: {reason}")]
    MalformedAddress { reason: String },

    /// The directory could not be reached or failed internally.
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// A rate references a zone that the zone directory cannot find.
    #[error("Zone {zone_id} referenced by tax rate {rate_id} not found")]
    ZoneNotFound { zone_id: String, rate_id: String },
}

// =============================================================================
// Strategy Error
// =============================================================================

/// A rate's calculation strategy failed for a specific item, or the
/// order's totals could not be represented.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Intermediate or final amount does not fit in `Money`.
    #[error("Tax amount overflow for item {item_id} with rate {rate_id}")]
    Overflow { item_id: String, rate_id: String },

    /// Every item amount fits, but an order total or per-rate total doesn't.
    #[error("Tax totals overflow for order {order_id}")]
    TotalOverflow { order_id: String },

    /// The rate value cannot be used by its strategy.
    ///
    /// ## When This Occurs
    /// - A price-included percentage rate at or below -100%
    #[error("Tax rate {rate_id} cannot be applied: {reason}")]
    InvalidRate { rate_id: String, reason: String },

    /// A fixed-amount rate is configured in a different currency.
    #[error("Tax rate {rate_id} is in {rate_currency}, order is in {order_currency}")]
    CurrencyMismatch {
        rate_id: String,
        rate_currency: String,
        order_currency: String,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while loading rate tables and checking orders, before any
/// tax is calculated.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., country code, zip code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate line item id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with TaxError.
pub type TaxResult<T> = Result<T, TaxError>;

// =============================================================================
// Unit Tests
// =============================================================================
