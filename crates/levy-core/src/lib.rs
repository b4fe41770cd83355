//! # levy-core: Pure Tax Resolution for Levy
//!
//! This crate decides which tax rates apply to each item of an order and
//! computes the resulting tax breakdown. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Levy Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    levy-cli (apps/levy-cli)                     │   │
//! │  │        read order JSON ──► calculate ──► print OrderTax         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ levy-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │ resolver  │  │ selector  │  │ calculator │  │   rate    │  │   │
//! │  │   │ enumerate │─►│ zip rule  │─►│  ItemTax   │◄─│ strategy  │  │   │
//! │  │   │ aggregate │  │ category  │  │            │  │  label    │  │   │
//! │  │   └───────────┘  └─────┬─────┘  └────────────┘  └───────────┘  │   │
//! │  │                        │ RateDirectory / ZoneDirectory traits   │   │
//! │  └────────────────────────┼────────────────────────────────────────┘   │
//! │                           │                                             │
//! │  ┌────────────────────────▼────────────────────────────────────────┐   │
//! │  │            levy-directory (rate tables, zone matching)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Orders, items, addresses, zones
//! - [`rate`] - Tax rates and their calculation strategies
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`directory`] - Lookup traits the environment implements
//! - [`selector`] - Rate selection (zip specificity, activity, category)
//! - [`calculator`] - One (item, rate) pair to one `ItemTax`
//! - [`resolver`] - Item enumeration and `OrderTax` aggregation
//! - [`tax`] - Result value objects
//! - [`validation`] - Rate table and order checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use levy_core::{Order, TaxResolver};
//!
//! let resolver = TaxResolver::new(&directory, &directory);
//! let order_tax = resolver.calculate(&order)?;
//!
//! for tax in order_tax.iter() {
//!     println!("{}: {} {}", tax.item_id, tax.label, tax.amount());
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod directory;
pub mod error;
pub mod money;
pub mod rate;
pub mod resolver;
pub mod selector;
pub mod tax;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use directory::{RateDirectory, ZoneDirectory};
pub use error::{ResolutionError, StrategyError, TaxError, TaxResult, ValidationError};
pub use money::Money;
pub use rate::{CalculationStrategy, TaxRate};
pub use resolver::{BatchOutcome, TaxResolver};
pub use selector::RateSelector;
pub use tax::{ItemTax, OrderTax, RateSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item accepted by order validation.
pub const MAX_ITEM_QUANTITY: i64 = 100_000;

/// Lowest rate a rate table may configure (-100%).
pub const MIN_RATE_BPS: i32 = -10_000;

/// Highest rate a rate table may configure (1000%).
pub const MAX_RATE_BPS: i32 = 100_000;
