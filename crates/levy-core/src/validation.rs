//! # Validation Module
//!
//! Input validation for rate tables and orders.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Types and required fields                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Rate tables, when levy-directory loads them                       │
//! │  └── Orders, before the CLI hands them to the resolver                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculation                                                  │
//! │  └── Overflow and currency checks inside the strategies                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolver itself never calls these: an unvalidated order still
//! calculates, and the strategies guard their own arithmetic.
//!
//! ## Usage
//! ```rust
//! use levy_core::validation::{validate_country_iso, validate_zipcode};
//!
//! assert!(validate_country_iso("US").is_ok());
//! assert!(validate_zipcode("90210").is_ok());
//! assert!(validate_zipcode("").is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::rate::{CalculationStrategy, TaxRate};
use crate::types::{Order, TaxAddress, Zone, ZoneMember};
use crate::{MAX_ITEM_QUANTITY, MAX_RATE_BPS, MIN_RATE_BPS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an identifier (rate, zone, category, item, order ids).
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
/// - Letters, digits, `-`, `_`, `.`, `:` only
pub fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, '-', '_', '.' and ':'".to_string(),
        });
    }

    Ok(())
}

/// Validates an ISO 3166-1 alpha-2 country code (case-insensitive).
pub fn validate_country_iso(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "country_iso".to_string(),
        });
    }

    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "country_iso".to_string(),
            reason: format!("'{}' is not a two-letter country code", code),
        });
    }

    Ok(())
}

/// Validates an ISO 4217 currency code (case-insensitive).
pub fn validate_currency(code: &str) -> ValidationResult<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: format!("'{}' is not a three-letter currency code", code),
        });
    }

    Ok(())
}

/// Validates a postal code.
///
/// ## Rules
/// - 1 to 10 characters after trimming
/// - ASCII letters, digits, spaces and hyphens
pub fn validate_zipcode(zipcode: &str) -> ValidationResult<()> {
    let zipcode = zipcode.trim();

    if zipcode.is_empty() {
        return Err(ValidationError::Required {
            field: "zipcode".to_string(),
        });
    }

    if zipcode.len() > 10 {
        return Err(ValidationError::TooLong {
            field: "zipcode".to_string(),
            max: 10,
        });
    }

    if !zipcode
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "zipcode".to_string(),
            reason: "must contain only letters, digits, spaces and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax address as the directory expects it.
pub fn validate_tax_address(address: &TaxAddress) -> ValidationResult<()> {
    validate_country_iso(&address.country_iso)?;
    if let Some(zipcode) = &address.zipcode {
        validate_zipcode(zipcode)?;
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a rate value: -100% to 1000%.
pub fn validate_rate_bps(bps: i32) -> ValidationResult<()> {
    if !(MIN_RATE_BPS..=MAX_RATE_BPS).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "rate_bps".to_string(),
            min: MIN_RATE_BPS as i64,
            max: MAX_RATE_BPS as i64,
        });
    }
    Ok(())
}

/// Validates an item quantity (1 to `MAX_ITEM_QUANTITY`).
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

fn validate_non_negative(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a zone definition.
pub fn validate_zone(zone: &Zone) -> ValidationResult<()> {
    validate_id("zone.id", &zone.id)?;

    for member in &zone.members {
        match member {
            ZoneMember::Country { country_iso } => validate_country_iso(country_iso)?,
            ZoneMember::State {
                country_iso,
                state_abbr,
            } => {
                validate_country_iso(country_iso)?;
                if state_abbr.trim().is_empty() {
                    return Err(ValidationError::Required {
                        field: "state_abbr".to_string(),
                    });
                }
            }
        }
    }

    for zipcode in &zone.zipcodes {
        validate_zipcode(zipcode)?;
    }

    Ok(())
}

/// Validates a tax rate definition.
///
/// Zone references are checked by the directory, which knows the zones.
pub fn validate_tax_rate(rate: &TaxRate) -> ValidationResult<()> {
    validate_id("rate.id", &rate.id)?;
    validate_id("rate.zone_id", &rate.zone_id)?;
    validate_rate_bps(rate.rate_bps)?;

    for category in &rate.tax_category_ids {
        validate_id("rate.tax_category_ids", category)?;
    }

    match &rate.calculator {
        CalculationStrategy::Percentage => {}
        CalculationStrategy::FlatRate { currency, .. }
        | CalculationStrategy::PerUnit { currency, .. } => validate_currency(currency)?,
    }

    if let (Some(start), Some(end)) = (rate.starts_at, rate.expires_at) {
        if start >= end {
            return Err(ValidationError::InvalidFormat {
                field: "rate.expires_at".to_string(),
                reason: "must be after starts_at".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates an order before calculation.
///
/// ## Rules
/// - Order id, currency and (if present) tax address are well-formed
/// - Item ids are valid and unique across line items and shipments
/// - Quantities within range, prices and costs not negative
pub fn validate_order(order: &Order) -> ValidationResult<()> {
    validate_id("order.id", &order.id)?;
    validate_currency(&order.currency)?;
    if let Some(address) = &order.tax_address {
        validate_tax_address(address)?;
    }

    let mut seen = HashSet::new();
    let item_ids = order
        .line_items
        .iter()
        .map(|li| li.id.as_str())
        .chain(order.shipments.iter().map(|s| s.id.as_str()));
    for id in item_ids {
        validate_id("item.id", id)?;
        if !seen.insert(id) {
            return Err(ValidationError::Duplicate {
                field: "item.id".to_string(),
                value: id.to_string(),
            });
        }
    }

    for line_item in &order.line_items {
        validate_quantity(line_item.quantity)?;
        validate_non_negative("line_item.price_cents", line_item.price_cents)?;
    }
    for shipment in &order.shipments {
        validate_non_negative("shipment.cost_cents", shipment.cost_cents)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
