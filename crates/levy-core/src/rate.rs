//! # Tax Rates
//!
//! A [`TaxRate`] binds a rate value to a zone and a set of tax categories,
//! and owns the [`CalculationStrategy`] that turns an item into an amount.
//!
//! ## Strategy Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rate.compute_amount(item)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  match rate.calculator                                                  │
//! │   ├── Percentage ──► included_in_price?                                 │
//! │   │                   ├── no:  amount × rate                            │
//! │   │                   └── yes: amount × rate / (1 + rate)               │
//! │   ├── FlatRate ────► fixed amount per item                              │
//! │   └── PerUnit ─────► fixed amount × quantity                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The variant set is closed: a strategy is chosen when the rate is built
//! (or deserialized) and never looked up at calculation time.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::StrategyError;
use crate::money::Money;
use crate::types::{BasisPoints, TaxableItem};

fn default_true() -> bool {
    true
}

// =============================================================================
// Calculation Strategy
// =============================================================================

/// How a tax rate turns an item into a tax amount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationStrategy {
    /// Percentage of the item's taxable amount, using the rate's `rate_bps`.
    #[default]
    Percentage,

    /// A fixed amount for every matching item.
    FlatRate { amount_cents: i64, currency: String },

    /// A fixed amount for every unit of a matching item.
    PerUnit { amount_cents: i64, currency: String },
}

impl CalculationStrategy {
    /// Computes the tax for one item under `rate`.
    pub fn compute_amount(&self, rate: &TaxRate, item: &TaxableItem<'_>) -> Result<Money, StrategyError> {
        let overflow = || StrategyError::Overflow {
            item_id: item.id.to_string(),
            rate_id: rate.id.clone(),
        };

        match self {
            CalculationStrategy::Percentage => {
                let base = item.taxable_amount().ok_or_else(overflow)?;
                if rate.included_in_price {
                    if rate.rate_bps <= -10_000 {
                        return Err(StrategyError::InvalidRate {
                            rate_id: rate.id.clone(),
                            reason: format!(
                                "included rate {} leaves no net price",
                                rate.rate()
                            ),
                        });
                    }
                    base.included_portion(rate.rate()).ok_or_else(overflow)
                } else {
                    base.apply_rate(rate.rate()).ok_or_else(overflow)
                }
            }
            CalculationStrategy::FlatRate {
                amount_cents,
                currency,
            } => {
                ensure_currency(rate, currency, item)?;
                Ok(Money::from_cents(*amount_cents))
            }
            CalculationStrategy::PerUnit {
                amount_cents,
                currency,
            } => {
                ensure_currency(rate, currency, item)?;
                Money::from_cents(*amount_cents)
                    .checked_mul(item.quantity)
                    .ok_or_else(overflow)
            }
        }
    }

    /// Builds the human-readable adjustment label.
    ///
    /// ## Format
    /// ```text
    /// Percentage:  "{name} {rate}"          e.g. "CA Sales Tax 7.25%"
    /// Fixed:       "{name} {amount} {ccy}"  e.g. "Eco fee 1.00 EUR"
    /// + " (Included in Price)"  when included_in_price
    /// + " (Refund)"             when the computed amount is negative
    /// ```
    /// The rate part is omitted when `show_rate_in_label` is false.
    pub fn adjustment_label(&self, rate: &TaxRate, amount: Money) -> String {
        let mut label = rate.display_name();

        if rate.show_rate_in_label {
            let shown = match self {
                CalculationStrategy::Percentage => rate.rate().to_string(),
                CalculationStrategy::FlatRate {
                    amount_cents,
                    currency,
                }
                | CalculationStrategy::PerUnit {
                    amount_cents,
                    currency,
                } => format!("{} {}", Money::from_cents(*amount_cents), currency),
            };
            label.push(' ');
            label.push_str(&shown);
        }

        if rate.included_in_price {
            label.push_str(" (Included in Price)");
        }
        if amount.is_negative() {
            label.push_str(" (Refund)");
        }

        label
    }
}

fn ensure_currency(rate: &TaxRate, currency: &str, item: &TaxableItem<'_>) -> Result<(), StrategyError> {
    if currency.eq_ignore_ascii_case(item.order.currency) {
        Ok(())
    } else {
        Err(StrategyError::CurrencyMismatch {
            rate_id: rate.id.clone(),
            rate_currency: currency.to_string(),
            order_currency: item.order.currency.to_string(),
        })
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// A configured tax rate.
///
/// ## Applicability
/// A rate applies to an item when:
/// 1. its zone matched the order's tax address (the directory decides),
/// 2. it is active on the order's tax date, and
/// 3. its category set contains the item's tax category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate {
    pub id: String,

    /// Display name used in labels; falls back to the category ids.
    #[serde(default)]
    pub name: Option<String>,

    pub zone_id: String,

    #[serde(default)]
    #[ts(as = "Vec<String>")]
    pub tax_category_ids: BTreeSet<String>,

    #[serde(default = "default_true")]
    pub active: bool,

    /// Rate value in basis points (825 = 8.25%).
    #[serde(default)]
    pub rate_bps: i32,

    /// Tax is already part of the item price (VAT style).
    #[serde(default)]
    pub included_in_price: bool,

    #[serde(default = "default_true")]
    pub show_rate_in_label: bool,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub starts_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub calculator: CalculationStrategy,
}

impl TaxRate {
    /// Creates an active percentage rate.
    pub fn new(id: impl Into<String>, zone_id: impl Into<String>, rate_bps: i32) -> Self {
        TaxRate {
            id: id.into(),
            name: None,
            zone_id: zone_id.into(),
            tax_category_ids: BTreeSet::new(),
            active: true,
            rate_bps,
            included_in_price: false,
            show_rate_in_label: true,
            starts_at: None,
            expires_at: None,
            calculator: CalculationStrategy::Percentage,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds tax categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tax_category_ids
            .extend(categories.into_iter().map(Into::into));
        self
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Marks the rate as included in the item price.
    pub fn included(mut self) -> Self {
        self.included_in_price = true;
        self
    }

    /// Replaces the calculation strategy.
    pub fn with_calculator(mut self, calculator: CalculationStrategy) -> Self {
        self.calculator = calculator;
        self
    }

    /// Returns the rate value.
    #[inline]
    pub fn rate(&self) -> BasisPoints {
        BasisPoints::from_bps(self.rate_bps)
    }

    /// True when the active flag is set and, if a date is given, the date
    /// falls inside `[starts_at, expires_at)`.
    pub fn is_active_at(&self, at: Option<DateTime<Utc>>) -> bool {
        if !self.active {
            return false;
        }
        let Some(at) = at else {
            return true;
        };
        let started = self.starts_at.map_or(true, |start| start <= at);
        let not_expired = self.expires_at.map_or(true, |end| at < end);
        started && not_expired
    }

    /// True when the rate's category set contains `category_id`.
    #[inline]
    pub fn covers_category(&self, category_id: Option<&str>) -> bool {
        category_id.is_some_and(|id| self.tax_category_ids.contains(id))
    }

    /// Name used in labels: `name`, or the category ids joined by ", ".
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .tax_category_ids
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Computes this rate's tax on `item` through its strategy.
    #[inline]
    pub fn compute_amount(&self, item: &TaxableItem<'_>) -> Result<Money, StrategyError> {
        self.calculator.compute_amount(self, item)
    }

    /// Label for an adjustment of `amount` under this rate.
    #[inline]
    pub fn adjustment_label(&self, amount: Money) -> String {
        self.calculator.adjustment_label(self, amount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
