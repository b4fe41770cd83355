//! # Tax Results
//!
//! Value objects produced by one calculation: [`ItemTax`] per (item, rate)
//! pair and one [`OrderTax`] per order. They are built once and never
//! mutated; storing them (as adjustments, on a receipt, ...) is the
//! caller's business.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::rate::TaxRate;

// =============================================================================
// Item Tax
// =============================================================================

/// Tax computed for one item under one rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemTax {
    pub item_id: String,
    pub label: String,
    /// The rate that produced this amount.
    pub tax_rate: TaxRate,
    pub amount_cents: i64,
    pub included_in_price: bool,
}

impl ItemTax {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Order Tax
// =============================================================================

/// Tax breakdown for a whole order.
///
/// ## Ordering
/// `line_item_taxes` follows the order's line item order, `shipment_taxes`
/// the shipment order. Within an item, entries follow the selected rate
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTax {
    pub order_id: String,
    pub line_item_taxes: Vec<ItemTax>,
    pub shipment_taxes: Vec<ItemTax>,
}

impl OrderTax {
    /// All item taxes: line items first, then shipments.
    pub fn iter(&self) -> impl Iterator<Item = &ItemTax> {
        self.line_item_taxes.iter().chain(self.shipment_taxes.iter())
    }

    /// True when no rate applied to any item.
    pub fn is_empty(&self) -> bool {
        self.line_item_taxes.is_empty() && self.shipment_taxes.is_empty()
    }

    /// Tax added on top of prices, or `None` if the sum overflows.
    pub fn additional_total(&self) -> Option<Money> {
        Money::checked_sum(
            self.iter()
                .filter(|t| !t.included_in_price)
                .map(ItemTax::amount),
        )
    }

    /// Tax already contained in prices, or `None` if the sum overflows.
    pub fn included_total(&self) -> Option<Money> {
        Money::checked_sum(
            self.iter()
                .filter(|t| t.included_in_price)
                .map(ItemTax::amount),
        )
    }

    /// Total tax (additional and included) recorded for one item, or `None`
    /// if the sum overflows.
    pub fn total_for_item(&self, item_id: &str) -> Option<Money> {
        Money::checked_sum(
            self.iter()
                .filter(|t| t.item_id == item_id)
                .map(ItemTax::amount),
        )
    }

    /// Totals per rate, in order of first appearance. `None` if any rate's
    /// total overflows.
    pub fn summary_by_rate(&self) -> Option<Vec<RateSummary>> {
        let mut summaries: Vec<RateSummary> = Vec::new();
        for tax in self.iter() {
            match summaries.iter_mut().find(|s| s.rate_id == tax.tax_rate.id) {
                Some(summary) => {
                    summary.amount_cents = summary.amount_cents.checked_add(tax.amount_cents)?;
                    summary.item_count += 1;
                }
                None => summaries.push(RateSummary {
                    rate_id: tax.tax_rate.id.clone(),
                    name: tax.tax_rate.display_name(),
                    included_in_price: tax.included_in_price,
                    amount_cents: tax.amount_cents,
                    item_count: 1,
                }),
            }
        }
        Some(summaries)
    }

    /// Checks that every total above is representable.
    pub fn totals_fit(&self) -> bool {
        self.additional_total().is_some()
            && self.included_total().is_some()
            && self.summary_by_rate().is_some()
            && self
                .iter()
                .all(|t| self.total_for_item(&t.item_id).is_some())
    }
}

/// Aggregated tax for one rate across an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateSummary {
    pub rate_id: String,
    pub name: String,
    pub included_in_price: bool,
    pub amount_cents: i64,
    pub item_count: usize,
}

// =============================================================================
// Unit Tests
// =============================================================================
