//! # Tax Resolver
//!
//! Drives rate selection and amount computation across an order.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    calculate(order)                                     │
//! │                                                                         │
//! │  for item in line items, then shipments:                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RateDirectory::rates_for_address(order.tax_address)  ← per item        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RateSelector::select(candidates, item)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_item_tax(item, rate)  for each selected rate                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderTax { line_item_taxes, shipment_taxes }                           │
//! │                                                                         │
//! │  Any error aborts the order: no partial OrderTax is returned.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The directory is queried once per item, not once per order. Items of one
//! order currently share an address, but the lookup contract stays per item.

use tracing::{debug, warn};

use crate::calculator::compute_item_tax;
use crate::directory::{RateDirectory, ZoneDirectory};
use crate::error::{StrategyError, TaxResult};
use crate::rate::TaxRate;
use crate::selector::RateSelector;
use crate::tax::{ItemTax, OrderTax};
use crate::types::{ItemKind, Order, TaxableItem};

/// Calculates taxes for orders against a rate and zone directory.
///
/// Holds no per-calculation state, so one resolver can serve many orders
/// concurrently if its directories allow it.
///
/// ## Usage
/// ```rust,ignore
/// let directory = InMemoryDirectory::from_table(table)?;
/// let resolver = TaxResolver::new(&directory, &directory);
///
/// let order_tax = resolver.calculate(&order)?;
/// if let Some(total) = order_tax.additional_total() {
///     println!("tax: {total}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TaxResolver<R, Z> {
    rates: R,
    selector: RateSelector<Z>,
}

/// Result of one order in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub order_id: String,
    pub result: TaxResult<OrderTax>,
}

impl<R: RateDirectory, Z: ZoneDirectory> TaxResolver<R, Z> {
    /// Creates a resolver.
    pub fn new(rates: R, zones: Z) -> Self {
        TaxResolver {
            rates,
            selector: RateSelector::new(zones),
        }
    }

    /// Calculates the tax breakdown for an order.
    ///
    /// ## Errors
    /// - `TaxError::Resolution` if the directory rejects the address or a
    ///   rate's zone cannot be found
    /// - `TaxError::Strategy` if any rate fails to compute for any item, or
    ///   if the order's totals don't fit in `Money`
    ///
    /// Items that match no rate contribute nothing; that is not an error.
    pub fn calculate(&self, order: &Order) -> TaxResult<OrderTax> {
        debug!(
            order_id = %order.id,
            line_items = order.line_items.len(),
            shipments = order.shipments.len(),
            has_address = order.tax_address.is_some(),
            "Calculating order tax"
        );

        let mut order_tax = OrderTax {
            order_id: order.id.clone(),
            line_item_taxes: Vec::new(),
            shipment_taxes: Vec::new(),
        };

        for item in order.taxable_items() {
            let taxes = self.calculate_item(&item)?;
            match item.kind {
                ItemKind::LineItem => order_tax.line_item_taxes.extend(taxes),
                ItemKind::Shipment => order_tax.shipment_taxes.extend(taxes),
            }
        }

        // Each entry fits in i64, the sums across entries may not
        if !order_tax.totals_fit() {
            warn!(order_id = %order.id, "Order tax totals overflow");
            return Err(StrategyError::TotalOverflow {
                order_id: order.id.clone(),
            }
            .into());
        }

        debug!(
            order_id = %order.id,
            additional = ?order_tax.additional_total(),
            included = ?order_tax.included_total(),
            entries = order_tax.line_item_taxes.len() + order_tax.shipment_taxes.len(),
            "Order tax calculated"
        );

        Ok(order_tax)
    }

    /// Calculates many orders independently.
    ///
    /// A failing order is reported in its own outcome and doesn't affect the
    /// others, so callers can retry just the failures. Outcomes keep input
    /// order.
    pub fn calculate_batch<'o, I>(&self, orders: I) -> Vec<BatchOutcome>
    where
        I: IntoIterator<Item = &'o Order>,
    {
        orders
            .into_iter()
            .map(|order| {
                let result = self.calculate(order);
                if let Err(e) = &result {
                    warn!(order_id = %order.id, error = %e, "Order tax calculation failed");
                }
                BatchOutcome {
                    order_id: order.id.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Taxes for one item: one `ItemTax` per selected rate.
    pub fn calculate_item(&self, item: &TaxableItem<'_>) -> TaxResult<Vec<ItemTax>> {
        let rates = self.rates_for_item(item)?;
        let mut taxes = Vec::with_capacity(rates.len());
        for rate in &rates {
            taxes.push(compute_item_tax(item, rate)?);
        }
        Ok(taxes)
    }

    /// Rates that apply to one item, in selection order.
    ///
    /// An order without a tax address has no candidates.
    pub fn rates_for_item(&self, item: &TaxableItem<'_>) -> TaxResult<Vec<TaxRate>> {
        let Some(address) = item.order.tax_address else {
            debug!(
                order_id = %item.order.id,
                item_id = %item.id,
                "No tax address, item is untaxed"
            );
            return Ok(Vec::new());
        };

        let candidates = self.rates.rates_for_address(address)?;
        Ok(self.selector.select(candidates, item)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
