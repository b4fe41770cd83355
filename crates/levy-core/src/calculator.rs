//! # Amount Computation
//!
//! Turns one (item, rate) pair into one [`ItemTax`]. The arithmetic lives in
//! the rate's [`CalculationStrategy`](crate::rate::CalculationStrategy); this
//! module only records the result.

use crate::error::StrategyError;
use crate::rate::TaxRate;
use crate::tax::ItemTax;
use crate::types::TaxableItem;

/// Computes the tax `rate` charges on `item`.
///
/// Pure: the same item and rate always give the same `ItemTax`.
///
/// ## Example
/// ```rust
/// use levy_core::calculator::compute_item_tax;
/// use levy_core::{LineItem, Order, TaxRate};
///
/// let order = Order::new("R1").with_line_item(LineItem::new("li-1", Some("goods"), 2000, 1));
/// let item = order.line_item_views().next().unwrap();
/// let rate = TaxRate::new("gst", "au", 1000).with_name("GST");
///
/// let tax = compute_item_tax(&item, &rate).unwrap();
/// assert_eq!(tax.amount_cents, 200);
/// assert_eq!(tax.label, "GST 10%");
/// ```
pub fn compute_item_tax(item: &TaxableItem<'_>, rate: &TaxRate) -> Result<ItemTax, StrategyError> {
    let amount = rate.compute_amount(item)?;

    Ok(ItemTax {
        item_id: item.id.to_string(),
        label: rate.adjustment_label(amount),
        tax_rate: rate.clone(),
        amount_cents: amount.cents(),
        included_in_price: rate.included_in_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::CalculationStrategy;
    use crate::types::{Order, Shipment};

    #[test]
    fn test_item_tax_fields() {
        let order = Order::new("R1").with_shipment(Shipment::new("sh-1", Some("shipping"), 1000));
        let item = order.shipment_views().next().unwrap();
        let rate = TaxRate::new("vat", "eu", 2000).with_name("VAT").included();

        let tax = compute_item_tax(&item, &rate).unwrap();
        assert_eq!(tax.item_id, "sh-1");
        assert_eq!(tax.amount_cents, 167);
        assert!(tax.included_in_price);
        assert_eq!(tax.tax_rate, rate);
        assert_eq!(tax.label, "VAT 20% (Included in Price)");
    }

    #[test]
    fn test_strategy_error_propagates() {
        let order = Order::new("R1").with_shipment(Shipment::new("sh-1", None, 1000));
        let item = order.shipment_views().next().unwrap();
        let rate = TaxRate::new("eco", "eu", 0).with_calculator(CalculationStrategy::FlatRate {
            amount_cents: 50,
            currency: "GBP".to_string(),
        });

        assert!(compute_item_tax(&item, &rate).is_err());
    }
}
