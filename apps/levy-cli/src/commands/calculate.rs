//! `levy calculate`: order JSON in, tax breakdown JSON out.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{bail, Context};
use levy_core::validation::validate_order;
use levy_core::{
    BatchOutcome, Order, OrderTax, RateDirectory, RateSummary, StrategyError, TaxResolver,
    ZoneDirectory,
};
use serde::Serialize;
use tracing::{info, warn};

/// Tax breakdown for one order, with totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationReport {
    #[serde(flatten)]
    pub order_tax: OrderTax,
    pub additional_total_cents: i64,
    pub included_total_cents: i64,
    pub by_rate: Vec<RateSummary>,
}

impl TryFrom<OrderTax> for CalculationReport {
    type Error = StrategyError;

    fn try_from(order_tax: OrderTax) -> Result<Self, Self::Error> {
        let overflow = || StrategyError::TotalOverflow {
            order_id: order_tax.order_id.clone(),
        };
        let additional = order_tax.additional_total().ok_or_else(overflow)?;
        let included = order_tax.included_total().ok_or_else(overflow)?;
        let by_rate = order_tax.summary_by_rate().ok_or_else(overflow)?;

        Ok(CalculationReport {
            additional_total_cents: additional.cents(),
            included_total_cents: included.cents(),
            by_rate,
            order_tax,
        })
    }
}

/// One order of a batch run: either a report or the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CalculationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    fn failed(order_id: &str, error: String) -> Self {
        BatchEntry {
            order_id: order_id.to_string(),
            report: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<BatchOutcome> for BatchEntry {
    fn from(outcome: BatchOutcome) -> Self {
        match outcome.result {
            Ok(order_tax) => match CalculationReport::try_from(order_tax) {
                Ok(report) => BatchEntry {
                    order_id: outcome.order_id,
                    report: Some(report),
                    error: None,
                },
                Err(e) => BatchEntry::failed(&outcome.order_id, e.to_string()),
            },
            Err(e) => BatchEntry::failed(&outcome.order_id, e.to_string()),
        }
    }
}

/// Reads order JSON from a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read orders from stdin")?;
        Ok(input)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Validates and calculates a single order.
pub fn calculate_one<R, Z>(resolver: &TaxResolver<R, Z>, json: &str) -> anyhow::Result<CalculationReport>
where
    R: RateDirectory,
    Z: ZoneDirectory,
{
    let order: Order = serde_json::from_str(json).context("Invalid order JSON")?;
    validate_order(&order).with_context(|| format!("Invalid order '{}'", order.id))?;

    let order_tax = resolver
        .calculate(&order)
        .with_context(|| format!("Tax calculation failed for order '{}'", order.id))?;

    let report = CalculationReport::try_from(order_tax)?;
    info!(
        order_id = %order.id,
        additional_cents = report.additional_total_cents,
        included_cents = report.included_total_cents,
        "Order calculated"
    );
    Ok(report)
}

/// Validates and calculates an array of orders independently.
///
/// Entries keep input order. Orders failing validation are reported
/// without being calculated.
pub fn calculate_many<R, Z>(resolver: &TaxResolver<R, Z>, json: &str) -> anyhow::Result<Vec<BatchEntry>>
where
    R: RateDirectory,
    Z: ZoneDirectory,
{
    let orders: Vec<Order> = serde_json::from_str(json).context("Invalid order batch JSON")?;

    let mut entries: Vec<(usize, BatchEntry)> = Vec::with_capacity(orders.len());
    let mut valid = Vec::with_capacity(orders.len());
    for (index, order) in orders.iter().enumerate() {
        match validate_order(order) {
            Ok(()) => valid.push((index, order)),
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Order rejected");
                entries.push((index, BatchEntry::failed(&order.id, format!("Invalid order: {}", e))));
            }
        }
    }

    let outcomes = resolver.calculate_batch(valid.iter().map(|(_, order)| *order));
    entries.extend(
        valid
            .iter()
            .map(|(index, _)| *index)
            .zip(outcomes.into_iter().map(BatchEntry::from)),
    );
    entries.sort_by_key(|(index, _)| *index);

    let entries: Vec<BatchEntry> = entries.into_iter().map(|(_, entry)| entry).collect();
    info!(
        orders = entries.len(),
        failed = entries.iter().filter(|e| !e.is_ok()).count(),
        "Batch calculated"
    );
    Ok(entries)
}

/// Runs the command and prints the result.
pub fn run<R, Z>(resolver: &TaxResolver<R, Z>, input: &Path, batch: bool, pretty: bool) -> anyhow::Result<()>
where
    R: RateDirectory,
    Z: ZoneDirectory,
{
    let json = read_input(input)?;

    if !batch {
        let report = calculate_one(resolver, &json)?;
        return super::print_json(&report, pretty);
    }

    let entries = calculate_many(resolver, &json)?;
    super::print_json(&entries, pretty)?;

    let failed = entries.iter().filter(|e| !e.is_ok()).count();
    if failed > 0 {
        bail!("{} of {} orders failed", failed, entries.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use levy_directory::InMemoryDirectory;

    const RATES: &str = r#"
        [[zones]]
        id = "california"
        members = [{ kind = "state", country_iso = "US", state_abbr = "CA" }]

        [[rates]]
        id = "ca-sales"
        name = "CA Sales Tax"
        zone_id = "california"
        tax_category_ids = ["taxable"]
        rate_bps = 725
    "#;

    const ORDER: &str = r#"{
        "id": "R1",
        "tax_address": { "country_iso": "US", "state_abbr": "CA", "zipcode": "94103" },
        "line_items": [
            { "id": "li-1", "tax_category_id": "taxable", "price_cents": 1000, "quantity": 2 }
        ],
        "shipments": [
            { "id": "sh-1", "cost_cents": 500 }
        ]
    }"#;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::from_toml_str(RATES).unwrap()
    }

    #[test]
    fn test_calculate_one() {
        let dir = directory();
        let resolver = TaxResolver::new(&dir, &dir);

        let report = calculate_one(&resolver, ORDER).unwrap();

        assert_eq!(report.order_tax.order_id, "R1");
        assert_eq!(report.order_tax.line_item_taxes.len(), 1);
        assert!(report.order_tax.shipment_taxes.is_empty());
        assert_eq!(report.additional_total_cents, 145);
        assert_eq!(report.included_total_cents, 0);
        assert_eq!(report.by_rate.len(), 1);
        assert_eq!(report.by_rate[0].rate_id, "ca-sales");
    }

    #[test]
    fn test_report_json_shape() {
        let dir = directory();
        let resolver = TaxResolver::new(&dir, &dir);
        let report = calculate_one(&resolver, ORDER).unwrap();

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["order_id"], "R1");
        assert_eq!(value["line_item_taxes"][0]["label"], "CA Sales Tax 7.25%");
        assert_eq!(value["additional_total_cents"], 145);
    }

    #[test]
    fn test_invalid_order_rejected() {
        let dir = directory();
        let resolver = TaxResolver::new(&dir, &dir);
        let json = r#"{ "id": "R1", "line_items": [
            { "id": "li-1", "price_cents": 1000, "quantity": 0 }
        ] }"#;

        let err = calculate_one(&resolver, json).unwrap_err();
        assert!(err.to_string().contains("Invalid order 'R1'"));
    }

    #[test]
    fn test_calculate_many_keeps_order() {
        let dir = directory();
        let resolver = TaxResolver::new(&dir, &dir);
        let json = r#"[
            { "id": "A", "tax_address": { "country_iso": "US", "state_abbr": "CA" },
              "line_items": [{ "id": "li", "tax_category_id": "taxable", "price_cents": 1000, "quantity": 1 }] },
            { "id": "B", "line_items": [{ "id": "li", "price_cents": -5, "quantity": 1 }] },
            { "id": "C", "tax_address": { "country_iso": "USA" } },
            { "id": "D" }
        ]"#;

        let entries = calculate_many(&resolver, json).unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.order_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);

        assert_eq!(entries[0].report.as_ref().unwrap().additional_total_cents, 73);
        assert!(entries[1].error.as_ref().unwrap().starts_with("Invalid order"));
        assert!(!entries[2].is_ok());
        assert!(entries[3].report.as_ref().unwrap().order_tax.is_empty());
    }

    #[test]
    fn test_overflowing_totals_fail_the_order() {
        let dir = InMemoryDirectory::from_toml_str(
            r#"
            [[zones]]
            id = "california"
            members = [{ kind = "state", country_iso = "US", state_abbr = "CA" }]

            [[rates]]
            id = "full"
            zone_id = "california"
            tax_category_ids = ["taxable"]
            rate_bps = 10000
        "#,
        )
        .unwrap();
        let resolver = TaxResolver::new(&dir, &dir);
        let half = i64::MAX / 2 + 1;
        let json = format!(
            r#"[
            {{ "id": "BIG", "tax_address": {{ "country_iso": "US", "state_abbr": "CA" }},
              "line_items": [
                {{ "id": "li-1", "tax_category_id": "taxable", "price_cents": {half}, "quantity": 1 }},
                {{ "id": "li-2", "tax_category_id": "taxable", "price_cents": {half}, "quantity": 1 }}
              ] }},
            {{ "id": "SMALL", "tax_address": {{ "country_iso": "US", "state_abbr": "CA" }},
              "line_items": [{{ "id": "li", "tax_category_id": "taxable", "price_cents": 100, "quantity": 1 }}] }}
        ]"#
        );

        let entries = calculate_many(&resolver, &json).unwrap();

        assert!(!entries[0].is_ok());
        assert!(entries[0].error.as_ref().unwrap().contains("overflow"));
        assert_eq!(entries[1].report.as_ref().unwrap().additional_total_cents, 100);
    }

    #[test]
    fn test_report_from_empty_order_tax() {
        let report = CalculationReport::try_from(OrderTax {
            order_id: "R9".to_string(),
            line_item_taxes: Vec::new(),
            shipment_taxes: Vec::new(),
        })
        .unwrap();

        assert_eq!(report.additional_total_cents, 0);
        assert_eq!(report.included_total_cents, 0);
        assert!(report.by_rate.is_empty());
    }
}
