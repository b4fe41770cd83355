//! `levy lookup`: what the directory and selector see for one address.

use chrono::{DateTime, Utc};
use levy_core::{RateDirectory, RateSelector, TaxAddress, TaxRate, TaxResult};
use levy_directory::InMemoryDirectory;
use serde::Serialize;
use tracing::info;

/// Rates for an address at each stage of selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupReport {
    pub address: TaxAddress,
    /// Zones covering the address, in table order.
    pub zones: Vec<String>,
    /// Every rate the directory returns for the address.
    pub candidates: Vec<TaxRate>,
    /// Candidates left after the zip-code specificity rule.
    pub narrowed: Vec<TaxRate>,
    /// Narrowed rates that are active and cover the requested category.
    pub selected: Vec<TaxRate>,
}

/// Builds the lookup report for an address.
///
/// Without a category the last stage only checks activity.
pub fn lookup(
    directory: &InMemoryDirectory,
    address: TaxAddress,
    category: Option<&str>,
    date: Option<DateTime<Utc>>,
) -> TaxResult<LookupReport> {
    let candidates = directory.rates_for_address(&address)?;
    let narrowed = RateSelector::new(directory).narrow_to_zip_restricted(candidates.clone())?;

    let selected: Vec<TaxRate> = narrowed
        .iter()
        .filter(|rate| rate.is_active_at(date))
        .filter(|rate| category.map_or(true, |c| rate.covers_category(Some(c))))
        .cloned()
        .collect();

    let zones = directory
        .zones_for_address(&address)
        .map(|zone| zone.id.clone())
        .collect();

    info!(
        country = %address.country_iso,
        candidates = candidates.len(),
        narrowed = narrowed.len(),
        selected = selected.len(),
        "Lookup complete"
    );

    Ok(LookupReport {
        address,
        zones,
        candidates,
        narrowed,
        selected,
    })
}
