//! `levy check`: load the rate table and summarize it.

use std::path::{Path, PathBuf};

use levy_directory::InMemoryDirectory;
use serde::Serialize;
use tracing::warn;

/// What a rate table contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub zones: usize,
    pub zip_restricted_zones: usize,
    pub rates: usize,
    pub active_rates: usize,
    pub included_rates: usize,
    /// Rates no item can ever match.
    pub rates_without_categories: Vec<String>,
    /// Zones no rate points at.
    pub unused_zones: Vec<String>,
}

/// Summarizes an already validated directory.
pub fn summarize(path: &Path, directory: &InMemoryDirectory) -> CheckReport {
    let rates = directory.rates();
    let zones = directory.zones();

    let unused_zones: Vec<String> = zones
        .iter()
        .filter(|zone| !rates.iter().any(|rate| rate.zone_id == zone.id))
        .map(|zone| zone.id.clone())
        .collect();
    for zone_id in &unused_zones {
        warn!(zone_id = %zone_id, "Zone has no rates");
    }

    CheckReport {
        path: path.to_path_buf(),
        zones: zones.len(),
        zip_restricted_zones: zones.iter().filter(|z| z.is_zip_restricted()).count(),
        rates: rates.len(),
        active_rates: rates.iter().filter(|r| r.active).count(),
        included_rates: rates.iter().filter(|r| r.included_in_price).count(),
        rates_without_categories: rates
            .iter()
            .filter(|r| r.tax_category_ids.is_empty())
            .map(|r| r.id.clone())
            .collect(),
        unused_zones,
    }
}
