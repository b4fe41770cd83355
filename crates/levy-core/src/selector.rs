//! # Rate Selection
//!
//! Narrows the rates a directory returned for an address down to the rates
//! that apply to one item.
//!
//! ## Selection Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  candidates (directory order)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Look up each rate's zone                                            │
//! │       │   zip-restricted?  yes ──► restricted set                       │
//! │       │                    no  ──► broad set                            │
//! │       ▼                                                                 │
//! │  2. restricted set non-empty? ──► keep ONLY the restricted set          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. keep rates that are active AND cover the item's category            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  selected rates (same relative order)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 2 runs before step 3: a zip-restricted rate for another category
//! still knocks out every broad rate. That can leave an item with no tax
//! even though a broad rate would have matched it.

use std::collections::HashMap;

use tracing::trace;

use crate::directory::ZoneDirectory;
use crate::error::ResolutionError;
use crate::rate::TaxRate;
use crate::types::TaxableItem;

/// Picks the applicable rates for an item.
#[derive(Debug, Clone)]
pub struct RateSelector<Z> {
    zones: Z,
}

impl<Z: ZoneDirectory> RateSelector<Z> {
    /// Creates a selector backed by a zone directory.
    pub fn new(zones: Z) -> Self {
        RateSelector { zones }
    }

    /// Full selection for one item (steps 1-3).
    ///
    /// ## Errors
    /// `ResolutionError::ZoneNotFound` if a candidate's zone is unknown, or
    /// any error the zone directory reports. No match is `Ok(vec![])`.
    pub fn select(&self, candidates: Vec<TaxRate>, item: &TaxableItem<'_>) -> Result<Vec<TaxRate>, ResolutionError> {
        let candidate_count = candidates.len();
        let narrowed = self.narrow_to_zip_restricted(candidates)?;
        let narrowed_count = narrowed.len();

        let selected: Vec<TaxRate> = narrowed
            .into_iter()
            .filter(|rate| rate.is_active_at(item.order.tax_date))
            .filter(|rate| rate.covers_category(item.tax_category_id))
            .collect();

        trace!(
            item_id = %item.id,
            kind = %item.kind,
            category = ?item.tax_category_id,
            candidates = candidate_count,
            narrowed = narrowed_count,
            selected = selected.len(),
            "Selected tax rates"
        );

        Ok(selected)
    }

    /// Steps 1-2: if any candidate's zone is zip-restricted, returns only
    /// those candidates; otherwise returns every candidate unchanged.
    pub fn narrow_to_zip_restricted(&self, candidates: Vec<TaxRate>) -> Result<Vec<TaxRate>, ResolutionError> {
        // Zone lookups are cached for this call only.
        let mut restricted_by_zone: HashMap<&str, bool> = HashMap::new();
        let mut restricted = Vec::with_capacity(candidates.len());

        for rate in &candidates {
            let is_restricted = match restricted_by_zone.get(rate.zone_id.as_str()) {
                Some(flag) => *flag,
                None => {
                    let zone = self.zones.zone_by_id(&rate.zone_id)?.ok_or_else(|| {
                        ResolutionError::ZoneNotFound {
                            zone_id: rate.zone_id.clone(),
                            rate_id: rate.id.clone(),
                        }
                    })?;
                    let flag = zone.is_zip_restricted();
                    restricted_by_zone.insert(rate.zone_id.as_str(), flag);
                    flag
                }
            };
            restricted.push(is_restricted);
        }

        if !restricted.contains(&true) {
            return Ok(candidates);
        }

        Ok(candidates
            .into_iter()
            .zip(restricted)
            .filter_map(|(rate, is_restricted)| is_restricted.then_some(rate))
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticDirectory;
    use crate::types::{LineItem, Order, TaxAddress, Zone};

    fn directory() -> StaticDirectory {
        StaticDirectory::new()
            .with_zone(Zone::new("us").with_country("US"))
            .with_zone(Zone::new("ca").with_state("US", "CA"))
            .with_zone(Zone::new("bh").with_zipcodes(["90210"]))
            .with_zone(Zone::new("bh-2").with_zipcodes(["90210", "90211"]))
    }

    fn order(category: Option<&str>) -> Order {
        Order::new("R1")
            .with_tax_address(TaxAddress::new("US").with_state("CA").with_zipcode("90210"))
            .with_line_item(LineItem::new("li-1", category, 1000, 1))
    }

    fn ids(rates: &[TaxRate]) -> Vec<&str> {
        rates.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_without_zip_zones_keeps_all_matching() {
        let selector = RateSelector::new(directory());
        let order = order(Some("taxable"));
        let item = order.line_item_views().next().unwrap();

        let candidates = vec![
            TaxRate::new("federal", "us", 100).with_categories(["taxable"]),
            TaxRate::new("state", "ca", 725).with_categories(["taxable"]),
            TaxRate::new("food", "ca", 0).with_categories(["food"]),
        ];

        let selected = selector.select(candidates, &item).unwrap();
        assert_eq!(ids(&selected), vec!["federal", "state"]);
    }

    #[test]
    fn test_zip_zone_dominates() {
        let selector = RateSelector::new(directory());
        let order = order(Some("taxable"));
        let item = order.line_item_views().next().unwrap();

        let candidates = vec![
            TaxRate::new("state", "ca", 725).with_categories(["taxable"]),
            TaxRate::new("local", "bh", 950).with_categories(["taxable"]),
            TaxRate::new("federal", "us", 100).with_categories(["taxable"]),
            TaxRate::new("district", "bh-2", 25).with_categories(["taxable"]),
        ];

        let selected = selector.select(candidates, &item).unwrap();
        assert_eq!(ids(&selected), vec!["local", "district"]);
    }

    #[test]
    fn test_zip_zone_for_other_category_still_dominates() {
        let selector = RateSelector::new(directory());
        let order = order(Some("taxable"));
        let item = order.line_item_views().next().unwrap();

        let candidates = vec![
            TaxRate::new("state", "ca", 725).with_categories(["taxable"]),
            TaxRate::new("local-food", "bh", 100).with_categories(["food"]),
        ];

        let selected = selector.select(candidates, &item).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_inactive_rates_are_dropped() {
        let selector = RateSelector::new(directory());
        let order = order(Some("taxable"));
        let item = order.line_item_views().next().unwrap();

        let candidates = vec![
            TaxRate::new("old", "ca", 700)
                .with_categories(["taxable"])
                .with_active(false),
            TaxRate::new("new", "ca", 725).with_categories(["taxable"]),
        ];

        let selected = selector.select(candidates, &item).unwrap();
        assert_eq!(ids(&selected), vec!["new"]);
    }

    #[test]
    fn test_item_without_category_gets_nothing() {
        let selector = RateSelector::new(directory());
        let order = order(None);
        let item = order.line_item_views().next().unwrap();

        let candidates = vec![TaxRate::new("state", "ca", 725).with_categories(["taxable"])];
        assert!(selector.select(candidates, &item).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_zone_is_an_error() {
        let selector = RateSelector::new(directory());
        let order = order(Some("taxable"));
        let item = order.line_item_views().next().unwrap();

        let candidates = vec![TaxRate::new("ghost", "nowhere", 500).with_categories(["taxable"])];
        let err = selector.select(candidates, &item).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::ZoneNotFound { ref zone_id, .. } if zone_id == "nowhere"
        ));
    }

    #[test]
    fn test_zone_lookups_cached_per_call() {
        let dir = directory();
        let selector = RateSelector::new(&dir);

        let candidates = vec![
            TaxRate::new("a", "ca", 100),
            TaxRate::new("b", "ca", 200),
            TaxRate::new("c", "us", 300),
        ];
        selector.narrow_to_zip_restricted(candidates.clone()).unwrap();
        assert_eq!(dir.zone_lookups(), 2);

        selector.narrow_to_zip_restricted(candidates).unwrap();
        assert_eq!(dir.zone_lookups(), 4);
    }

    #[test]
    fn test_empty_candidates() {
        let selector = RateSelector::new(directory());
        assert!(selector.narrow_to_zip_restricted(Vec::new()).unwrap().is_empty());
    }
}
