//! # In-Memory Directory
//!
//! Serves rate and zone lookups from a validated [`RateTable`].
//!
//! ## Address Matching
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Does zone Z match address A?                         │
//! │                                                                         │
//! │  Z.zipcodes non-empty (zip-restricted)                                  │
//! │   └── A.zipcode ∈ Z.zipcodes                                            │
//! │       AND (Z.members empty OR some member covers A)                     │
//! │                                                                         │
//! │  Z.zipcodes empty                                                       │
//! │   └── some member covers A                                              │
//! │        ├── Country { US }      covers any US address                    │
//! │        └── State { US, CA }    covers US addresses in CA                │
//! │                                                                         │
//! │  Country/state codes compare ASCII case-insensitively.                  │
//! │  Zip codes compare after trimming, ASCII case-insensitively.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use levy_core::validation::validate_tax_address;
use levy_core::{RateDirectory, ResolutionError, TaxAddress, TaxRate, Zone, ZoneDirectory, ZoneMember};
use tracing::debug;

use crate::error::DirectoryResult;
use crate::table::RateTable;

/// Rate and zone directory backed by an in-memory rate table.
///
/// Immutable after construction, so it can be shared across threads
/// (`Arc<InMemoryDirectory>`) and used for concurrent calculations.
///
/// ## Usage
/// ```rust,ignore
/// let directory = InMemoryDirectory::load("rates.toml")?;
/// let resolver = TaxResolver::new(&directory, &directory);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    zones: Vec<Zone>,
    zone_index: HashMap<String, usize>,
    rates: Vec<TaxRate>,
}

impl InMemoryDirectory {
    /// Builds a directory from a table, validating it first.
    pub fn from_table(table: RateTable) -> DirectoryResult<Self> {
        table.validate()?;

        let zone_index = table
            .zones
            .iter()
            .enumerate()
            .map(|(i, zone)| (zone.id.clone(), i))
            .collect();

        Ok(InMemoryDirectory {
            zones: table.zones,
            zone_index,
            rates: table.rates,
        })
    }

    /// Loads a rate table file into a directory.
    pub fn load(path: impl AsRef<std::path::Path>) -> DirectoryResult<Self> {
        Self::from_table(RateTable::load(path)?)
    }

    /// Builds a directory from TOML text.
    pub fn from_toml_str(contents: &str) -> DirectoryResult<Self> {
        Self::from_table(RateTable::from_toml_str(contents)?)
    }

    /// All zones, in table order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// All rates, in table order.
    pub fn rates(&self) -> &[TaxRate] {
        &self.rates
    }

    /// Zones whose geography covers `address`, in table order.
    pub fn zones_for_address<'a>(&'a self, address: &'a TaxAddress) -> impl Iterator<Item = &'a Zone> + 'a {
        self.zones
            .iter()
            .filter(move |zone| zone_matches(zone, address))
    }
}

impl RateDirectory for InMemoryDirectory {
    fn rates_for_address(&self, address: &TaxAddress) -> Result<Vec<TaxRate>, ResolutionError> {
        validate_tax_address(address).map_err(|e| ResolutionError::MalformedAddress {
            reason: e.to_string(),
        })?;

        let matched: HashSet<&str> = self
            .zones_for_address(address)
            .map(|zone| zone.id.as_str())
            .collect();

        let rates: Vec<TaxRate> = self
            .rates
            .iter()
            .filter(|rate| matched.contains(rate.zone_id.as_str()))
            .cloned()
            .collect();

        debug!(
            country = %address.country_iso,
            state = ?address.state_abbr,
            zipcode = ?address.zipcode,
            zones = matched.len(),
            rates = rates.len(),
            "Rates for address"
        );

        Ok(rates)
    }
}

impl ZoneDirectory for InMemoryDirectory {
    fn zone_by_id(&self, id: &str) -> Result<Option<Zone>, ResolutionError> {
        Ok(self.zone_index.get(id).map(|&i| self.zones[i].clone()))
    }
}

// =============================================================================
// Zone Matching
// =============================================================================

/// True when `zone` geographically covers `address`.
pub fn zone_matches(zone: &Zone, address: &TaxAddress) -> bool {
    let covered_by_member = || zone.members.iter().any(|member| member_covers(member, address));

    if zone.is_zip_restricted() {
        let Some(zipcode) = address.zipcode.as_deref().map(str::trim) else {
            return false;
        };
        let zip_listed = zone
            .zipcodes
            .iter()
            .any(|z| z.trim().eq_ignore_ascii_case(zipcode));
        zip_listed && (zone.members.is_empty() || covered_by_member())
    } else {
        covered_by_member()
    }
}

fn member_covers(member: &ZoneMember, address: &TaxAddress) -> bool {
    match member {
        ZoneMember::Country { country_iso } => country_iso.eq_ignore_ascii_case(&address.country_iso),
        ZoneMember::State {
            country_iso,
            state_abbr,
        } => {
            country_iso.eq_ignore_ascii_case(&address.country_iso)
                && address
                    .state_abbr
                    .as_deref()
                    .is_some_and(|s| s.trim().eq_ignore_ascii_case(state_abbr))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::from_toml_str(
            r#"
            [[zones]]
            id = "us"
            members = [{ kind = "country", country_iso = "US" }]

            [[zones]]
            id = "california"
            members = [{ kind = "state", country_iso = "US", state_abbr = "CA" }]

            [[zones]]
            id = "beverly-hills"
            members = [{ kind = "country", country_iso = "US" }]
            zipcodes = ["90210"]

            [[zones]]
            id = "london"
            zipcodes = ["SW1A 1AA"]

            [[rates]]
            id = "ca"
            zone_id = "california"
            tax_category_ids = ["taxable"]
            rate_bps = 725

            [[rates]]
            id = "federal"
            zone_id = "us"
            tax_category_ids = ["taxable"]
            rate_bps = 100

            [[rates]]
            id = "bh"
            zone_id = "beverly-hills"
            tax_category_ids = ["taxable"]
            rate_bps = 950

            [[rates]]
            id = "uk"
            zone_id = "london"
            tax_category_ids = ["taxable"]
            rate_bps = 2000
        "#,
        )
        .unwrap()
    }

    fn rate_ids(rates: &[TaxRate]) -> Vec<&str> {
        rates.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_rates_in_table_order() {
        let dir = directory();
        let address = TaxAddress::new("US").with_state("CA").with_zipcode("90210");
        let rates = dir.rates_for_address(&address).unwrap();
        assert_eq!(rate_ids(&rates), vec!["ca", "federal", "bh"]);
    }

    #[test]
    fn test_state_and_country_matching() {
        let dir = directory();

        let nevada = TaxAddress::new("us").with_state("NV").with_zipcode("89101");
        assert_eq!(rate_ids(&dir.rates_for_address(&nevada).unwrap()), vec!["federal"]);

        let california = TaxAddress::new("US").with_state("ca").with_zipcode("94103");
        assert_eq!(
            rate_ids(&dir.rates_for_address(&california).unwrap()),
            vec!["ca", "federal"]
        );
    }

    #[test]
    fn test_zip_zone_needs_member_country() {
        let dir = directory();
        let germany = TaxAddress::new("DE").with_zipcode("90210");
        assert!(dir.rates_for_address(&germany).unwrap().is_empty());
    }

    #[test]
    fn test_zip_only_zone() {
        let dir = directory();
        let address = TaxAddress::new("GB").with_zipcode(" sw1a 1aa ");
        assert_eq!(rate_ids(&dir.rates_for_address(&address).unwrap()), vec!["uk"]);

        let no_zip = TaxAddress::new("GB");
        assert!(dir.rates_for_address(&no_zip).unwrap().is_empty());
    }

    #[test]
    fn test_unmatched_address_is_empty_not_error() {
        let dir = directory();
        let address = TaxAddress::new("FR").with_zipcode("75001");
        assert!(dir.rates_for_address(&address).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_address_rejected() {
        let dir = directory();
        let address = TaxAddress::new("United States");
        let err = dir.rates_for_address(&address).unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedAddress { .. }));
    }

    #[test]
    fn test_zone_by_id() {
        let dir = directory();
        let zone = dir.zone_by_id("beverly-hills").unwrap().unwrap();
        assert!(zone.is_zip_restricted());
        assert!(dir.zone_by_id("atlantis").unwrap().is_none());
    }

    #[test]
    fn test_zones_for_address() {
        let dir = directory();
        let address = TaxAddress::new("US").with_state("CA").with_zipcode("90210");
        let ids: Vec<_> = dir.zones_for_address(&address).map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["us", "california", "beverly-hills"]);
    }
}
