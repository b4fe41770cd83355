//! # Rate Tables
//!
//! The TOML document a directory is built from.
//!
//! ## File Format
//! ```toml
//! [[zones]]
//! id = "california"
//! name = "California"
//! members = [{ kind = "state", country_iso = "US", state_abbr = "CA" }]
//!
//! [[zones]]
//! id = "beverly-hills"
//! members = [{ kind = "country", country_iso = "US" }]
//! zipcodes = ["90210", "90211"]
//!
//! [[rates]]
//! id = "ca-sales"
//! name = "CA Sales Tax"
//! zone_id = "california"
//! tax_category_ids = ["taxable"]
//! rate_bps = 725
//!
//! [[rates]]
//! id = "bh-district"
//! zone_id = "beverly-hills"
//! tax_category_ids = ["taxable"]
//! rate_bps = 950
//! starts_at = "2024-01-01T00:00:00Z"   # quoted RFC 3339
//!
//! [[rates]]
//! id = "bottle-deposit"
//! zone_id = "california"
//! tax_category_ids = ["beverages"]
//! calculator = { type = "per_unit", amount_cents = 5, currency = "USD" }
//! ```
//!
//! Order of `[[rates]]` entries is the order rates are returned in, and so
//! the order of `ItemTax` entries for an item.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use levy_core::validation::{validate_tax_rate, validate_zone};
use levy_core::{TaxRate, Zone};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DirectoryError, DirectoryResult};

/// Zones and rates as written in a rate table file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    pub zones: Vec<Zone>,

    #[serde(default)]
    pub rates: Vec<TaxRate>,
}

impl RateTable {
    /// Reads and validates a rate table file.
    pub fn load(path: impl AsRef<Path>) -> DirectoryResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading rate table");

        let contents = fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parses and validates a rate table from TOML text.
    pub fn from_toml_str(contents: &str) -> DirectoryResult<Self> {
        let table: RateTable = toml::from_str(contents)?;
        table.validate()?;
        Ok(table)
    }

    /// Checks every zone and rate, id uniqueness and zone references.
    pub fn validate(&self) -> DirectoryResult<()> {
        let mut zone_ids = HashSet::new();
        for zone in &self.zones {
            validate_zone(zone).map_err(|e| DirectoryError::invalid("zone", &zone.id, e))?;
            if !zone_ids.insert(zone.id.as_str()) {
                return Err(DirectoryError::DuplicateId {
                    entity: "zone",
                    id: zone.id.clone(),
                });
            }
        }

        let mut rate_ids = HashSet::new();
        for rate in &self.rates {
            validate_tax_rate(rate).map_err(|e| DirectoryError::invalid("rate", &rate.id, e))?;
            if !rate_ids.insert(rate.id.as_str()) {
                return Err(DirectoryError::DuplicateId {
                    entity: "rate",
                    id: rate.id.clone(),
                });
            }
            if !zone_ids.contains(rate.zone_id.as_str()) {
                return Err(DirectoryError::UnknownZone {
                    rate_id: rate.id.clone(),
                    zone_id: rate.zone_id.clone(),
                });
            }
            if rate.tax_category_ids.is_empty() {
                warn!(rate_id = %rate.id, "Tax rate has no tax categories and will never apply");
            }
        }

        debug!(
            zones = self.zones.len(),
            rates = self.rates.len(),
            "Rate table validated"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use levy_core::{CalculationStrategy, ZoneMember};

    const TABLE: &str = r#"
        [[zones]]
        id = "california"
        name = "California"
        members = [{ kind = "state", country_iso = "US", state_abbr = "CA" }]

        [[zones]]
        id = "beverly-hills"
        members = [{ kind = "country", country_iso = "US" }]
        zipcodes = ["90210", "90211"]

        [[rates]]
        id = "ca-sales"
        name = "CA Sales Tax"
        zone_id = "california"
        tax_category_ids = ["taxable"]
        rate_bps = 725

        [[rates]]
        id = "bh-district"
        zone_id = "beverly-hills"
        tax_category_ids = ["taxable"]
        rate_bps = 950
        starts_at = "2024-01-01T00:00:00Z"

        [[rates]]
        id = "bottle-deposit"
        zone_id = "california"
        tax_category_ids = ["beverages"]
        calculator = { type = "per_unit", amount_cents = 5, currency = "USD" }
    "#;

    #[test]
    fn test_parse_table() {
        let table = RateTable::from_toml_str(TABLE).unwrap();
        assert_eq!(table.zones.len(), 2);
        assert_eq!(table.rates.len(), 3);

        assert_eq!(
            table.zones[0].members,
            vec![ZoneMember::State {
                country_iso: "US".to_string(),
                state_abbr: "CA".to_string(),
            }]
        );
        assert!(table.zones[1].is_zip_restricted());

        let ca = &table.rates[0];
        assert!(ca.active);
        assert_eq!(ca.rate_bps, 725);
        assert_eq!(ca.calculator, CalculationStrategy::Percentage);

        assert_eq!(
            table.rates[1].starts_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            table.rates[2].calculator,
            CalculationStrategy::PerUnit {
                amount_cents: 5,
                currency: "USD".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_table_is_valid() {
        let table = RateTable::from_toml_str("").unwrap();
        assert!(table.zones.is_empty());
        assert!(table.rates.is_empty());
    }

    #[test]
    fn test_unknown_zone_rejected() {
        let toml = r#"
            [[rates]]
            id = "orphan"
            zone_id = "nowhere"
            rate_bps = 500
        "#;
        let err = RateTable::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, DirectoryError::UnknownZone { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let toml = r#"
            [[zones]]
            id = "us"
            members = [{ kind = "country", country_iso = "US" }]

            [[zones]]
            id = "us"
        "#;
        let err = RateTable::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateId { entity: "zone", .. }));
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let toml = r#"
            [[zones]]
            id = "us"

            [[rates]]
            id = "too-much"
            zone_id = "us"
            rate_bps = 200000
        "#;
        let err = RateTable::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, DirectoryError::Validation { entity: "rate", .. }));
    }

    #[test]
    fn test_invalid_zipcode_rejected() {
        let toml = r#"
            [[zones]]
            id = "bad"
            zipcodes = ["not/a/zip"]
        "#;
        let err = RateTable::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, DirectoryError::Validation { entity: "zone", .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = RateTable::from_toml_str("[[zones]\nid = ").unwrap_err();
        assert!(matches!(err, DirectoryError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RateTable::load("/definitely/not/here/rates.toml").unwrap_err();
        assert!(matches!(err, DirectoryError::Io { .. }));
    }
}
