//! In-test directory fake shared by the unit tests.

use std::cell::Cell;

use crate::directory::{RateDirectory, ZoneDirectory};
use crate::error::ResolutionError;
use crate::rate::TaxRate;
use crate::types::{TaxAddress, Zone};

/// Returns every configured rate for any address and counts lookups.
///
/// `unavailable` fails rate lookups, `zones_unavailable` fails zone lookups.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    zones: Vec<Zone>,
    rates: Vec<TaxRate>,
    unavailable: Option<String>,
    zones_unavailable: Option<String>,
    rate_lookups: Cell<usize>,
    zone_lookups: Cell<usize>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn with_rate(mut self, rate: TaxRate) -> Self {
        self.rates.push(rate);
        self
    }

    pub fn unavailable(mut self, reason: &str) -> Self {
        self.unavailable = Some(reason.to_string());
        self
    }

    /// Rate lookups keep working, zone lookups fail.
    pub fn zones_unavailable(mut self, reason: &str) -> Self {
        self.zones_unavailable = Some(reason.to_string());
        self
    }

    pub fn rate_lookups(&self) -> usize {
        self.rate_lookups.get()
    }

    pub fn zone_lookups(&self) -> usize {
        self.zone_lookups.get()
    }
}

impl RateDirectory for StaticDirectory {
    fn rates_for_address(&self, address: &TaxAddress) -> Result<Vec<TaxRate>, ResolutionError> {
        self.rate_lookups.set(self.rate_lookups.get() + 1);
        if let Some(reason) = &self.unavailable {
            return Err(ResolutionError::DirectoryUnavailable(reason.clone()));
        }
        if address.country_iso.is_empty() {
            return Err(ResolutionError::MalformedAddress {
                reason: "country is empty".to_string(),
            });
        }
        Ok(self.rates.clone())
    }
}

impl ZoneDirectory for StaticDirectory {
    fn zone_by_id(&self, id: &str) -> Result<Option<Zone>, ResolutionError> {
        self.zone_lookups.set(self.zone_lookups.get() + 1);
        if let Some(reason) = &self.zones_unavailable {
            return Err(ResolutionError::DirectoryUnavailable(reason.clone()));
        }
        Ok(self.zones.iter().find(|z| z.id == id).cloned())
    }
}
