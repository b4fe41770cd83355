//! # Directory Traits
//!
//! The two lookups Levy needs from the outside world.
//!
//! ```text
//! ┌──────────────────┐   rates_for_address   ┌───────────────────────────┐
//! │   TaxResolver    │ ────────────────────► │  RateDirectory            │
//! │                  │                       │  (address → Vec<TaxRate>) │
//! │  ┌────────────┐  │   zone_by_id          ├───────────────────────────┤
//! │  │RateSelector│──┼─────────────────────► │  ZoneDirectory            │
//! │  └────────────┘  │                       │  (id → Option<Zone>)      │
//! └──────────────────┘                       └───────────────────────────┘
//! ```
//!
//! Both are read-only during a calculation. Geographic matching of an
//! address to zones is entirely the rate directory's job.

use std::sync::Arc;

use crate::error::ResolutionError;
use crate::rate::TaxRate;
use crate::types::{TaxAddress, Zone};

/// Looks up tax rates bound to zones matching an address.
pub trait RateDirectory {
    /// Returns every rate whose zone matches `address`.
    ///
    /// An address matching no zone returns `Ok(vec![])`. Errors are reserved
    /// for addresses the directory rejects and backend failures.
    fn rates_for_address(&self, address: &TaxAddress) -> Result<Vec<TaxRate>, ResolutionError>;
}

/// Looks up zones by id.
pub trait ZoneDirectory {
    /// Returns `Ok(None)` when no zone has this id.
    fn zone_by_id(&self, id: &str) -> Result<Option<Zone>, ResolutionError>;
}

impl<T: RateDirectory + ?Sized> RateDirectory for &T {
    fn rates_for_address(&self, address: &TaxAddress) -> Result<Vec<TaxRate>, ResolutionError> {
        (**self).rates_for_address(address)
    }
}

impl<T: RateDirectory + ?Sized> RateDirectory for Box<T> {
    fn rates_for_address(&self, address: &TaxAddress) -> Result<Vec<TaxRate>, ResolutionError> {
        (**self).rates_for_address(address)
    }
}

impl<T: RateDirectory + ?Sized> RateDirectory for Arc<T> {
    fn rates_for_address(&self, address: &TaxAddress) -> Result<Vec<TaxRate>, ResolutionError> {
        (**self).rates_for_address(address)
    }
}

impl<T: ZoneDirectory + ?Sized> ZoneDirectory for &T {
    fn zone_by_id(&self, id: &str) -> Result<Option<Zone>, ResolutionError> {
        (**self).zone_by_id(id)
    }
}

impl<T: ZoneDirectory + ?Sized> ZoneDirectory for Box<T> {
    fn zone_by_id(&self, id: &str) -> Result<Option<Zone>, ResolutionError> {
        (**self).zone_by_id(id)
    }
}

impl<T: ZoneDirectory + ?Sized> ZoneDirectory for Arc<T> {
    fn zone_by_id(&self, id: &str) -> Result<Option<Zone>, ResolutionError> {
        (**self).zone_by_id(id)
    }
}
