//! # Domain Types
//!
//! Core domain types used throughout Levy.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │    LineItem     │   │    Shipment     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  currency       │   │  tax_category   │   │  tax_category   │       │
//! │  │  tax_address    │   │  price × qty    │   │  cost           │       │
//! │  │  tax_date       │   │  promo_total    │   │  promo_total    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   TaxAddress    │   │      Zone       │   │  BasisPoints    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  country_iso    │   │  members        │   │  bps (i32)      │       │
//! │  │  state_abbr     │   │  zipcodes       │   │  825 = 8.25%    │       │
//! │  │  zipcode        │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Item Enumeration
//! Line items and shipments are taxed through one borrowed view,
//! [`TaxableItem`], produced by [`Order::taxable_items`]. The view carries
//! the order's address, currency and tax date, so nothing downstream needs a
//! back reference to the order itself.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Currency assumed when an order doesn't name one.
pub const DEFAULT_CURRENCY: &str = "USD";

// =============================================================================
// Basis Points
// =============================================================================

/// A rate value in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25% (e.g., Texas sales tax)
///
/// Signed, so negative rates (tax credits) are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BasisPoints(i32);

impl BasisPoints {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: i32) -> Self {
        BasisPoints(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> i32 {
        self.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        BasisPoints(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for BasisPoints {
    fn default() -> Self {
        BasisPoints::zero()
    }
}

/// Displays as a trimmed percentage: `8.25%`, `7.5%`, `10%`.
impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / 100;
        let frac = abs % 100;
        if frac == 0 {
            write!(f, "{}{}%", sign, whole)
        } else if frac % 10 == 0 {
            write!(f, "{}{}.{}%", sign, whole, frac / 10)
        } else {
            write!(f, "{}{}.{:02}%", sign, whole, frac)
        }
    }
}

// =============================================================================
// Tax Address
// =============================================================================

/// The address an order is taxed at.
///
/// Derived outside this crate (ship address, store fallback, ...). Levy
/// only passes it to the rate directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxAddress {
    /// ISO 3166-1 alpha-2 country code.
    pub country_iso: String,

    /// State / province abbreviation.
    #[serde(default)]
    pub state_abbr: Option<String>,

    /// Postal code.
    #[serde(default)]
    pub zipcode: Option<String>,
}

impl TaxAddress {
    /// Creates an address with only a country.
    pub fn new(country_iso: impl Into<String>) -> Self {
        TaxAddress {
            country_iso: country_iso.into(),
            state_abbr: None,
            zipcode: None,
        }
    }

    /// Sets the state abbreviation.
    pub fn with_state(mut self, state_abbr: impl Into<String>) -> Self {
        self.state_abbr = Some(state_abbr.into());
        self
    }

    /// Sets the postal code.
    pub fn with_zipcode(mut self, zipcode: impl Into<String>) -> Self {
        self.zipcode = Some(zipcode.into());
        self
    }
}

// =============================================================================
// Zone
// =============================================================================

/// A geographic member of a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneMember {
    /// Every address in a country.
    Country { country_iso: String },
    /// Every address in one state of a country.
    State {
        country_iso: String,
        state_abbr: String,
    },
}

/// A geographic grouping that tax rates are bound to.
///
/// ## Zip Restriction
/// A zone with a non-empty `zipcodes` set is *zip-restricted*. When any
/// candidate rate for an address belongs to such a zone, only the
/// zip-restricted rates are kept (see [`crate::selector`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Zone {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Countries and states this zone covers.
    #[serde(default)]
    pub members: Vec<ZoneMember>,

    /// Postal codes this zone is restricted to (may be empty).
    #[serde(default)]
    #[ts(as = "Vec<String>")]
    pub zipcodes: BTreeSet<String>,
}

impl Zone {
    /// Creates an empty zone.
    pub fn new(id: impl Into<String>) -> Self {
        Zone {
            id: id.into(),
            name: String::new(),
            members: Vec::new(),
            zipcodes: BTreeSet::new(),
        }
    }

    /// Adds a country member.
    pub fn with_country(mut self, country_iso: impl Into<String>) -> Self {
        self.members.push(ZoneMember::Country {
            country_iso: country_iso.into(),
        });
        self
    }

    /// Adds a state member.
    pub fn with_state(mut self, country_iso: impl Into<String>, state_abbr: impl Into<String>) -> Self {
        self.members.push(ZoneMember::State {
            country_iso: country_iso.into(),
            state_abbr: state_abbr.into(),
        });
        self
    }

    /// Adds postal codes.
    pub fn with_zipcodes<I, S>(mut self, zipcodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.zipcodes.extend(zipcodes.into_iter().map(Into::into));
        self
    }

    /// True when the zone only applies to specific postal codes.
    #[inline]
    pub fn is_zip_restricted(&self) -> bool {
        !self.zipcodes.is_empty()
    }
}

// =============================================================================
// Order Items
// =============================================================================

/// Which output bucket an item's taxes land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    LineItem,
    Shipment,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::LineItem => write!(f, "line_item"),
            ItemKind::Shipment => write!(f, "shipment"),
        }
    }
}

/// A line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,

    /// Tax category; `None` never matches any rate.
    #[serde(default)]
    pub tax_category_id: Option<String>,

    /// Unit price in cents.
    pub price_cents: i64,

    pub quantity: i64,

    /// Promotion adjustments on this line (usually ≤ 0).
    #[serde(default)]
    pub promo_total_cents: i64,
}

impl LineItem {
    /// Creates a line item without promotions.
    pub fn new(id: impl Into<String>, tax_category_id: Option<&str>, price_cents: i64, quantity: i64) -> Self {
        LineItem {
            id: id.into(),
            tax_category_id: tax_category_id.map(str::to_string),
            price_cents,
            quantity,
            promo_total_cents: 0,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A shipment on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Shipment {
    pub id: String,

    #[serde(default)]
    pub tax_category_id: Option<String>,

    /// Shipping cost in cents.
    pub cost_cents: i64,

    #[serde(default)]
    pub promo_total_cents: i64,
}

impl Shipment {
    /// Creates a shipment without promotions.
    pub fn new(id: impl Into<String>, tax_category_id: Option<&str>, cost_cents: i64) -> Self {
        Shipment {
            id: id.into(),
            tax_category_id: tax_category_id.map(str::to_string),
            cost_cents,
            promo_total_cents: 0,
        }
    }

    /// Returns the shipping cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// An order to be taxed.
///
/// Read-only from Levy's perspective: the resolver borrows it and never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,

    /// ISO 4217 currency code of every amount on the order.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Resolved tax address; `None` means no rate can apply.
    #[serde(default)]
    pub tax_address: Option<TaxAddress>,

    /// Date rate validity windows are evaluated at; `None` skips windows.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub tax_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub line_items: Vec<LineItem>,

    #[serde(default)]
    pub shipments: Vec<Shipment>,
}

impl Order {
    /// Creates an empty order in the default currency.
    pub fn new(id: impl Into<String>) -> Self {
        Order {
            id: id.into(),
            currency: default_currency(),
            tax_address: None,
            tax_date: None,
            line_items: Vec::new(),
            shipments: Vec::new(),
        }
    }

    /// Sets the tax address.
    pub fn with_tax_address(mut self, address: TaxAddress) -> Self {
        self.tax_address = Some(address);
        self
    }

    /// Adds a line item.
    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    /// Adds a shipment.
    pub fn with_shipment(mut self, shipment: Shipment) -> Self {
        self.shipments.push(shipment);
        self
    }

    /// Line items as taxable views, in order.
    pub fn line_item_views(&self) -> impl Iterator<Item = TaxableItem<'_>> + '_ {
        self.line_items.iter().map(move |li| TaxableItem {
            id: &li.id,
            kind: ItemKind::LineItem,
            tax_category_id: li.tax_category_id.as_deref(),
            unit_amount: li.price(),
            quantity: li.quantity,
            promo_total: Money::from_cents(li.promo_total_cents),
            order: self.context(),
        })
    }

    /// Shipments as taxable views, in order.
    pub fn shipment_views(&self) -> impl Iterator<Item = TaxableItem<'_>> + '_ {
        self.shipments.iter().map(move |s| TaxableItem {
            id: &s.id,
            kind: ItemKind::Shipment,
            tax_category_id: s.tax_category_id.as_deref(),
            unit_amount: s.cost(),
            quantity: 1,
            promo_total: Money::from_cents(s.promo_total_cents),
            order: self.context(),
        })
    }

    /// Every taxable item: line items first, then shipments.
    pub fn taxable_items(&self) -> impl Iterator<Item = TaxableItem<'_>> + '_ {
        self.line_item_views().chain(self.shipment_views())
    }

    fn context(&self) -> OrderContext<'_> {
        OrderContext {
            id: &self.id,
            currency: &self.currency,
            tax_address: self.tax_address.as_ref(),
            tax_date: self.tax_date,
        }
    }
}

// =============================================================================
// Taxable Item View
// =============================================================================

/// The parts of an order every item needs while being taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderContext<'a> {
    pub id: &'a str,
    pub currency: &'a str,
    pub tax_address: Option<&'a TaxAddress>,
    pub tax_date: Option<DateTime<Utc>>,
}

/// A line item or shipment, seen uniformly by rate selection and
/// calculation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxableItem<'a> {
    pub id: &'a str,
    pub kind: ItemKind,
    pub tax_category_id: Option<&'a str>,
    /// Unit price for line items, cost for shipments.
    pub unit_amount: Money,
    /// Always 1 for shipments.
    pub quantity: i64,
    pub promo_total: Money,
    /// Read-only back reference to the owning order.
    pub order: OrderContext<'a>,
}

impl TaxableItem<'_> {
    /// Amount tax is computed on: `unit × quantity + promotions`.
    ///
    /// Returns `None` on overflow.
    pub fn taxable_amount(&self) -> Option<Money> {
        self.unit_amount
            .checked_mul(self.quantity)?
            .checked_add(self.promo_total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_points_display() {
        assert_eq!(BasisPoints::from_bps(825).to_string(), "8.25%");
        assert_eq!(BasisPoints::from_bps(1000).to_string(), "10%");
        assert_eq!(BasisPoints::from_bps(750).to_string(), "7.5%");
        assert_eq!(BasisPoints::from_bps(5).to_string(), "0.05%");
        assert_eq!(BasisPoints::from_bps(-50).to_string(), "-0.5%");
    }

    #[test]
    fn test_zone_zip_restriction() {
        let zone = Zone::new("us").with_country("US");
        assert!(!zone.is_zip_restricted());

        let zone = Zone::new("bh").with_zipcodes(["90210"]);
        assert!(zone.is_zip_restricted());
    }

    #[test]
    fn test_taxable_items_enumeration_order() {
        let order = Order::new("R100")
            .with_line_item(LineItem::new("li-1", Some("goods"), 1000, 2))
            .with_line_item(LineItem::new("li-2", None, 500, 1))
            .with_shipment(Shipment::new("sh-1", Some("shipping"), 800));

        let items: Vec<_> = order.taxable_items().map(|i| (i.id, i.kind)).collect();
        assert_eq!(
            items,
            vec![
                ("li-1", ItemKind::LineItem),
                ("li-2", ItemKind::LineItem),
                ("sh-1", ItemKind::Shipment),
            ]
        );
    }

    #[test]
    fn test_taxable_amount_includes_promotions() {
        let mut item = LineItem::new("li-1", Some("goods"), 1000, 3);
        item.promo_total_cents = -500;
        let order = Order::new("R100").with_line_item(item);

        let view = order.line_item_views().next().unwrap();
        assert_eq!(view.taxable_amount(), Some(Money::from_cents(2500)));
        assert_eq!(view.order.id, "R100");
        assert_eq!(view.order.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn test_shipment_view_has_quantity_one() {
        let order = Order::new("R1").with_shipment(Shipment::new("sh", None, 700));
        let view = order.shipment_views().next().unwrap();
        assert_eq!(view.quantity, 1);
        assert_eq!(view.taxable_amount(), Some(Money::from_cents(700)));
    }

    #[test]
    fn test_order_deserializes_with_defaults() {
        let json = r#"{
            "id": "R200",
            "tax_address": { "country_iso": "US", "state_abbr": "CA", "zipcode": "90210" },
            "line_items": [
                { "id": "li-1", "tax_category_id": "clothing", "price_cents": 2000, "quantity": 1 }
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.currency, "USD");
        assert!(order.shipments.is_empty());
        assert_eq!(order.line_items[0].promo_total_cents, 0);
        assert_eq!(
            order.tax_address,
            Some(TaxAddress::new("US").with_state("CA").with_zipcode("90210"))
        );
    }
}
