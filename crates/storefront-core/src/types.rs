//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────┐                │
//! │  │  Product  │◄──│    Offer     │──►│  Manufacturer   │                │
//! │  └───────────┘   │ price_cents  │   └─────────────────┘                │
//! │                  │ stock (>= 0) │                                       │
//! │                  └──────┬───────┘                                       │
//! │              ┌──────────┴──────────┐                                    │
//! │              ▼                     ▼                                    │
//! │      ┌──────────────┐      ┌──────────────┐                             │
//! │      │   CartLine   │      │    Order     │                             │
//! │      │ (no reserve) │      │ status, qty  │                             │
//! │      └──────────────┘      └──────┬───────┘                             │
//! │                           1:1 ┌───┴────┐ 1:1                            │
//! │                               ▼        ▼                                │
//! │                        ┌─────────┐ ┌────────────────┐   ┌──────────┐   │
//! │                        │ Payment │ │ ShippingRecord │──►│ Address  │   │
//! │                        └─────────┘ └────────────────┘   └──────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by a UUID v4 string generated by [`crate::new_id`].
//!
//! ## Input Types
//! `New*` structs carry creation input; `*Update` structs carry optional-field
//! updates. Both expose `validated()`, which trims text, checks field rules
//! and returns the normalized value.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::access::Role;
use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_id, validate_payment_amount, validate_payment_method, validate_price_cents,
    validate_rating, validate_required_text, validate_stock, ValidationResult,
};
use crate::DEFAULT_SHIPPING_STATUS;

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of an order.
///
/// ## State Machine
/// ```text
///   Pending ──► Processing ──► Shipped ──► Delivered      (admin)
///      │            │
///      └─────┬──────┘
///            ▼
///        Cancelled                                        (owner or admin)
/// ```
/// Shipped, Delivered and Cancelled are terminal for regular users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
pub enum OrderStatus {
    /// Created, stock reserved, nothing else happened yet.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Arrived.
    Delivered,
    /// Cancelled; if a user cancelled it, its stock went back to the offer.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Canonical name, as shown to callers.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether a user may still cancel an order in this status.
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a requested status. Only the exact spellings of [`OrderStatus::as_str`]
/// are recognized.
impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user. Registration itself happens outside this workspace.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog. Products carry no price or stock; offers do.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// 0..=5
    pub rating: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub rating: i64,
}

impl NewProduct {
    pub fn validated(self) -> ValidationResult<Self> {
        validate_rating(self.rating)?;
        Ok(NewProduct {
            name: validate_required_text("name", &self.name)?,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            rating: self.rating,
        })
    }
}

/// Optional-field product update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rating: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.rating.is_none()
    }

    pub fn validated(self) -> ValidationResult<Self> {
        if self.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(ProductUpdate {
            name: self
                .name
                .map(|n| validate_required_text("name", &n))
                .transpose()?,
            description: self.description.map(|d| d.trim().to_string()),
            rating: self.rating,
        })
    }
}

// =============================================================================
// Manufacturer
// =============================================================================

/// A manufacturer. Cannot be deleted while any offer references it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
    pub rating: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a manufacturer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewManufacturer {
    pub name: String,
    #[serde(default)]
    pub rating: i64,
}

impl NewManufacturer {
    pub fn validated(self) -> ValidationResult<Self> {
        validate_rating(self.rating)?;
        Ok(NewManufacturer {
            name: validate_required_text("name", &self.name)?,
            rating: self.rating,
        })
    }
}

/// Optional-field manufacturer update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ManufacturerUpdate {
    pub name: Option<String>,
    pub rating: Option<i64>,
}

impl ManufacturerUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.rating.is_none()
    }

    pub fn validated(self) -> ValidationResult<Self> {
        if self.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(ManufacturerUpdate {
            name: self
                .name
                .map(|n| validate_required_text("name", &n))
                .transpose()?,
            rating: self.rating,
        })
    }
}

// =============================================================================
// Offer
// =============================================================================

/// A product sold by a manufacturer at a price, with finite stock.
///
/// ## Invariant
/// `stock >= 0` at all times. Only the inventory ledger's conditional
/// reserve decrements it, and it refuses to go below zero.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Offer {
    pub id: String,
    pub product_id: String,
    pub manufacturer_id: String,
    pub price_cents: i64,
    pub stock: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// An offer joined with its product and manufacturer names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OfferView {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub manufacturer_id: String,
    pub manufacturer_name: String,
    pub price_cents: i64,
    pub stock: i64,
}

/// Input for creating an offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOffer {
    pub product_id: String,
    pub manufacturer_id: String,
    pub price_cents: i64,
    /// Initial stock; zero when omitted.
    pub stock: Option<i64>,
}

impl NewOffer {
    pub fn validated(self) -> ValidationResult<Self> {
        validate_id("product_id", &self.product_id)?;
        validate_id("manufacturer_id", &self.manufacturer_id)?;
        validate_price_cents(self.price_cents)?;
        let stock = self.stock.unwrap_or(0);
        validate_stock(stock)?;
        Ok(NewOffer {
            stock: Some(stock),
            ..self
        })
    }
}

/// Optional-field offer update (restocking and repricing).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct OfferUpdate {
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
}

impl OfferUpdate {
    pub fn is_empty(&self) -> bool {
        self.price_cents.is_none() && self.stock.is_none()
    }

    pub fn validated(self) -> ValidationResult<Self> {
        if self.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        if let Some(price) = self.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        Ok(self)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A single-line order against one offer.
///
/// `quantity` is fixed at creation. `status` changes only through the
/// lifecycle rules in [`crate::lifecycle`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub offer_id: String,
    pub quantity: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cart
// =============================================================================

/// A staged prospective purchase. Never reserves stock.
///
/// There is at most one line per (user, offer); adding again merges.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub offer_id: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the offer's price, stock and names.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLineView {
    pub id: String,
    pub offer_id: String,
    pub quantity: i64,
    pub price_cents: i64,
    pub stock: i64,
    pub product_name: String,
    pub manufacturer_name: String,
}

impl CartLineView {
    /// price × quantity; `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        Money::from_cents(self.price_cents).checked_multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A recorded payment for an order. At most one per order.
///
/// This system records payments; it never talks to a payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    /// Free-form ("card", "paypal", ...).
    pub method: String,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A payment joined with the owner of its order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentView {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    pub method: String,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
}

/// Optional-field payment update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct PaymentUpdate {
    pub amount_cents: Option<i64>,
    pub method: Option<String>,
}

impl PaymentUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount_cents.is_none() && self.method.is_none()
    }

    pub fn validated(self) -> ValidationResult<Self> {
        if self.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        if let Some(amount) = self.amount_cents {
            validate_payment_amount(amount)?;
        }
        Ok(PaymentUpdate {
            amount_cents: self.amount_cents,
            method: self
                .method
                .map(|m| validate_payment_method(&m))
                .transpose()?,
        })
    }
}

// =============================================================================
// Shipping
// =============================================================================

/// Shipping information for an order. At most one per order.
///
/// `status` is free-form and independent of [`Order::status`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ShippingRecord {
    pub id: String,
    pub order_id: String,
    pub address_id: String,
    #[ts(as = "Option<String>")]
    pub shipping_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub estimated_delivery: Option<NaiveDate>,
    pub status: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A shipping record joined with its address and the order's owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ShippingView {
    pub id: String,
    pub order_id: String,
    pub address_id: String,
    #[ts(as = "Option<String>")]
    pub shipping_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub estimated_delivery: Option<NaiveDate>,
    pub status: String,
    pub country: String,
    pub city: String,
    pub zip_code: String,
    pub address_line: String,
    pub user_id: String,
    pub user_name: String,
}

/// Input for creating a shipping record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewShipping {
    pub order_id: String,
    pub address_id: String,
    #[ts(as = "Option<String>")]
    pub shipping_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub estimated_delivery: Option<NaiveDate>,
    /// Defaults to "Pending".
    pub status: Option<String>,
}

impl NewShipping {
    pub fn validated(self) -> ValidationResult<Self> {
        validate_id("order_id", &self.order_id)?;
        validate_id("address_id", &self.address_id)?;
        let status = match self.status {
            Some(s) => validate_required_text("status", &s)?,
            None => DEFAULT_SHIPPING_STATUS.to_string(),
        };
        Ok(NewShipping {
            status: Some(status),
            ..self
        })
    }
}

/// Optional-field shipping update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ShippingUpdate {
    #[ts(as = "Option<String>")]
    pub shipping_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub estimated_delivery: Option<NaiveDate>,
    pub status: Option<String>,
}

impl ShippingUpdate {
    pub fn is_empty(&self) -> bool {
        self.shipping_date.is_none() && self.estimated_delivery.is_none() && self.status.is_none()
    }

    pub fn validated(self) -> ValidationResult<Self> {
        if self.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        Ok(ShippingUpdate {
            status: self
                .status
                .map(|s| validate_required_text("status", &s))
                .transpose()?,
            ..self
        })
    }
}

// =============================================================================
// Address
// =============================================================================

/// A delivery address owned by a user.
///
/// Cannot be deleted while a shipping record references it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Address {
    pub id: String,
    pub user_id: String,
    pub country: String,
    pub city: String,
    pub zip_code: String,
    pub address_line: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// An address joined with its owner's name (admin listing).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AddressView {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub country: String,
    pub city: String,
    pub zip_code: String,
    pub address_line: String,
}

/// Input for creating an address. Every field is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewAddress {
    pub country: String,
    pub city: String,
    pub zip_code: String,
    pub address_line: String,
}

impl NewAddress {
    pub fn validated(self) -> ValidationResult<Self> {
        Ok(NewAddress {
            country: validate_required_text("country", &self.country)?,
            city: validate_required_text("city", &self.city)?,
            zip_code: validate_required_text("zip_code", &self.zip_code)?,
            address_line: validate_required_text("address_line", &self.address_line)?,
        })
    }
}

/// Optional-field address update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct AddressUpdate {
    pub country: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub address_line: Option<String>,
}

impl AddressUpdate {
    pub fn is_empty(&self) -> bool {
        self.country.is_none()
            && self.city.is_none()
            && self.zip_code.is_none()
            && self.address_line.is_none()
    }

    pub fn validated(self) -> ValidationResult<Self> {
        if self.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        let check = |field: &str, value: Option<String>| {
            value
                .map(|v| validate_required_text(field, &v))
                .transpose()
        };
        Ok(AddressUpdate {
            country: check("country", self.country)?,
            city: check("city", self.city)?,
            zip_code: check("zip_code", self.zip_code)?,
            address_line: check("address_line", self.address_line)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parse_is_exact() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        assert!(" Pending ".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_parse_rejects_unknown() {
        let err = "Lost".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { ref field, .. } if field == "status"));
    }

    #[test]
    fn test_order_status_cancellable() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_order_status_serializes_capitalized() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"Processing\"");
    }

    #[test]
    fn test_updates_require_a_field() {
        assert_eq!(
            PaymentUpdate::default().validated().unwrap_err(),
            ValidationError::NoFieldsToUpdate
        );
        assert_eq!(
            ShippingUpdate::default().validated().unwrap_err(),
            ValidationError::NoFieldsToUpdate
        );
        assert_eq!(
            OfferUpdate::default().validated().unwrap_err(),
            ValidationError::NoFieldsToUpdate
        );
    }

    #[test]
    fn test_payment_update_rules() {
        let update = PaymentUpdate {
            amount_cents: Some(0),
            method: None,
        };
        assert!(matches!(
            update.validated(),
            Err(ValidationError::MustBePositive { .. })
        ));

        let update = PaymentUpdate {
            amount_cents: None,
            method: Some("  paypal ".to_string()),
        }
        .validated()
        .unwrap();
        assert_eq!(update.method.as_deref(), Some("paypal"));
    }

    #[test]
    fn test_new_shipping_defaults_status() {
        let shipping = NewShipping {
            order_id: "o".to_string(),
            address_id: "a".to_string(),
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(shipping.status.as_deref(), Some("Pending"));
    }

    #[test]
    fn test_new_offer_defaults_stock_and_checks_price() {
        let offer = NewOffer {
            product_id: "p".to_string(),
            manufacturer_id: "m".to_string(),
            price_cents: 500,
            stock: None,
        }
        .validated()
        .unwrap();
        assert_eq!(offer.stock, Some(0));

        let bad = NewOffer {
            price_cents: 0,
            ..offer
        };
        assert!(bad.validated().is_err());
    }

    #[test]
    fn test_new_address_requires_all_fields() {
        let address = NewAddress {
            country: "DE".to_string(),
            city: "Berlin".to_string(),
            zip_code: "".to_string(),
            address_line: "Main 1".to_string(),
        };
        assert!(matches!(
            address.validated(),
            Err(ValidationError::Required { ref field }) if field == "zip_code"
        ));
    }

    #[test]
    fn test_product_update_validation() {
        assert!(matches!(
            ProductUpdate::default().validated(),
            Err(ValidationError::NoFieldsToUpdate)
        ));

        let too_high = ProductUpdate {
            rating: Some(6),
            ..Default::default()
        };
        assert!(too_high.validated().is_err());

        let blank_name = ProductUpdate {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            blank_name.validated(),
            Err(ValidationError::Required { ref field }) if field == "name"
        ));

        let update = ProductUpdate {
            description: Some("  Brass  ".to_string()),
            rating: Some(0),
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(update.description.as_deref(), Some("Brass"));
        assert_eq!(update.rating, Some(0));
    }

    #[test]
    fn test_manufacturer_rating_range() {
        let m = NewManufacturer {
            name: "Acme".to_string(),
            rating: 6,
        };
        assert!(m.validated().is_err());

        let update = ManufacturerUpdate {
            name: None,
            rating: Some(5),
        };
        assert!(update.validated().is_ok());
    }

    #[test]
    fn test_cart_line_total() {
        let line = CartLineView {
            id: "l".to_string(),
            offer_id: "o".to_string(),
            quantity: 3,
            price_cents: 250,
            stock: 10,
            product_name: "Widget".to_string(),
            manufacturer_name: "Acme".to_string(),
        };
        assert_eq!(line.line_total().map(|m| m.cents()), Some(750));

        let huge = CartLineView {
            price_cents: i64::MAX,
            quantity: 2,
            ..line
        };
        assert_eq!(huge.line_total(), None);
    }
}
