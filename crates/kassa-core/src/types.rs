//! # Domain Types
//!
//! Core domain types shared by the cart and the pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (product,   │   │  id (UUID)      │       │
//! │  │  price, stock   │   │   combo, acc.)  │   │  items (frozen) │       │
//! │  │  category       │   │  price, qty     │   │  total, date    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Percent      │   │   TimeOfDay     │   │ PaymentMethod   │       │
//! │  │  bps (u32)      │   │  "HH:MM"        │   │  Cash, Card,    │       │
//! │  │  500 = 5%       │   │  local time     │   │  Transfer       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Percent
// =============================================================================

/// A percentage in basis points (bps).
///
/// 1 basis point = 0.01%, so `500` is 5% and `10000` is 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// 100%.
    pub const FULL: Percent = Percent(10_000);

    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from whole percent (`5` = 5%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Percent(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns `100% - self`, saturating at zero.
    #[inline]
    pub const fn complement(&self) -> Self {
        Percent(Self::FULL.0.saturating_sub(self.0))
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Time of Day
// =============================================================================

/// A local wall-clock time with minute precision, written as `HH:MM`.
///
/// Comparisons ignore seconds, so a range ending at `10:00` still matches
/// at `10:00:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    /// Creates a time of day, or `None` when hour/minute are out of range.
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(TimeOfDay {
            minutes: hour as u16 * 60 + minute as u16,
        })
    }

    /// Creates a time of day, clamping out-of-range components to 23:59.
    pub const fn at(hour: u8, minute: u8) -> Self {
        let hour = if hour > 23 { 23 } else { hour };
        let minute = if minute > 59 { 59 } else { minute };
        TimeOfDay {
            minutes: hour as u16 * 60 + minute as u16,
        }
    }

    /// Truncates a local date-time to its `HH:MM`.
    pub fn of(now: &NaiveDateTime) -> Self {
        TimeOfDay::at(now.hour() as u8, now.minute() as u8)
    }

    /// Hour component (0-23).
    pub const fn hour(&self) -> u8 {
        (self.minutes / 60) as u8
    }

    /// Minute component (0-59).
    pub const fn minute(&self) -> u8 {
        (self.minutes % 60) as u8
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "time".to_string(),
            reason: format!("expected HH:MM, got '{}'", s),
        };

        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;

        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale. Owned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Units on hand.
    pub stock: i64,

    /// Category name, matched verbatim by category conditions.
    pub category: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    #[serde(default)]
    pub barcode: Option<String>,
}

impl Product {
    /// Creates a product without a barcode.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        stock: i64,
        category: impl Into<String>,
    ) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            category: category.into(),
            barcode: None,
        }
    }

    /// Checks if at least one unit is on hand.
    #[inline]
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// Snapshot of a product folded into a combo line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct IncludedProduct {
    pub id: String,
    pub name: String,
    pub price: Money,
}

impl From<&Product> for IncludedProduct {
    fn from(product: &Product) -> Self {
        IncludedProduct {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
        }
    }
}

/// A line in the cart.
///
/// `id` is a product id for loose items, `combo-{comboId}-{millis}` for
/// combo lines, or an accessory id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub name: String,

    /// Unit price at the time the line was added (frozen).
    pub price: Money,

    pub quantity: i64,
    pub category: String,

    #[serde(default)]
    pub is_combo: bool,

    #[serde(default)]
    pub is_accessory: bool,

    /// Undiscounted unit price, set on combo lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,

    /// Amount taken off `original_price`, set on combo lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Money>,

    /// Constituents of a combo line, frozen for receipts and audit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_products: Vec<IncludedProduct>,
}

impl CartLine {
    /// Creates a loose line from a product, freezing its price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            category: product.category.clone(),
            is_combo: false,
            is_accessory: false,
            original_price: None,
            discount: None,
            included_products: Vec::new(),
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Product ids this line stands for: its own id, or a combo's constituents.
    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        let own = (!self.is_combo).then_some(self.id.as_str());
        own.into_iter()
            .chain(self.included_products.iter().map(|p| p.id.as_str()))
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Bank transfer / QR payment.
    Transfer,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Transfer => write!(f, "transfer"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "transfer" | "qr" => Ok(PaymentMethod::Transfer),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: vec!["cash".into(), "card".into(), "transfer".into()],
            }),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Return,
}

/// A recorded sale. Immutable once created; the log is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    /// Cart lines at the time of sale (frozen).
    pub items: Vec<CartLine>,
    /// Amount paid after discounts.
    pub total: Money,
    #[serde(default)]
    pub discount_total: Money,
    pub payment_method: PaymentMethod,
    /// Local wall-clock time of the sale.
    #[ts(as = "String")]
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl Transaction {
    /// Creates a sale record with a fresh UUID.
    pub fn sale(
        items: Vec<CartLine>,
        total: Money,
        discount_total: Money,
        payment_method: PaymentMethod,
        date: NaiveDateTime,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            items,
            total,
            discount_total,
            payment_method,
            date,
            kind: TransactionKind::Sale,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_percent_from_percent() {
        let rate = Percent::from_percent(15);
        assert_eq!(rate.bps(), 1500);
        assert!((rate.percentage() - 15.0).abs() < 0.001);
        assert_eq!(rate.complement(), Percent::from_percent(85));
        assert_eq!(Percent::from_bps(12_000).complement(), Percent::zero());
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent::from_percent(5).to_string(), "5%");
        assert_eq!(Percent::from_bps(750).to_string(), "7.50%");
    }

    #[test]
    fn test_time_of_day_parsing() {
        let t: TimeOfDay = "09:05".parse().unwrap();
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 5);
        assert_eq!(t.to_string(), "09:05");

        assert!("9:05".parse::<TimeOfDay>().is_ok());
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("12:60".parse::<TimeOfDay>().is_err());
        assert!("1205".parse::<TimeOfDay>().is_err());
        assert!("12:5".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_time_of_day_serde_as_string() {
        let t = TimeOfDay::at(22, 30);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"22:30\"");
        let back: TimeOfDay = serde_json::from_str("\"22:30\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }

    #[test]
    fn test_time_of_day_ignores_seconds() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 59)
            .unwrap();
        assert_eq!(TimeOfDay::of(&now), TimeOfDay::at(10, 0));
    }

    #[test]
    fn test_combo_line_product_ids() {
        let mut line = CartLine::from_product(
            &Product::new("p1", "Кофе", Money::from_major(150), 5, "Напитки"),
            1,
        );
        assert_eq!(line.product_ids().collect::<Vec<_>>(), vec!["p1"]);

        line.id = "combo-c1-1".to_string();
        line.is_combo = true;
        line.included_products = vec![
            IncludedProduct {
                id: "p1".into(),
                name: "Кофе".into(),
                price: Money::from_major(150),
            },
            IncludedProduct {
                id: "p2".into(),
                name: "Круассан".into(),
                price: Money::from_major(120),
            },
        ];
        assert_eq!(line.product_ids().collect::<Vec<_>>(), vec!["p1", "p2"]);
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("Cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("qr".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
        assert!("barter".parse::<PaymentMethod>().is_err());
    }
}
