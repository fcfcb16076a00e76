//! # Discount Rules
//!
//! Automatic discount definitions managed from the admin screens.
//!
//! `kind` carries the per-type value, so a percent rule cannot hold a
//! buy-X-get-Y pair and vice versa:
//!
//! ```text
//! { "type": "percent",     "value": 500 }                       // 5%
//! { "type": "fixed",       "value": 10000 }                     // 100.00 ₽
//! { "type": "buy_x_get_y", "value": { "buyX": 3, "getY": 1 } }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::condition::Condition;
use crate::types::Percent;

/// The per-type value of a discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountKind {
    /// Percent of the cart total, or of one category's subtotal.
    Percent { value: Percent },

    /// Flat amount, capped at the cart total.
    Fixed { value: Money },

    /// Every `buy_x + get_y` units of a category, the `get_y` cheapest are free.
    BuyXGetY { value: BuyXGetY },

    /// A type tag this build does not recognise. Always discounts zero.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BuyXGetY {
    pub buy_x: u32,
    pub get_y: u32,
}

impl BuyXGetY {
    /// Units in one buy-and-get cycle.
    pub fn cycle(&self) -> u32 {
        self.buy_x.saturating_add(self.get_y)
    }
}

/// An automatic discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Discount {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub kind: DiscountKind,

    /// AND-list; empty means always applicable.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    pub is_active: bool,

    /// Evaluated on every pricing pass (manual rules are not).
    #[serde(default = "default_true")]
    pub is_automatic: bool,

    /// Higher is preferred.
    #[serde(default)]
    pub priority: i32,

    /// May apply alongside the best discount.
    #[serde(default)]
    pub stackable: bool,

    #[serde(default)]
    pub max_uses: Option<u32>,

    #[serde(default)]
    pub used_count: u32,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<NaiveDate>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_to: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

impl Discount {
    /// Creates an active, automatic, non-stackable rule with no conditions.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DiscountKind) -> Self {
        Discount {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            kind,
            conditions: Vec::new(),
            is_active: true,
            is_automatic: true,
            priority: 0,
            stackable: false,
            max_uses: None,
            used_count: 0,
            valid_from: None,
            valid_to: None,
        }
    }

    /// The first `category` condition, which scopes percent and buy-X-get-Y rules.
    pub fn category_condition(&self) -> Option<&str> {
        self.conditions.iter().find_map(|c| match c {
            Condition::Category { value } => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.used_count >= max)
    }

    /// Checks the validity window and the usage limit for `today`.
    pub fn is_available(&self, today: NaiveDate) -> bool {
        !self.is_exhausted()
            && self.valid_from.map_or(true, |from| from <= today)
            && self.valid_to.map_or(true, |to| today <= to)
    }
}
