//! # Conditions
//!
//! Predicates a discount rule attaches as an AND-list. Each one is checked
//! against the cart snapshot, the cart total and local wall-clock time.
//!
//! ## Wire Shape
//! ```text
//! { "type": "min_amount",        "value": 50000 }
//! { "type": "min_quantity",      "value": 3 }
//! { "type": "specific_products", "value": ["p1", "p2"] }
//! { "type": "category",          "value": "Напитки" }
//! { "type": "time_range",        "value": { "from": "14:00", "to": "16:00" } }
//! { "type": "day_of_week",       "value": [0, 6] }          // 0 = Sunday
//! { "type": "first_order" }
//! { "type": "customer_type",     "value": "vip" }
//! { "type": "<anything else>" }  → Unknown
//! ```

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;
use crate::pricing::policy::UnknownConditionPolicy;
use crate::types::TimeOfDay;

// =============================================================================
// Condition
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum Condition {
    /// Cart total is at least `value`.
    MinAmount { value: Money },

    /// Summed line quantity is at least `value`.
    MinQuantity { value: i64 },

    /// Some cart line id is listed.
    SpecificProducts { value: Vec<String> },

    /// Some cart line belongs to the category.
    Category { value: String },

    /// Local `HH:MM` falls inside the range.
    TimeRange { value: TimeRange },

    /// Local weekday (0 = Sunday .. 6 = Saturday) is listed.
    DayOfWeek { value: Vec<u8> },

    /// Customer's first order. No customer context exists at the register.
    FirstOrder,

    /// Customer segment. No customer context exists at the register.
    CustomerType { value: String },

    /// A type tag this build does not recognise.
    #[serde(other)]
    Unknown,
}

/// An inclusive `HH:MM` window. `from > to` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimeRange {
    #[ts(type = "string")]
    pub from: TimeOfDay,
    #[ts(type = "string")]
    pub to: TimeOfDay,
}

impl TimeRange {
    pub fn new(from: TimeOfDay, to: TimeOfDay) -> Self {
        TimeRange { from, to }
    }

    /// Checks whether `time` falls inside the window.
    ///
    /// ```text
    /// 14:00–16:00   14:00 ✓  16:00 ✓  16:01 ✗
    /// 22:00–02:00   23:30 ✓  01:00 ✓  12:00 ✗
    /// ```
    pub fn contains(&self, time: TimeOfDay) -> bool {
        if self.from <= self.to {
            self.from <= time && time <= self.to
        } else {
            time >= self.from || time <= self.to
        }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Checks conditions under a given policy for unrecognised types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionEvaluator {
    pub unknown: UnknownConditionPolicy,
}

impl ConditionEvaluator {
    pub fn new(unknown: UnknownConditionPolicy) -> Self {
        ConditionEvaluator { unknown }
    }

    /// Checks a single condition.
    pub fn check(
        &self,
        condition: &Condition,
        cart: &Cart,
        cart_total: Money,
        now: NaiveDateTime,
    ) -> bool {
        let passed = match condition {
            Condition::MinAmount { value } => cart_total >= *value,
            Condition::MinQuantity { value } => cart.total_quantity() >= *value,
            Condition::SpecificProducts { value } => {
                cart.lines().iter().any(|line| value.contains(&line.id))
            }
            Condition::Category { value } => cart.lines().iter().any(|line| line.category == *value),
            Condition::TimeRange { value } => value.contains(TimeOfDay::of(&now)),
            Condition::DayOfWeek { value } => {
                let today = now.weekday().num_days_from_sunday() as u8;
                value.contains(&today)
            }
            Condition::FirstOrder | Condition::CustomerType { .. } => {
                trace!(?condition, "no customer context, condition passes");
                true
            }
            Condition::Unknown => {
                let passed = self.unknown == UnknownConditionPolicy::Pass;
                warn!(policy = %self.unknown, passed, "unknown condition type");
                passed
            }
        };

        trace!(?condition, passed, "condition checked");
        passed
    }

    /// ANDs a condition list. An empty list passes.
    pub fn check_conditions(
        &self,
        conditions: &[Condition],
        cart: &Cart,
        cart_total: Money,
        now: NaiveDateTime,
    ) -> bool {
        conditions
            .iter()
            .all(|condition| self.check(condition, cart, cart_total, now))
    }
}

/// Checks a single condition with the default (fail-open) policy.
pub fn check_condition(
    condition: &Condition,
    cart: &Cart,
    cart_total: Money,
    now: NaiveDateTime,
) -> bool {
    ConditionEvaluator::default().check(condition, cart, cart_total, now)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        // 2024-03-15 is a Friday
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_product(
            &Product::new("tea", "Чай", Money::from_major(100), 10, "Напитки"),
            2,
        )
        .unwrap();
        cart.add_product(
            &Product::new("cake", "Торт", Money::from_major(300), 10, "Выпечка"),
            1,
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_min_amount_and_quantity() {
        let cart = cart();
        let total = cart.subtotal();
        let now = at(12, 0);

        let met = Condition::MinAmount { value: Money::from_major(500) };
        let unmet = Condition::MinAmount { value: Money::from_major(501) };
        assert!(check_condition(&met, &cart, total, now));
        assert!(!check_condition(&unmet, &cart, total, now));

        assert!(check_condition(&Condition::MinQuantity { value: 3 }, &cart, total, now));
        assert!(!check_condition(&Condition::MinQuantity { value: 4 }, &cart, total, now));
    }

    #[test]
    fn test_category_and_specific_products() {
        let cart = cart();
        let total = cart.subtotal();
        let now = at(12, 0);

        let drinks = Condition::Category { value: "Напитки".into() };
        let meat = Condition::Category { value: "Мясо".into() };
        assert!(check_condition(&drinks, &cart, total, now));
        assert!(!check_condition(&meat, &cart, total, now));

        let listed = Condition::SpecificProducts { value: vec!["x".into(), "cake".into()] };
        let absent = Condition::SpecificProducts { value: vec!["x".into()] };
        assert!(check_condition(&listed, &cart, total, now));
        assert!(!check_condition(&absent, &cart, total, now));
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let cart = cart();
        let happy_hour = Condition::TimeRange {
            value: TimeRange::new(TimeOfDay::at(14, 0), TimeOfDay::at(16, 0)),
        };

        assert!(!check_condition(&happy_hour, &cart, Money::zero(), at(13, 59)));
        assert!(check_condition(&happy_hour, &cart, Money::zero(), at(14, 0)));
        assert!(check_condition(&happy_hour, &cart, Money::zero(), at(16, 0)));
        assert!(!check_condition(&happy_hour, &cart, Money::zero(), at(16, 1)));
    }

    #[test]
    fn test_time_range_wraps_midnight() {
        let night = TimeRange::new(TimeOfDay::at(22, 0), TimeOfDay::at(2, 0));
        assert!(night.contains(TimeOfDay::at(23, 30)));
        assert!(night.contains(TimeOfDay::at(0, 0)));
        assert!(night.contains(TimeOfDay::at(2, 0)));
        assert!(!night.contains(TimeOfDay::at(12, 0)));
        assert!(!night.contains(TimeOfDay::at(21, 59)));
    }

    #[test]
    fn test_day_of_week() {
        let cart = cart();
        let weekend = Condition::DayOfWeek { value: vec![0, 6] };
        let friday = Condition::DayOfWeek { value: vec![5] };

        assert!(!check_condition(&weekend, &cart, Money::zero(), at(12, 0)));
        assert!(check_condition(&friday, &cart, Money::zero(), at(12, 0)));
    }

    #[test]
    fn test_unknown_condition_follows_policy() {
        let cart = cart();
        let unknown: Condition = serde_json::from_str(r#"{"type":"loyalty_tier","value":3}"#).unwrap();
        assert_eq!(unknown, Condition::Unknown);

        let open = ConditionEvaluator::new(UnknownConditionPolicy::Pass);
        let closed = ConditionEvaluator::new(UnknownConditionPolicy::Reject);
        assert!(open.check(&unknown, &cart, Money::zero(), at(12, 0)));
        assert!(!closed.check(&unknown, &cart, Money::zero(), at(12, 0)));
    }

    #[test]
    fn test_customer_conditions_pass() {
        let cart = cart();
        assert!(check_condition(&Condition::FirstOrder, &cart, Money::zero(), at(12, 0)));
        assert!(check_condition(
            &Condition::CustomerType { value: "vip".into() },
            &cart,
            Money::zero(),
            at(12, 0)
        ));
    }

    #[test]
    fn test_check_conditions_is_and() {
        let cart = cart();
        let total = cart.subtotal();
        let evaluator = ConditionEvaluator::default();

        assert!(evaluator.check_conditions(&[], &cart, total, at(12, 0)));
        assert!(evaluator.check_conditions(
            &[
                Condition::MinAmount { value: Money::from_major(100) },
                Condition::Category { value: "Выпечка".into() },
            ],
            &cart,
            total,
            at(12, 0)
        ));
        assert!(!evaluator.check_conditions(
            &[
                Condition::MinAmount { value: Money::from_major(100) },
                Condition::Category { value: "Мясо".into() },
            ],
            &cart,
            total,
            at(12, 0)
        ));
    }

    #[test]
    fn test_wire_shape() {
        let condition = Condition::TimeRange {
            value: TimeRange::new(TimeOfDay::at(14, 0), TimeOfDay::at(16, 0)),
        };
        let json = serde_json::to_string(&condition).unwrap();
        assert_eq!(json, r#"{"type":"time_range","value":{"from":"14:00","to":"16:00"}}"#);

        let first: Condition = serde_json::from_str(r#"{"type":"first_order","value":true}"#).unwrap();
        assert_eq!(first, Condition::FirstOrder);
    }
}
