//! # Promo Codes
//!
//! Codes the cashier types in. At most one is applied to a cart at a time,
//! and it stacks with every automatic discount.
//!
//! ## Apply Flow
//! ```text
//! "  summer10 " ─► trim + lowercase ─► match active codes
//!                                        │
//!        none ◄──────────────────────────┤  → PromoError::NotFound
//!        used_count >= max_uses ◄────────┤  → PromoError::Exhausted
//!        valid_to < today ◄──────────────┤  → PromoError::Expired
//!        valid_from > today ◄────────────┤  → PromoError::NotYetValid
//!                                        ▼
//!                                   applied (no usage increment)
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::PromoError;
use crate::money::Money;
use crate::types::Percent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum PromoKind {
    Percent { value: Percent },
    Fixed { value: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Promocode {
    pub id: String,

    /// Matched case-insensitively.
    pub code: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub kind: PromoKind,

    pub is_active: bool,

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

    /// Cart total below this yields no discount.
    #[serde(default)]
    pub min_amount: Money,

    /// Restricts the base to one category's subtotal.
    #[serde(default)]
    pub category_filter: Option<String>,
}

impl Promocode {
    /// Creates an active, unlimited code with no minimum.
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        kind: PromoKind,
    ) -> Self {
        Promocode {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            description: String::new(),
            kind,
            is_active: true,
            max_uses: None,
            used_count: 0,
            valid_from: None,
            valid_to: None,
            min_amount: Money::zero(),
            category_filter: None,
        }
    }

    /// Case-insensitive code comparison, ignoring surrounding whitespace.
    pub fn matches(&self, input: &str) -> bool {
        normalize_code(&self.code) == normalize_code(input)
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.used_count >= max)
    }
}

pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Finds the active promo code matching `input`.
pub fn find_promocode<'a>(promocodes: &'a [Promocode], input: &str) -> Option<&'a Promocode> {
    promocodes.iter().find(|p| p.is_active && p.matches(input))
}

/// Checks usage and the validity dates of a found code for `today`.
pub fn validate_promocode(promo: &Promocode, today: NaiveDate) -> Result<(), PromoError> {
    if promo.is_exhausted() {
        return Err(PromoError::Exhausted);
    }
    if promo.valid_to.is_some_and(|to| to < today) {
        return Err(PromoError::Expired);
    }
    if promo.valid_from.is_some_and(|from| from > today) {
        return Err(PromoError::NotYetValid);
    }
    Ok(())
}

/// Reports whether the cart reaches the promo's minimum amount.
pub fn validate_promocode_for_cart(promo: &Promocode, cart_total: Money) -> Result<(), PromoError> {
    if cart_total < promo.min_amount {
        return Err(PromoError::BelowMinimum {
            required: promo.min_amount,
            shortfall: promo.min_amount - cart_total,
        });
    }
    Ok(())
}

/// Amount the promo takes off the cart. Zero below `min_amount`.
pub fn calculate_promocode(promo: &Promocode, cart: &Cart, cart_total: Money) -> Money {
    if validate_promocode_for_cart(promo, cart_total).is_err() {
        return Money::zero();
    }

    let base = match &promo.category_filter {
        Some(category) => cart.category_subtotal(category),
        None => cart_total,
    };

    let amount = match &promo.kind {
        PromoKind::Percent { value } => base.percent_of(*value),
        PromoKind::Fixed { value } => (*value).min(base),
    };
    amount.non_negative()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn summer() -> Promocode {
        Promocode::new(
            "p1",
            "SUMMER10",
            "Лето",
            PromoKind::Percent { value: Percent::from_percent(10) },
        )
    }

    #[test]
    fn test_find_is_case_insensitive_and_active_only() {
        let mut codes = vec![summer()];
        assert!(find_promocode(&codes, "  summer10 ").is_some());
        assert!(find_promocode(&codes, "SUMMER1").is_none());

        codes[0].is_active = false;
        assert!(find_promocode(&codes, "SUMMER10").is_none());
    }

    #[test]
    fn test_validate_rejections() {
        let today = day(15);

        let mut promo = summer();
        assert_eq!(validate_promocode(&promo, today), Ok(()));

        promo.max_uses = Some(5);
        promo.used_count = 5;
        assert_eq!(validate_promocode(&promo, today), Err(PromoError::Exhausted));

        let mut promo = summer();
        promo.valid_to = Some(day(14));
        assert_eq!(validate_promocode(&promo, today), Err(PromoError::Expired));
        promo.valid_to = Some(day(15));
        assert_eq!(validate_promocode(&promo, today), Ok(()));

        let mut promo = summer();
        promo.valid_from = Some(day(16));
        assert_eq!(validate_promocode(&promo, today), Err(PromoError::NotYetValid));
    }

    #[test]
    fn test_calculate_respects_minimum() {
        let mut promo = summer();
        promo.min_amount = Money::from_major(1000);

        assert_eq!(
            calculate_promocode(&promo, &Cart::new(), Money::from_major(999)),
            Money::zero()
        );
        assert_eq!(
            calculate_promocode(&promo, &Cart::new(), Money::from_major(1000)),
            Money::from_major(100)
        );
        assert_eq!(
            validate_promocode_for_cart(&promo, Money::from_major(700)),
            Err(PromoError::BelowMinimum {
                required: Money::from_major(1000),
                shortfall: Money::from_major(300),
            })
        );
    }

    #[test]
    fn test_calculate_with_category_filter() {
        let mut cart = Cart::new();
        cart.add_product(&Product::new("tea", "Чай", Money::from_major(200), 5, "Напитки"), 2)
            .unwrap();
        cart.add_product(&Product::new("cake", "Торт", Money::from_major(600), 5, "Выпечка"), 1)
            .unwrap();

        let mut promo = summer();
        promo.category_filter = Some("Напитки".into());
        assert_eq!(
            calculate_promocode(&promo, &cart, cart.subtotal()),
            Money::from_major(40)
        );

        promo.kind = PromoKind::Fixed { value: Money::from_major(500) };
        assert_eq!(
            calculate_promocode(&promo, &cart, cart.subtotal()),
            Money::from_major(400)
        );
    }
}
