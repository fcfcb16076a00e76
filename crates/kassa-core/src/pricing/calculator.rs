//! # Discount Calculator
//!
//! Amount a single rule takes off a cart snapshot. Never negative, never
//! fails: a rule that cannot apply contributes zero.
//!
//! ## Buy X Get Y
//! ```text
//! buy 3 get 1, category "Напитки", unit prices 100 100 80 120 90 90 100 110
//!
//!   cycle      = 3 + 1 = 4
//!   free units = floor(8 / 4) * 1 = 2
//!   cheapest   = 80, 90           → discount 170
//! ```

use tracing::warn;

use crate::cart::Cart;
use crate::money::Money;
use crate::pricing::discount::{BuyXGetY, Discount, DiscountKind};

/// Computes the amount `discount` takes off the cart.
pub fn calculate_discount(discount: &Discount, cart: &Cart, cart_total: Money) -> Money {
    let amount = match &discount.kind {
        DiscountKind::Percent { value } => {
            let base = match discount.category_condition() {
                Some(category) => cart.category_subtotal(category),
                None => cart_total,
            };
            base.percent_of(*value)
        }
        DiscountKind::Fixed { value } => (*value).min(cart_total),
        DiscountKind::BuyXGetY { value } => match discount.category_condition() {
            Some(category) => buy_x_get_y(value, cart, category),
            None => Money::zero(),
        },
        DiscountKind::Unknown => {
            warn!(discount_id = %discount.id, "unknown discount type, amount is zero");
            Money::zero()
        }
    };

    amount.non_negative()
}

/// Sum of the cheapest free units in `category`.
fn buy_x_get_y(rule: &BuyXGetY, cart: &Cart, category: &str) -> Money {
    let cycle = rule.cycle() as i64;
    if cycle == 0 {
        return Money::zero();
    }

    let total_qty = cart.category_quantity(category);
    let free_units = (total_qty / cycle) * rule.get_y as i64;
    if free_units <= 0 {
        return Money::zero();
    }

    let mut prices = cart.unit_prices_in(category);
    prices.sort();
    prices.into_iter().take(free_units as usize).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
