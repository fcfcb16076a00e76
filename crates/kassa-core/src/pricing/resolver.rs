//! # Discount Resolver
//!
//! Combines the applicable automatic rules and the applied promo code into
//! one [`DiscountResult`].
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. applicable = active ∧ automatic ∧ available ∧ conditions pass      │
//! │                  sorted by priority desc (stable)                       │
//! │  2. best       = largest amount among ALL applicable (first wins ties)  │
//! │  3. stackable  = every applicable rule with stackable = true            │
//! │                  (Legacy keeps a stackable best here too)               │
//! │  4. promo      = applied promo code's contribution                      │
//! │  5. total      = Σ contributions, clamped to [0, cart_total]            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;
use crate::pricing::calculator::calculate_discount;
use crate::pricing::condition::ConditionEvaluator;
use crate::pricing::discount::Discount;
use crate::pricing::policy::{PricingPolicy, StackingPolicy};
use crate::pricing::promo::{calculate_promocode, Promocode};

// =============================================================================
// Result Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountSource {
    Automatic,
    Promocode,
}

/// One contribution to the cart's discount, in the order it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedDiscount {
    pub source: DiscountSource,
    pub discount_id: String,
    pub name: String,
    pub description: String,
    pub stackable: bool,
    pub calculated_amount: Money,
}

impl AppliedDiscount {
    fn automatic(discount: &Discount, amount: Money) -> Self {
        AppliedDiscount {
            source: DiscountSource::Automatic,
            discount_id: discount.id.clone(),
            name: discount.name.clone(),
            description: discount.description.clone(),
            stackable: discount.stackable,
            calculated_amount: amount,
        }
    }

    fn promocode(promo: &Promocode, amount: Money) -> Self {
        AppliedDiscount {
            source: DiscountSource::Promocode,
            discount_id: promo.id.clone(),
            name: promo.name.clone(),
            description: promo.description.clone(),
            stackable: true,
            calculated_amount: amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountResult {
    /// Never negative, never above the cart total.
    pub total: Money,
    pub discounts: Vec<AppliedDiscount>,
}

// =============================================================================
// Resolution
// =============================================================================

/// Automatic rules that apply to the cart right now, highest priority first.
pub fn applicable_discounts<'a>(
    discounts: &'a [Discount],
    evaluator: &ConditionEvaluator,
    cart: &Cart,
    cart_total: Money,
    now: NaiveDateTime,
) -> Vec<&'a Discount> {
    let today = now.date();
    let mut applicable: Vec<&Discount> = discounts
        .iter()
        .filter(|d| d.is_active && d.is_automatic && d.is_available(today))
        .filter(|d| evaluator.check_conditions(&d.conditions, cart, cart_total, now))
        .collect();

    // sort_by is stable, so equal priorities keep insertion order
    applicable.sort_by(|a, b| b.priority.cmp(&a.priority));
    applicable
}

/// Resolves the total discount for a cart snapshot.
pub fn resolve_discounts(
    discounts: &[Discount],
    applied_promo: Option<&Promocode>,
    cart: &Cart,
    cart_total: Money,
    now: NaiveDateTime,
    policy: &PricingPolicy,
) -> DiscountResult {
    let evaluator = ConditionEvaluator::new(policy.unknown_conditions);
    let applicable = applicable_discounts(discounts, &evaluator, cart, cart_total, now);

    let priced: Vec<(&Discount, Money)> = applicable
        .into_iter()
        .map(|d| (d, calculate_discount(d, cart, cart_total)))
        .collect();

    let mut best: Option<(&Discount, Money)> = None;
    for &(discount, amount) in &priced {
        let better = match best {
            Some((_, best_amount)) => amount > best_amount,
            None => amount.is_positive(),
        };
        if better {
            best = Some((discount, amount));
        }
    }

    let mut applied = Vec::new();
    if let Some((discount, amount)) = best {
        applied.push(AppliedDiscount::automatic(discount, amount));
    }

    let best_id = best.map(|(d, _)| d.id.as_str());
    for &(discount, amount) in priced.iter().filter(|(d, _)| d.stackable) {
        if policy.stacking == StackingPolicy::ExcludeBest && best_id == Some(discount.id.as_str()) {
            continue;
        }
        if amount.is_positive() {
            applied.push(AppliedDiscount::automatic(discount, amount));
        }
    }

    if let Some(promo) = applied_promo {
        let amount = calculate_promocode(promo, cart, cart_total);
        if amount.is_positive() {
            applied.push(AppliedDiscount::promocode(promo, amount));
        }
    }

    let uncapped: Money = applied.iter().map(|d| d.calculated_amount).sum();
    let total = uncapped.min(cart_total).non_negative();

    debug!(
        %cart_total,
        %uncapped,
        %total,
        contributions = applied.len(),
        "resolved cart discount"
    );

    DiscountResult {
        total,
        discounts: applied,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
