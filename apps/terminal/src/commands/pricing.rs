//! # Pricing Commands
//!
//! Cart pricing, promo codes, combo offers and recommendations. All reads
//! go through one lock acquisition, so a response never mixes an old cart
//! with new rules.

use kassa_core::pricing::{AvailableCombo, DiscountResult, Promocode, Recommendation};
use kassa_core::{CoreError, Money};
use serde::Serialize;
use tracing::debug;

use crate::commands::cart::CartResponse;
use crate::error::ApiError;
use crate::state::{PosSession, PosState};

/// Full pricing breakdown of the current cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPricing {
    pub subtotal: Money,
    pub discount: DiscountResult,
    pub total: Money,
    pub applied_promocode: Option<Promocode>,

    /// Set when the applied code's minimum is not reached yet.
    pub promo_warning: Option<String>,
}

impl From<&PosSession> for CartPricing {
    fn from(session: &PosSession) -> Self {
        let (subtotal, discount) = session.price_cart();
        let promo_warning = session
            .engine
            .validate_promocode_for_cart(subtotal)
            .err()
            .map(|e| e.to_string());

        CartPricing {
            subtotal,
            total: subtotal - discount.total,
            discount,
            applied_promocode: session.engine.applied_promocode().cloned(),
            promo_warning,
        }
    }
}

pub fn get_cart_pricing(state: &PosState) -> Result<CartPricing, ApiError> {
    debug!("get_cart_pricing command");
    state.with_session(|s| CartPricing::from(s))
}

/// Applies a promo code typed by the cashier, replacing any applied code.
///
/// ## Errors
/// `PROMO_REJECTED` with the message to show: not found, used up, expired
/// or not yet valid. A code below its minimum amount is still applied and
/// reported through `promoWarning`.
pub fn apply_promocode(state: &PosState, code: String) -> Result<CartPricing, ApiError> {
    debug!(code = %code, "apply_promocode command");

    state.with_session_mut(|s| {
        s.engine.apply_promocode(&code)?;
        Ok::<CartPricing, ApiError>(CartPricing::from(&*s))
    })?
}

pub fn remove_promocode(state: &PosState) -> Result<CartPricing, ApiError> {
    debug!("remove_promocode command");

    state.with_session_mut(|s| {
        s.engine.remove_promocode();
        CartPricing::from(&*s)
    })
}

pub fn get_available_combos(state: &PosState) -> Result<Vec<AvailableCombo>, ApiError> {
    debug!("get_available_combos command");
    state.with_session(|s| s.engine.get_available_combos(&s.cart, &s.catalog))
}

/// Adds a combo as a single cart line.
///
/// ## Arguments
/// * `combo_id` - Combo to add
/// * `replace_existing` - Drop loose lines for the combo's products
pub fn add_combo_to_cart(
    state: &PosState,
    combo_id: String,
    replace_existing: bool,
) -> Result<CartResponse, ApiError> {
    debug!(combo_id = %combo_id, replace_existing, "add_combo_to_cart command");

    state.with_session_mut(|s| {
        s.add_combo(&combo_id, replace_existing)?;
        Ok::<CartResponse, CoreError>(CartResponse::from(&*s))
    })?
    .map_err(ApiError::from)
}

pub fn get_recommendations(state: &PosState) -> Result<Vec<Recommendation>, ApiError> {
    debug!("get_recommendations command");
    state.with_session(|s| s.engine.get_recommendations(&s.cart, &s.catalog))
}

pub fn get_smart_recommendations(state: &PosState) -> Result<Vec<Recommendation>, ApiError> {
    debug!("get_smart_recommendations command");
    state.with_session(|s| {
        s.engine
            .get_smart_recommendations(&s.cart, &s.catalog, &s.transactions)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::sale::complete_sale;
    use crate::commands::test_support::{state, state_at};
    use crate::error::ErrorCode;
    use crate::state::ConfigState;
    use kassa_core::pricing::DiscountSource;
    use kassa_core::COMBO_CATEGORY;

    #[test]
    fn test_pricing_with_promo() {
        let state = state();
        add_to_cart(&state, "cappuccino".into(), Some(2)).unwrap();
        add_to_cart(&state, "croissant".into(), None).unwrap();

        let pricing = apply_promocode(&state, " summer10 ".into()).unwrap();
        assert_eq!(pricing.applied_promocode.as_ref().unwrap().code, "SUMMER10");
        assert_eq!(pricing.discount.total, Money::from_minor(7650));
        assert_eq!(pricing.total, Money::from_minor(43350));
        assert_eq!(pricing.discount.discounts.len(), 2);
        assert_eq!(pricing.discount.discounts[1].source, DiscountSource::Promocode);
        assert!(pricing.promo_warning.is_none());

        let pricing = remove_promocode(&state).unwrap();
        assert!(pricing.applied_promocode.is_none());
        assert_eq!(pricing.discount.total, Money::from_minor(2550));
    }

    #[test]
    fn test_promo_rejections_and_minimum_warning() {
        let state = state();
        let err = apply_promocode(&state, "NOPE".into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::PromoRejected);
        assert_eq!(err.message, "Промокод не найден");

        add_to_cart(&state, "tea".into(), None).unwrap();
        let pricing = apply_promocode(&state, "WELCOME100".into()).unwrap();
        assert_eq!(pricing.discount.total, Money::zero());
        assert!(pricing
            .promo_warning
            .unwrap()
            .starts_with("Минимальная сумма заказа для промокода"));
    }

    #[test]
    fn test_happy_hour_beats_threshold() {
        let (state, _clock) = state_at(15);
        add_to_cart(&state, "latte".into(), Some(3)).unwrap();

        // 600 ₽: happy hour 15% (90) wins over 5% (30)
        let pricing = get_cart_pricing(&state).unwrap();
        assert_eq!(pricing.discount.total, Money::from_major(90));
        assert_eq!(pricing.discount.discounts[0].discount_id, "happy-hour");
    }

    #[test]
    fn test_combo_offer_and_insertion() {
        let state = state();
        add_to_cart(&state, "cappuccino".into(), None).unwrap();
        add_to_cart(&state, "tea".into(), None).unwrap();

        let offers = get_available_combos(&state).unwrap();
        let breakfast = offers.iter().find(|c| c.combo_id == "breakfast").unwrap();
        assert!(breakfast.is_partial);
        assert_eq!(breakfast.missing_products, vec!["croissant".to_string()]);
        assert_eq!(breakfast.discounted_price, Money::from_minor(28050));

        let cart = add_combo_to_cart(&state, "breakfast".into(), true).unwrap();
        let ids: Vec<_> = cart.items.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], "tea");
        assert!(ids[1].starts_with("combo-breakfast-"));
        assert_eq!(cart.items[1].category, COMBO_CATEGORY);
        assert_eq!(cart.items[1].original_price, Some(Money::from_major(330)));
    }

    #[test]
    fn test_combo_errors() {
        let state = state();
        let err = add_combo_to_cart(&state, "dinner".into(), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        state
            .with_session_mut(|s| s.catalog.take_stock("croissant", 20))
            .unwrap()
            .unwrap();
        let err = add_combo_to_cart(&state, "breakfast".into(), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[test]
    fn test_combo_over_stock_is_refused() {
        let state = state();
        add_to_cart(&state, "croissant".into(), Some(20)).unwrap();

        let err = add_combo_to_cart(&state, "breakfast".into(), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let cart = add_combo_to_cart(&state, "breakfast".into(), true).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert!(cart.items[0].is_combo);
    }

    #[test]
    fn test_recommendations() {
        let state = state();
        add_to_cart(&state, "cappuccino".into(), None).unwrap();

        let recs = get_recommendations(&state).unwrap();
        let ids: Vec<_> = recs.iter().map(|r| r.product.id.as_str()).collect();
        assert_eq!(ids, vec!["croissant", "muffin", "cheesecake"]);

        assert!(get_smart_recommendations(&state).unwrap().is_empty());

        let config = ConfigState::default();
        add_to_cart(&state, "sandwich".into(), Some(2)).unwrap();
        complete_sale(&state, &config, "cash".into()).unwrap();

        add_to_cart(&state, "tea".into(), None).unwrap();
        let smart = get_smart_recommendations(&state).unwrap();
        let ids: Vec<_> = smart.iter().map(|r| r.product.id.as_str()).collect();
        assert_eq!(ids, vec!["sandwich", "cappuccino"]);
        assert_eq!(smart[0].reason, "Популярно: 2 шт. за неделю");
    }
}
