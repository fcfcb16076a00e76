//! # Pricing Engine
//!
//! Owns the rule collections (automatic discounts, promo codes, combos,
//! pairings), the applied promo code and the clock, and exposes every
//! pricing operation as a method. Callers pass the cart, catalog and sale
//! log explicitly; nothing is read from globals.
//!
//! ## State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PricingEngine                                                          │
//! │  ├── discounts[]          admin CRUD, usage counted by record_sale      │
//! │  ├── promocodes[]         admin CRUD, usage counted by record_sale      │
//! │  ├── combos[]             admin CRUD                                    │
//! │  ├── pairings             merchandising table                           │
//! │  ├── applied_promocode    at most one, by id                            │
//! │  ├── policy               stacking, unknown conditions, limits          │
//! │  └── clock                Arc<dyn Clock>                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read methods take `&self` and never mutate, so a pricing pass can be
//! repeated with identical results until the clock moves.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::clock::Clock;
use crate::error::{CoreError, CoreResult, PromoError, ValidationError};
use crate::money::Money;
use crate::pricing::calculator::calculate_discount;
use crate::pricing::combo::{self, AvailableCombo, Combo};
use crate::pricing::condition::ConditionEvaluator;
use crate::pricing::discount::Discount;
use crate::pricing::policy::PricingPolicy;
use crate::pricing::promo::{self, normalize_code, Promocode};
use crate::pricing::recommend::{self, Pairings, Recommendation};
use crate::pricing::resolver::{self, DiscountResult, DiscountSource};
use crate::pricing::snapshot::{PricingSnapshot, SNAPSHOT_VERSION};
use crate::pricing::template::DiscountTemplate;
use crate::types::{CartLine, Transaction};
use crate::validation::{validate_combo, validate_discount, validate_promocode};

#[derive(Debug, Clone)]
pub struct PricingEngine {
    discounts: Vec<Discount>,
    promocodes: Vec<Promocode>,
    combos: Vec<Combo>,
    pairings: Pairings,
    applied_promocode: Option<String>,
    policy: PricingPolicy,
    clock: Arc<dyn Clock>,
}

impl PricingEngine {
    /// Creates an engine with no rules.
    pub fn new(policy: PricingPolicy, clock: Arc<dyn Clock>) -> Self {
        PricingEngine {
            discounts: Vec::new(),
            promocodes: Vec::new(),
            combos: Vec::new(),
            pairings: Pairings::new(),
            applied_promocode: None,
            policy,
            clock,
        }
    }

    /// Creates an engine holding a previously exported state.
    pub fn from_snapshot(
        snapshot: PricingSnapshot,
        policy: PricingPolicy,
        clock: Arc<dyn Clock>,
    ) -> CoreResult<Self> {
        let mut engine = PricingEngine::new(policy, clock);
        engine.restore(snapshot)?;
        Ok(engine)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Current local time from the injected clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    pub fn promocodes(&self) -> &[Promocode] {
        &self.promocodes
    }

    pub fn combos(&self) -> &[Combo] {
        &self.combos
    }

    pub fn combo(&self, id: &str) -> Option<&Combo> {
        self.combos.iter().find(|c| c.id == id)
    }

    pub fn pairings(&self) -> &Pairings {
        &self.pairings
    }

    /// The applied promo code, if it still exists and is active.
    pub fn applied_promocode(&self) -> Option<&Promocode> {
        let id = self.applied_promocode.as_deref()?;
        self.promocodes.iter().find(|p| p.id == id && p.is_active)
    }

    // =========================================================================
    // Automatic Discounts
    // =========================================================================

    /// Automatic rules that apply right now, highest priority first.
    pub fn applicable_discounts(&self, cart: &Cart, cart_total: Money) -> Vec<&Discount> {
        let evaluator = ConditionEvaluator::new(self.policy.unknown_conditions);
        resolver::applicable_discounts(&self.discounts, &evaluator, cart, cart_total, self.now())
    }

    /// Amount one rule takes off the cart, ignoring its conditions.
    pub fn calculate_discount(&self, discount: &Discount, cart: &Cart, cart_total: Money) -> Money {
        calculate_discount(discount, cart, cart_total)
    }

    /// Resolves the cart's total discount, applied promo code included.
    pub fn get_total_discount(&self, cart: &Cart, cart_total: Money) -> DiscountResult {
        debug!(lines = cart.len(), %cart_total, "pricing pass");
        resolver::resolve_discounts(
            &self.discounts,
            self.applied_promocode(),
            cart,
            cart_total,
            self.now(),
            &self.policy,
        )
    }

    // =========================================================================
    // Promo Codes
    // =========================================================================

    /// Applies a typed code, replacing any code applied before.
    pub fn apply_promocode(&mut self, code: &str) -> Result<Promocode, PromoError> {
        let found = promo::find_promocode(&self.promocodes, code).ok_or_else(|| {
            debug!(code, "promo code not found");
            PromoError::NotFound
        })?;

        if let Err(err) = promo::validate_promocode(found, self.clock.today()) {
            debug!(code, error = %err, "promo code rejected");
            return Err(err);
        }

        let applied = found.clone();
        info!(promo_id = %applied.id, code = %applied.code, "promo code applied");
        self.applied_promocode = Some(applied.id.clone());
        Ok(applied)
    }

    pub fn remove_promocode(&mut self) {
        if let Some(id) = self.applied_promocode.take() {
            info!(promo_id = %id, "promo code removed");
        }
    }

    /// Contribution of the applied promo code, zero when none is applied.
    pub fn calculate_promocode(&self, cart: &Cart, cart_total: Money) -> Money {
        self.applied_promocode()
            .map_or(Money::zero(), |p| promo::calculate_promocode(p, cart, cart_total))
    }

    /// Checks the applied promo code's minimum amount against the cart.
    pub fn validate_promocode_for_cart(&self, cart_total: Money) -> Result<(), PromoError> {
        match self.applied_promocode() {
            Some(p) => promo::validate_promocode_for_cart(p, cart_total),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Combos & Recommendations
    // =========================================================================

    pub fn get_available_combos(&self, cart: &Cart, catalog: &Catalog) -> Vec<AvailableCombo> {
        combo::available_combos(&self.combos, cart, catalog, self.now())
    }

    /// Adds a combo as one cart line; see [`combo::add_combo_to_cart`].
    pub fn add_combo_to_cart(
        &self,
        combo_id: &str,
        cart: &mut Cart,
        catalog: &Catalog,
        replace_existing: bool,
    ) -> Option<CartLine> {
        combo::add_combo_to_cart(&self.combos, combo_id, cart, catalog, self.now(), replace_existing)
    }

    pub fn get_recommendations(&self, cart: &Cart, catalog: &Catalog) -> Vec<Recommendation> {
        recommend::pairing_recommendations(
            &self.pairings,
            cart,
            catalog,
            self.policy.max_recommendations,
        )
    }

    pub fn get_smart_recommendations(
        &self,
        cart: &Cart,
        catalog: &Catalog,
        transactions: &[Transaction],
    ) -> Vec<Recommendation> {
        recommend::smart_recommendations(
            cart,
            catalog,
            transactions,
            self.now(),
            self.policy.smart_window_days,
            self.policy.max_recommendations,
        )
    }

    // =========================================================================
    // Admin: Discounts
    // =========================================================================

    pub fn add_discount(&mut self, discount: Discount) -> CoreResult<()> {
        validate_discount(&discount)?;
        if self.discounts.iter().any(|d| d.id == discount.id) {
            return Err(duplicate("discount id", &discount.id));
        }

        info!(discount_id = %discount.id, name = %discount.name, "discount added");
        self.discounts.push(discount);
        Ok(())
    }

    /// Replaces the rule with the same id, keeping its position.
    pub fn update_discount(&mut self, discount: Discount) -> CoreResult<()> {
        validate_discount(&discount)?;
        let slot = self
            .discounts
            .iter_mut()
            .find(|d| d.id == discount.id)
            .ok_or_else(|| CoreError::DiscountNotFound(discount.id.clone()))?;

        info!(discount_id = %discount.id, "discount updated");
        *slot = discount;
        Ok(())
    }

    pub fn delete_discount(&mut self, id: &str) -> CoreResult<Discount> {
        let index = self
            .discounts
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| CoreError::DiscountNotFound(id.to_string()))?;

        info!(discount_id = id, "discount deleted");
        Ok(self.discounts.remove(index))
    }

    /// Flips `is_active` and returns the new state.
    pub fn toggle_discount(&mut self, id: &str) -> CoreResult<bool> {
        let discount = self
            .discounts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| CoreError::DiscountNotFound(id.to_string()))?;

        discount.is_active = !discount.is_active;
        info!(discount_id = id, active = discount.is_active, "discount toggled");
        Ok(discount.is_active)
    }

    /// Adds a rule seeded from a template under a fresh id.
    pub fn create_discount_from_template(
        &mut self,
        template: DiscountTemplate,
    ) -> CoreResult<Discount> {
        let discount = template.build(Uuid::new_v4().to_string());
        self.add_discount(discount.clone())?;
        Ok(discount)
    }

    // =========================================================================
    // Admin: Promo Codes, Combos, Pairings
    // =========================================================================

    /// Adds a promo code. Codes must be unique regardless of case.
    pub fn add_promocode(&mut self, promo: Promocode) -> CoreResult<()> {
        validate_promocode(&promo)?;
        let code = normalize_code(&promo.code);
        if self.promocodes.iter().any(|p| normalize_code(&p.code) == code) {
            return Err(duplicate("code", &promo.code));
        }
        if self.promocodes.iter().any(|p| p.id == promo.id) {
            return Err(duplicate("promo code id", &promo.id));
        }

        info!(promo_id = %promo.id, code = %promo.code, "promo code added");
        self.promocodes.push(promo);
        Ok(())
    }

    /// Deletes a promo code, un-applying it if it was applied.
    pub fn delete_promocode(&mut self, id: &str) -> CoreResult<Promocode> {
        let index = self
            .promocodes
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::PromocodeNotFound(id.to_string()))?;

        if self.applied_promocode.as_deref() == Some(id) {
            self.applied_promocode = None;
        }

        info!(promo_id = id, "promo code deleted");
        Ok(self.promocodes.remove(index))
    }

    pub fn add_combo(&mut self, combo: Combo) -> CoreResult<()> {
        validate_combo(&combo)?;
        if self.combos.iter().any(|c| c.id == combo.id) {
            return Err(duplicate("combo id", &combo.id));
        }

        info!(combo_id = %combo.id, name = %combo.name, "combo added");
        self.combos.push(combo);
        Ok(())
    }

    pub fn delete_combo(&mut self, id: &str) -> CoreResult<Combo> {
        let index = self
            .combos
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::ComboNotFound(id.to_string()))?;

        info!(combo_id = id, "combo deleted");
        Ok(self.combos.remove(index))
    }

    pub fn set_pairings(&mut self, pairings: Pairings) {
        info!(products = pairings.len(), "pairings replaced");
        self.pairings = pairings;
    }

    // =========================================================================
    // Usage Tracking
    // =========================================================================

    /// Counts one use of every rule and promo code that priced a completed
    /// sale, then clears the applied promo code.
    pub fn record_sale(&mut self, result: &DiscountResult) {
        let mut seen = HashSet::new();
        for applied in &result.discounts {
            if !seen.insert((applied.source, applied.discount_id.as_str())) {
                continue;
            }

            match applied.source {
                DiscountSource::Automatic => {
                    if let Some(d) = self.discounts.iter_mut().find(|d| d.id == applied.discount_id) {
                        d.used_count = d.used_count.saturating_add(1);
                    }
                }
                DiscountSource::Promocode => {
                    if let Some(p) = self.promocodes.iter_mut().find(|p| p.id == applied.discount_id) {
                        p.used_count = p.used_count.saturating_add(1);
                    }
                }
            }
        }

        debug!(recorded = seen.len(), "discount usage recorded");
        self.applied_promocode = None;
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Exports the full rule state.
    pub fn snapshot(&self) -> PricingSnapshot {
        PricingSnapshot {
            version: SNAPSHOT_VERSION,
            discounts: self.discounts.clone(),
            promocodes: self.promocodes.clone(),
            combos: self.combos.clone(),
            pairings: self.pairings.clone(),
            applied_promocode: self.applied_promocode.clone(),
        }
    }

    /// Replaces the rule state with `snapshot`. Policy and clock are kept.
    ///
    /// Rules are taken as stored, without the checks the admin operations
    /// run; use [`PricingEngine::import`] for documents from outside.
    pub fn restore(&mut self, snapshot: PricingSnapshot) -> CoreResult<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CoreError::UnsupportedSnapshot {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let applied = snapshot
            .applied_promocode
            .filter(|id| snapshot.promocodes.iter().any(|p| &p.id == id));
        if applied.is_none() && self.applied_promocode.is_some() {
            debug!("applied promo code cleared by restore");
        }

        self.discounts = snapshot.discounts;
        self.promocodes = snapshot.promocodes;
        self.combos = snapshot.combos;
        self.pairings = snapshot.pairings;
        self.applied_promocode = applied;

        info!(
            discounts = self.discounts.len(),
            promocodes = self.promocodes.len(),
            combos = self.combos.len(),
            "pricing state restored"
        );
        Ok(())
    }

    /// Replaces the rule state with `snapshot` once every rule passes the
    /// same validation and uniqueness checks as the admin operations.
    /// Nothing changes on error.
    pub fn import(&mut self, snapshot: PricingSnapshot) -> CoreResult<()> {
        let mut staged = PricingEngine::new(self.policy.clone(), Arc::clone(&self.clock));
        for discount in &snapshot.discounts {
            staged.add_discount(discount.clone())?;
        }
        for promo in &snapshot.promocodes {
            staged.add_promocode(promo.clone())?;
        }
        for combo in &snapshot.combos {
            staged.add_combo(combo.clone())?;
        }

        self.restore(snapshot)
    }
}

fn duplicate(field: &str, value: &str) -> CoreError {
    warn!(field, value, "duplicate rejected");
    CoreError::Validation(ValidationError::Duplicate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
