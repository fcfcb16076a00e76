//! # Admin Commands
//!
//! Rule management for the back-office screen: automatic discounts, promo
//! codes, combos, pairings, and pricing state import/export.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  export_pricing_state ──► JSON ──► key-value store                      │
//! │                           (stored under "kassa-pricing-storage")        │
//! │  import_pricing_state ◄── JSON ◄── key-value store                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kassa_core::pricing::{
    Combo, Discount, DiscountTemplate, Pairings, PricingSnapshot, Promocode,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::PosState;

/// Template offered by the "new discount" dialog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub key: String,
    pub name: String,
    pub description: String,
}

// =============================================================================
// Discounts
// =============================================================================

pub fn list_discounts(state: &PosState) -> Result<Vec<Discount>, ApiError> {
    debug!("list_discounts command");
    state.with_session(|s| s.engine.discounts().to_vec())
}

pub fn add_discount(state: &PosState, discount: Discount) -> Result<Discount, ApiError> {
    debug!(discount_id = %discount.id, "add_discount command");
    state.with_session_mut(|s| s.engine.add_discount(discount.clone()))??;
    Ok(discount)
}

pub fn update_discount(state: &PosState, discount: Discount) -> Result<Discount, ApiError> {
    debug!(discount_id = %discount.id, "update_discount command");
    state.with_session_mut(|s| s.engine.update_discount(discount.clone()))??;
    Ok(discount)
}

pub fn delete_discount(state: &PosState, id: String) -> Result<Discount, ApiError> {
    debug!(discount_id = %id, "delete_discount command");
    Ok(state.with_session_mut(|s| s.engine.delete_discount(&id))??)
}

/// Flips a discount on or off and returns the new state.
pub fn toggle_discount(state: &PosState, id: String) -> Result<bool, ApiError> {
    debug!(discount_id = %id, "toggle_discount command");
    Ok(state.with_session_mut(|s| s.engine.toggle_discount(&id))??)
}

pub fn list_discount_templates() -> Vec<TemplateInfo> {
    debug!("list_discount_templates command");
    DiscountTemplate::ALL
        .iter()
        .map(|t| {
            let sample = t.build("");
            TemplateInfo {
                key: t.key().to_string(),
                name: sample.name,
                description: sample.description,
            }
        })
        .collect()
}

/// Creates a discount from a template key such as `happy_hour`.
pub fn create_discount_from_template(
    state: &PosState,
    template: String,
) -> Result<Discount, ApiError> {
    debug!(template = %template, "create_discount_from_template command");

    let template: DiscountTemplate = template
        .parse()
        .map_err(|e: kassa_core::ValidationError| ApiError::validation(e.to_string()))?;
    Ok(state.with_session_mut(|s| s.engine.create_discount_from_template(template))??)
}

// =============================================================================
// Promo Codes
// =============================================================================

pub fn list_promocodes(state: &PosState) -> Result<Vec<Promocode>, ApiError> {
    debug!("list_promocodes command");
    state.with_session(|s| s.engine.promocodes().to_vec())
}

pub fn add_promocode(state: &PosState, promo: Promocode) -> Result<Promocode, ApiError> {
    debug!(code = %promo.code, "add_promocode command");
    state.with_session_mut(|s| s.engine.add_promocode(promo.clone()))??;
    Ok(promo)
}

pub fn delete_promocode(state: &PosState, id: String) -> Result<Promocode, ApiError> {
    debug!(promo_id = %id, "delete_promocode command");
    Ok(state.with_session_mut(|s| s.engine.delete_promocode(&id))??)
}

// =============================================================================
// Combos & Pairings
// =============================================================================

pub fn list_combos(state: &PosState) -> Result<Vec<Combo>, ApiError> {
    debug!("list_combos command");
    state.with_session(|s| s.engine.combos().to_vec())
}

pub fn add_combo(state: &PosState, combo: Combo) -> Result<Combo, ApiError> {
    debug!(combo_id = %combo.id, "add_combo command");
    state.with_session_mut(|s| s.engine.add_combo(combo.clone()))??;
    Ok(combo)
}

pub fn delete_combo(state: &PosState, id: String) -> Result<Combo, ApiError> {
    debug!(combo_id = %id, "delete_combo command");
    Ok(state.with_session_mut(|s| s.engine.delete_combo(&id))??)
}

pub fn get_pairings(state: &PosState) -> Result<Pairings, ApiError> {
    debug!("get_pairings command");
    state.with_session(|s| s.engine.pairings().clone())
}

pub fn set_pairings(state: &PosState, pairings: Pairings) -> Result<(), ApiError> {
    debug!(products = pairings.len(), "set_pairings command");
    state.with_session_mut(|s| s.engine.set_pairings(pairings))
}

// =============================================================================
// Import / Export
// =============================================================================

/// Serializes every rule plus the applied promo code.
pub fn export_pricing_state(state: &PosState) -> Result<String, ApiError> {
    debug!("export_pricing_state command");
    Ok(state.with_session(|s| s.engine.snapshot().to_json())??)
}

/// Replaces every rule with the ones in `json`.
///
/// Each rule goes through the same checks as the CRUD commands above.
/// Nothing changes on error.
pub fn import_pricing_state(state: &PosState, json: String) -> Result<(), ApiError> {
    debug!(bytes = json.len(), "import_pricing_state command");

    let snapshot = PricingSnapshot::from_json(&json)?;
    state.with_session_mut(|s| s.engine.import(snapshot))??;

    info!("Pricing state imported");
    Ok(())
}
