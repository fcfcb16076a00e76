//! # Configuration State
//!
//! What the UI needs from the loaded [`TerminalConfig`]. Read-only after
//! startup, so no mutex.

use kassa_core::pricing::{StackingPolicy, UnknownConditionPolicy};
use serde::Serialize;

use crate::config::TerminalConfig;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    pub store_id: String,

    /// Printed on receipts
    pub store_name: String,

    pub stacking: StackingPolicy,
    pub unknown_conditions: UnknownConditionPolicy,
    pub max_recommendations: usize,
    pub smart_window_days: u32,
}

impl From<&TerminalConfig> for ConfigState {
    fn from(config: &TerminalConfig) -> Self {
        ConfigState {
            store_id: config.store.id.clone(),
            store_name: config.store.name.clone(),
            stacking: config.pricing.stacking,
            unknown_conditions: config.pricing.unknown_conditions,
            max_recommendations: config.pricing.max_recommendations,
            smart_window_days: config.pricing.smart_window_days,
        }
    }
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState::from(&TerminalConfig::default())
    }
}
