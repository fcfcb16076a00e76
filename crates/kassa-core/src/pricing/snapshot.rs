//! # Pricing Snapshot
//!
//! The engine's whole rule state as one JSON document. The persistence
//! collaborator stores it verbatim under [`PRICING_STATE_KEY`]; the core
//! only produces and reads the string.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::pricing::combo::Combo;
use crate::pricing::discount::Discount;
use crate::pricing::promo::Promocode;
use crate::pricing::recommend::Pairings;

/// Key-value namespace the snapshot is stored under.
pub const PRICING_STATE_KEY: &str = "kassa-pricing-storage";

/// Bumped whenever the document shape changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    pub version: u32,

    #[serde(default)]
    pub discounts: Vec<Discount>,

    #[serde(default)]
    pub promocodes: Vec<Promocode>,

    #[serde(default)]
    pub combos: Vec<Combo>,

    #[serde(default)]
    pub pairings: Pairings,

    /// Id of the applied promo code.
    #[serde(default)]
    pub applied_promocode: Option<String>,
}

impl Default for PricingSnapshot {
    fn default() -> Self {
        PricingSnapshot {
            version: SNAPSHOT_VERSION,
            discounts: Vec::new(),
            promocodes: Vec::new(),
            combos: Vec::new(),
            pairings: Pairings::new(),
            applied_promocode: None,
        }
    }
}

impl PricingSnapshot {
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot, rejecting other versions.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let snapshot: PricingSnapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CoreError::UnsupportedSnapshot {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}
