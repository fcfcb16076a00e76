//! # Pricing Policy
//!
//! Tunables for the pricing engine. The terminal reads them from the
//! `[pricing]` section of its TOML config.
//!
//! ```toml
//! [pricing]
//! stacking = "legacy"          # legacy | exclude_best
//! unknown_conditions = "pass"  # pass | reject
//! max_recommendations = 3
//! smart_window_days = 7
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// =============================================================================
// Stacking Policy
// =============================================================================

/// How the best discount and the stackable discounts combine.
///
/// ```text
/// applicable: A (stackable, 100)  B (non-stackable, 80)
///
/// Legacy       best = A, stackable = [A]   → 200   (A counted twice)
/// ExcludeBest  best = A, stackable = []    → 100
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackingPolicy {
    /// A stackable discount chosen as best is applied again in the stackable pass.
    #[default]
    Legacy,

    /// The discount chosen as best is skipped in the stackable pass.
    ExcludeBest,
}

impl fmt::Display for StackingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackingPolicy::Legacy => write!(f, "legacy"),
            StackingPolicy::ExcludeBest => write!(f, "exclude_best"),
        }
    }
}

impl FromStr for StackingPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(StackingPolicy::Legacy),
            "exclude_best" | "exclude-best" => Ok(StackingPolicy::ExcludeBest),
            _ => Err(ValidationError::NotAllowed {
                field: "stacking".to_string(),
                allowed: vec!["legacy".into(), "exclude_best".into()],
            }),
        }
    }
}

// =============================================================================
// Unknown Condition Policy
// =============================================================================

/// What an unrecognised condition type evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownConditionPolicy {
    /// Unknown conditions pass (fail open).
    #[default]
    Pass,

    /// Unknown conditions fail, so the rule never applies (fail closed).
    Reject,
}

impl fmt::Display for UnknownConditionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownConditionPolicy::Pass => write!(f, "pass"),
            UnknownConditionPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for UnknownConditionPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pass" | "open" => Ok(UnknownConditionPolicy::Pass),
            "reject" | "closed" => Ok(UnknownConditionPolicy::Reject),
            _ => Err(ValidationError::NotAllowed {
                field: "unknown_conditions".to_string(),
                allowed: vec!["pass".into(), "reject".into()],
            }),
        }
    }
}

// =============================================================================
// Pricing Policy
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    #[serde(default)]
    pub stacking: StackingPolicy,

    #[serde(default)]
    pub unknown_conditions: UnknownConditionPolicy,

    /// Maximum suggestions returned by each recommender.
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Trailing window, in days, of sales counted by smart recommendations.
    #[serde(default = "default_smart_window_days")]
    pub smart_window_days: u32,
}

/// Longest trailing window accepted for smart recommendations (ten years).
pub const MAX_SMART_WINDOW_DAYS: u32 = 3650;

fn default_max_recommendations() -> usize {
    3
}

fn default_smart_window_days() -> u32 {
    7
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            stacking: StackingPolicy::default(),
            unknown_conditions: UnknownConditionPolicy::default(),
            max_recommendations: default_max_recommendations(),
            smart_window_days: default_smart_window_days(),
        }
    }
}

impl PricingPolicy {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_recommendations == 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_recommendations".to_string(),
            });
        }
        if self.smart_window_days == 0 {
            return Err(ValidationError::MustBePositive {
                field: "smart_window_days".to_string(),
            });
        }
        if self.smart_window_days > MAX_SMART_WINDOW_DAYS {
            return Err(ValidationError::OutOfRange {
                field: "smart_window_days".to_string(),
                min: 1,
                max: i64::from(MAX_SMART_WINDOW_DAYS),
            });
        }
        Ok(())
    }
}
