//! # Pricing
//!
//! Everything that turns a cart snapshot into money off.
//!
//! ## Pricing Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart snapshot + cart_total + now                                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  condition ── every rule's AND-list ──► applicable (priority desc)      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  calculator ── amount per rule                                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  resolver ── best single + all stackable + applied promo               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  DiscountResult { total (clamped to cart_total), discounts[] }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Combos and recommendations are separate read-side derivations; the
//! [`PricingEngine`] owns the rule collections and ties them together.

pub mod calculator;
pub mod combo;
pub mod condition;
pub mod discount;
pub mod engine;
pub mod policy;
pub mod promo;
pub mod recommend;
pub mod resolver;
pub mod snapshot;
pub mod template;

pub use calculator::calculate_discount;
pub use combo::{AvailableCombo, Combo, ComboDiscount};
pub use condition::{check_condition, Condition, ConditionEvaluator, TimeRange};
pub use discount::{BuyXGetY, Discount, DiscountKind};
pub use engine::PricingEngine;
pub use policy::{PricingPolicy, StackingPolicy, UnknownConditionPolicy, MAX_SMART_WINDOW_DAYS};
pub use promo::{PromoKind, Promocode};
pub use recommend::{Pairings, Recommendation};
pub use resolver::{AppliedDiscount, DiscountResult, DiscountSource};
pub use snapshot::{PricingSnapshot, PRICING_STATE_KEY, SNAPSHOT_VERSION};
pub use template::DiscountTemplate;
