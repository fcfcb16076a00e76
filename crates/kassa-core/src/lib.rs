//! # kassa-core: Pricing Core for Kassa POS
//!
//! Pure business logic for the point-of-sale terminal: cart, catalog, and
//! the pricing engine that evaluates automatic discounts, promo codes,
//! combo bundles and merchandising suggestions against a cart snapshot.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kassa POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI collaborator                              │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Admin screens             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kassa-terminal                               │   │
//! │  │    PosSession (Arc<Mutex>), config, logging                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kassa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌──────────────────────────┐  │   │
//! │  │   │   types   │  │   cart    │  │        pricing           │  │   │
//! │  │   │   money   │  │  catalog  │  │ conditions → calculator  │  │   │
//! │  │   │   clock   │  │validation │  │ → resolver + promo       │  │   │
//! │  │   └───────────┘  └───────────┘  │ combos, recommendations  │  │   │
//! │  │                                 └──────────────────────────┘  │   │
//! │  │   NO I/O • NO GLOBALS • CLOCK INJECTED                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartLine, Transaction, Percent, TimeOfDay)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - The cart snapshot and its mutations
//! - [`catalog`] - Product lookup and stock
//! - [`clock`] - Injectable local wall-clock time
//! - [`pricing`] - Discounts, promo codes, combos, recommendations
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use kassa_core::clock::FixedClock;
//! use kassa_core::pricing::{Condition, DiscountTemplate, PricingEngine, PricingPolicy};
//! use kassa_core::{Cart, Money, Product};
//!
//! let clock = Arc::new(FixedClock::at(2024, 3, 15, 12, 0).unwrap());
//! let mut engine = PricingEngine::new(PricingPolicy::default(), clock);
//!
//! let mut discount = DiscountTemplate::PercentThreshold.build("disc1");
//! discount.conditions = vec![Condition::MinAmount { value: Money::from_major(500) }];
//! engine.add_discount(discount).unwrap();
//!
//! let mut cart = Cart::new();
//! let tea = Product::new("1", "Чай", Money::from_major(600), 10, "Напитки");
//! cart.add_product(&tea, 1).unwrap();
//!
//! let result = engine.get_total_discount(&cart, cart.subtotal());
//! assert_eq!(result.total, Money::from_major(30));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, PromoError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Catches a mistyped `1000` instead of `10` at the register.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Category assigned to synthetic combo lines.
pub const COMBO_CATEGORY: &str = "Комбо";
