//! # Error Types
//!
//! Domain-specific error types for kassa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kassa-core errors (this file)                                         │
//! │  ├── CoreError        - Cart, catalog and admin failures               │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── PromoError       - Promo code rejections shown to the cashier     │
//! │                                                                         │
//! │  kassa-terminal errors (app)                                           │
//! │  ├── TerminalError    - Config file / TOML failures                    │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI                     │
//! │        PromoError ─────────────────► ApiError → UI                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing computations themselves never fail: a rule that does not apply
//! contributes zero. Errors only come from mutations and lookups.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Requested more units than are on hand.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Cart line id is not in the cart.
    #[error("Item not in cart: {0}")]
    NotInCart(String),

    /// Operation requires a non-empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Discount rule id is unknown.
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    /// Promo code id is unknown.
    #[error("Promo code not found: {0}")]
    PromocodeNotFound(String),

    /// Combo id is unknown.
    #[error("Combo not found: {0}")]
    ComboNotFound(String),

    /// Combo cannot be sold right now (constituent missing or out of stock).
    #[error("Combo {0} is not available")]
    ComboUnavailable(String),

    /// Snapshot was written by an incompatible version.
    #[error("Unsupported pricing snapshot version {found} (expected {expected})")]
    UnsupportedSnapshot { found: u32, expected: u32 },

    /// Snapshot JSON could not be read or written.
    #[error("Pricing snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. malformed time or code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g. duplicate promo code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Promo Error
// =============================================================================

/// Reasons a promo code is rejected.
///
/// The messages are shown to the cashier verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    /// No active promo code matches.
    #[error("Промокод не найден")]
    NotFound,

    /// Usage limit reached.
    #[error("Промокод больше не действует")]
    Exhausted,

    /// `valid_to` is in the past.
    #[error("Срок действия промокода истёк")]
    Expired,

    /// `valid_from` is in the future.
    #[error("Промокод ещё не действует")]
    NotYetValid,

    /// Cart total is below the promo's minimum.
    #[error("Минимальная сумма заказа для промокода: {required}")]
    BelowMinimum { required: Money, shortfall: Money },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
