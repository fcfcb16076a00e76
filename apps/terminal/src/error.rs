//! # Terminal Error Types
//!
//! Two layers:
//!
//! - [`TerminalError`]: configuration file and TOML failures while the
//!   terminal starts up.
//! - [`ApiError`]: what a command hands back to the UI. Every core, promo
//!   and terminal error is translated into one.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI                           Rust                                      │
//! │  ──                           ────                                      │
//! │                                                                         │
//! │  apply_promocode("SUMMER")                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function  Result<T, ApiError>                           │  │
//! │  │         │                                                        │  │
//! │  │  PromoError::Expired ──────────────────────────┐                 │  │
//! │  │  CoreError::ComboNotFound ─────────────────────┼──► ApiError ───►│  │
//! │  │  ValidationError (via CoreError) ──────────────┘                 │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "PROMO_REJECTED", "message": "Срок действия промокода истёк" }│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kassa_core::{CoreError, PromoError};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Terminal Error
// =============================================================================

/// Result type alias for terminal setup.
pub type TerminalResult<T> = Result<T, TerminalError>;

#[derive(Debug, Error)]
pub enum TerminalError {
    /// Config values out of range or inconsistent.
    #[error("Invalid terminal configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to serialize or write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Seeding the session failed.
    #[error("Session setup failed: {0}")]
    Core(#[from] CoreError),
}

impl From<std::io::Error> for TerminalError {
    fn from(err: std::io::Error) -> Self {
        TerminalError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for TerminalError {
    fn from(err: toml::de::Error) -> Self {
        TerminalError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for TerminalError {
    fn from(err: toml::ser::Error) -> Self {
        TerminalError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// API Error
// =============================================================================

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Combo not found: breakfast"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, line, rule, code or combo not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Operation not possible in the current state
    BusinessLogic,

    /// Cart limits exceeded
    CartError,

    /// Not enough units on hand
    InsufficientStock,

    /// Promo code refused; message is shown to the cashier as is
    PromoRejected,

    /// Pricing state import/export failed
    SnapshotError,

    /// Configuration could not be loaded or saved
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::NotInCart(id) => ApiError::not_found("Cart item", &id),
            CoreError::DiscountNotFound(id) => ApiError::not_found("Discount", &id),
            CoreError::PromocodeNotFound(id) => ApiError::not_found("Promo code", &id),
            CoreError::ComboNotFound(id) => ApiError::not_found("Combo", &id),
            CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: {} available, {} requested",
                    product_id, available, requested
                ),
            ),
            CoreError::EmptyCart => ApiError::new(ErrorCode::BusinessLogic, "Cart is empty"),
            CoreError::ComboUnavailable(id) => ApiError::new(
                ErrorCode::BusinessLogic,
                format!("Combo {} is not available", id),
            ),
            CoreError::CartTooLarge { max } => ApiError::cart(format!(
                "Cart cannot have more than {} items",
                max
            )),
            CoreError::QuantityTooLarge { requested, max } => ApiError::validation(format!(
                "Quantity {} exceeds maximum allowed ({})",
                requested, max
            )),
            err @ CoreError::UnsupportedSnapshot { .. } => {
                ApiError::new(ErrorCode::SnapshotError, err.to_string())
            }
            CoreError::Snapshot(e) => {
                tracing::error!("Pricing snapshot error: {}", e);
                ApiError::new(ErrorCode::SnapshotError, "Pricing state is not valid JSON")
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<PromoError> for ApiError {
    fn from(err: PromoError) -> Self {
        ApiError::new(ErrorCode::PromoRejected, err.to_string())
    }
}

impl From<TerminalError> for ApiError {
    fn from(err: TerminalError) -> Self {
        match err {
            TerminalError::Core(e) => e.into(),
            other => ApiError::new(ErrorCode::ConfigError, other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_core::{Money, ValidationError};

    #[test]
    fn test_not_found_mapping() {
        let err: ApiError = CoreError::ComboNotFound("breakfast".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Combo not found: breakfast");
    }

    #[test]
    fn test_promo_messages_pass_through() {
        let err: ApiError = PromoError::BelowMinimum {
            required: Money::from_major(1000),
            shortfall: Money::from_major(200),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PromoRejected);
        assert!(err.message.starts_with("Минимальная сумма заказа"));
    }

    #[test]
    fn test_validation_wraps_field_message() {
        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "name".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "name is required");
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::new(ErrorCode::InsufficientStock, "no coffee");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_STOCK");
        assert_eq!(json["message"], "no coffee");
        assert_eq!(err.to_string(), "[InsufficientStock] no coffee");
    }

    #[test]
    fn test_terminal_error_mapping() {
        let err: ApiError = TerminalError::InvalidConfig("bad".into()).into();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let err: ApiError = TerminalError::Core(CoreError::EmptyCart).into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }
}
