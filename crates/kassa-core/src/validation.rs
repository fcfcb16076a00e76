//! # Validation Module
//!
//! Input validation for cart operations and the admin surface.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: UI forms                                                      │
//! │  ├── Basic format checks, immediate feedback                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Terminal commands (deserialization)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                   │
//! │  ├── Quantities, prices, percentages                                    │
//! │  └── Whole rule definitions before they enter the engine                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kassa_core::validation::{validate_promo_code, validate_quantity};
//!
//! assert!(validate_promo_code("SUMMER-10").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::pricing::combo::{Combo, ComboDiscount};
use crate::pricing::condition::Condition;
use crate::pricing::discount::{Discount, DiscountKind};
use crate::pricing::promo::{PromoKind, Promocode};
use crate::types::{Percent, Product};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CODE_LEN: usize = 32;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product, discount, combo).
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a promo code as typed by an admin.
///
/// ## Rules
/// - Must not be empty, at most 32 characters
/// - Letters (any script), digits, hyphens and underscores only
pub fn validate_promo_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a non-negative amount in minor units. Zero is allowed.
pub fn validate_amount(field: &str, minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a percentage: between 0% and 100%.
pub fn validate_percent(field: &str, percent: Percent) -> ValidationResult<()> {
    if percent > Percent::FULL {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: Percent::FULL.bps() as i64,
        });
    }

    Ok(())
}

/// Validates weekday numbers (0 = Sunday .. 6 = Saturday).
pub fn validate_days_of_week(days: &[u8]) -> ValidationResult<()> {
    if days.is_empty() {
        return Err(ValidationError::Required {
            field: "day_of_week".to_string(),
        });
    }

    if days.iter().any(|d| *d > 6) {
        return Err(ValidationError::OutOfRange {
            field: "day_of_week".to_string(),
            min: 0,
            max: 6,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a catalog product.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    validate_name("name", &product.name)?;
    validate_amount("price", product.price.minor())?;

    if product.stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a single rule condition.
pub fn validate_condition(condition: &Condition) -> ValidationResult<()> {
    match condition {
        Condition::MinAmount { value } => validate_amount("min_amount", value.minor()),
        Condition::MinQuantity { value } if *value < 0 => Err(ValidationError::OutOfRange {
            field: "min_quantity".to_string(),
            min: 0,
            max: i64::MAX,
        }),
        Condition::SpecificProducts { value } if value.is_empty() => {
            Err(ValidationError::Required {
                field: "specific_products".to_string(),
            })
        }
        Condition::Category { value } if value.trim().is_empty() => {
            Err(ValidationError::Required {
                field: "category".to_string(),
            })
        }
        Condition::DayOfWeek { value } => validate_days_of_week(value),
        _ => Ok(()),
    }
}

/// Validates an automatic discount rule before it enters the engine.
///
/// ## Rules
/// - id and name present
/// - percent in 0..=100%, fixed amount non-negative
/// - buy-X-get-Y has a positive cycle and a category condition to count in
/// - every condition is well-formed
/// - `valid_from <= valid_to` when both are set
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    if discount.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    validate_name("name", &discount.name)?;

    match &discount.kind {
        DiscountKind::Percent { value } => validate_percent("value", *value)?,
        DiscountKind::Fixed { value } => validate_amount("value", value.minor())?,
        DiscountKind::BuyXGetY { value } => {
            if value.buy_x == 0 || value.get_y == 0 {
                return Err(ValidationError::MustBePositive {
                    field: "buy_x/get_y".to_string(),
                });
            }
            if discount.category_condition().is_none() {
                return Err(ValidationError::Required {
                    field: "category condition".to_string(),
                });
            }
        }
        DiscountKind::Unknown => {
            return Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec!["percent".into(), "fixed".into(), "buy_x_get_y".into()],
            })
        }
    }

    discount.conditions.iter().try_for_each(validate_condition)?;

    if let (Some(from), Some(to)) = (discount.valid_from, discount.valid_to) {
        if from > to {
            return Err(ValidationError::InvalidFormat {
                field: "valid_from".to_string(),
                reason: "must not be after valid_to".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a promo code definition.
pub fn validate_promocode(promo: &Promocode) -> ValidationResult<()> {
    if promo.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    validate_promo_code(&promo.code)?;
    validate_name("name", &promo.name)?;
    validate_amount("min_amount", promo.min_amount.minor())?;

    match &promo.kind {
        PromoKind::Percent { value } => validate_percent("value", *value)?,
        PromoKind::Fixed { value } => validate_amount("value", value.minor())?,
    }

    if let (Some(from), Some(to)) = (promo.valid_from, promo.valid_to) {
        if from > to {
            return Err(ValidationError::InvalidFormat {
                field: "valid_from".to_string(),
                reason: "must not be after valid_to".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a combo definition.
///
/// ## Rules
/// - at least two products, no duplicates
/// - percent in 0..=100%, fixed amount non-negative
pub fn validate_combo(combo: &Combo) -> ValidationResult<()> {
    if combo.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    validate_name("name", &combo.name)?;

    if combo.products.len() < 2 {
        return Err(ValidationError::OutOfRange {
            field: "products".to_string(),
            min: 2,
            max: i64::MAX,
        });
    }

    let mut seen = HashSet::new();
    if let Some(dup) = combo.products.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(ValidationError::Duplicate {
            field: "product".to_string(),
            value: dup.clone(),
        });
    }

    match &combo.discount {
        ComboDiscount::Percent { value } => validate_percent("discount", *value),
        ComboDiscount::Fixed { value } => validate_amount("discount", value.minor()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::pricing::discount::BuyXGetY;
    use crate::pricing::template::DiscountTemplate;

    #[test]
    fn test_validate_promo_code() {
        assert!(validate_promo_code("SUMMER-10").is_ok());
        assert!(validate_promo_code("ЛЕТО_2024").is_ok());

        assert!(validate_promo_code("").is_err());
        assert!(validate_promo_code("   ").is_err());
        assert!(validate_promo_code("has space").is_err());
        assert!(validate_promo_code(&"A".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent("value", Percent::from_percent(100)).is_ok());
        assert!(validate_percent("value", Percent::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_validate_days_of_week() {
        assert!(validate_days_of_week(&[0, 6]).is_ok());
        assert!(validate_days_of_week(&[]).is_err());
        assert!(validate_days_of_week(&[7]).is_err());
    }

    #[test]
    fn test_validate_product() {
        let product = Product::new("p1", "Капучино", Money::from_major(180), 10, "Напитки");
        assert!(validate_product(&product).is_ok());

        let mut bad = product.clone();
        bad.stock = -1;
        assert!(validate_product(&bad).is_err());

        let mut bad = product;
        bad.price = Money::from_minor(-1);
        assert!(validate_product(&bad).is_err());
    }

    #[test]
    fn test_every_template_is_valid() {
        for template in DiscountTemplate::ALL {
            let discount = template.build(format!("tpl-{}", template.key()));
            assert!(
                validate_discount(&discount).is_ok(),
                "template {} should validate",
                template.key()
            );
        }
    }

    #[test]
    fn test_buy_x_get_y_requires_category() {
        let mut discount = DiscountTemplate::BuyXGetY.build("bxgy");
        discount.conditions.clear();
        assert!(validate_discount(&discount).is_err());

        let mut discount = DiscountTemplate::BuyXGetY.build("bxgy");
        discount.kind = DiscountKind::BuyXGetY {
            value: BuyXGetY { buy_x: 0, get_y: 1 },
        };
        assert!(validate_discount(&discount).is_err());
    }

    #[test]
    fn test_validate_combo() {
        let combo = Combo {
            id: "c1".into(),
            name: "Завтрак".into(),
            products: vec!["coffee".into(), "croissant".into()],
            discount: ComboDiscount::Percent {
                value: Percent::from_percent(15),
            },
            description: String::new(),
            is_active: true,
            valid_from: None,
            valid_to: None,
        };
        assert!(validate_combo(&combo).is_ok());

        let mut single = combo.clone();
        single.products.truncate(1);
        assert!(validate_combo(&single).is_err());

        let mut dup = combo;
        dup.products = vec!["coffee".into(), "coffee".into()];
        assert!(matches!(
            validate_combo(&dup),
            Err(ValidationError::Duplicate { .. })
        ));
    }
}
