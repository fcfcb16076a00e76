//! # Combos
//!
//! Fixed sets of distinct products sold together at a bundle price, shown
//! as merchandising offers and folded into a single cart line on demand.
//!
//! ## Offer Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  combo "Завтрак" = [coffee, croissant], -15%                           │
//! │                                                                         │
//! │  cart: []                  → offered, in_cart 0/2                       │
//! │  cart: [coffee]            → offered, partial, missing [croissant]      │
//! │  cart: [coffee, croissant] → not offered (already holds everything)     │
//! │  croissant stock = 0       → not offered at all                         │
//! │                                                                         │
//! │  add_combo_to_cart(replace_existing = true)                             │
//! │     [coffee, tea] ──► [tea, combo-breakfast-1710504000000]              │
//! │                       (one replace_lines call)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::money::Money;
use crate::pricing::condition::TimeRange;
use crate::types::{CartLine, IncludedProduct, Percent, Product, TimeOfDay};
use crate::COMBO_CATEGORY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum ComboDiscount {
    Percent { value: Percent },
    Fixed { value: Money },
}

impl ComboDiscount {
    /// Bundle price for constituents totalling `total`.
    pub fn apply(&self, total: Money) -> Money {
        match self {
            ComboDiscount::Percent { value } => total.discounted_by(*value),
            ComboDiscount::Fixed { value } => (total - *value).non_negative(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Combo {
    pub id: String,
    pub name: String,

    /// Constituent product ids, at least two, distinct.
    pub products: Vec<String>,

    pub discount: ComboDiscount,

    #[serde(default)]
    pub description: String,

    pub is_active: bool,

    /// Local time the offer opens.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<TimeOfDay>,

    /// Local time the offer closes.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_to: Option<TimeOfDay>,
}

impl Combo {
    /// Checks the `HH:MM` window. Open ends are unbounded.
    pub fn is_offered_at(&self, now: NaiveDateTime) -> bool {
        let time = TimeOfDay::of(&now);
        match (self.valid_from, self.valid_to) {
            (Some(from), Some(to)) => TimeRange::new(from, to).contains(time),
            (Some(from), None) => time >= from,
            (None, Some(to)) => time <= to,
            (None, None) => true,
        }
    }

    /// Resolves every constituent; `None` if any is missing or out of stock.
    fn resolve<'a>(&self, catalog: &'a Catalog) -> Option<Vec<&'a Product>> {
        self.products
            .iter()
            .map(|id| catalog.get(id).filter(|p| p.is_in_stock()))
            .collect()
    }
}

/// A combo offer priced against the current catalog and cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AvailableCombo {
    pub combo_id: String,
    pub name: String,
    pub description: String,
    pub products: Vec<Product>,
    pub total_price: Money,
    pub discounted_price: Money,
    pub savings: Money,
    pub in_cart_count: usize,
    pub missing_products: Vec<String>,
    pub is_partial: bool,
}

/// Offers worth showing for this cart.
pub fn available_combos(
    combos: &[Combo],
    cart: &Cart,
    catalog: &Catalog,
    now: NaiveDateTime,
) -> Vec<AvailableCombo> {
    combos
        .iter()
        .filter(|combo| combo.is_active && combo.is_offered_at(now))
        .filter_map(|combo| {
            let products = combo.resolve(catalog)?;

            let missing_products: Vec<String> = products
                .iter()
                .filter(|p| !cart.holds_product(&p.id))
                .map(|p| p.id.clone())
                .collect();
            if missing_products.is_empty() {
                return None;
            }

            let total_price: Money = products.iter().map(|p| p.price).sum();
            let discounted_price = combo.discount.apply(total_price);
            let in_cart_count = products.len() - missing_products.len();

            Some(AvailableCombo {
                combo_id: combo.id.clone(),
                name: combo.name.clone(),
                description: combo.description.clone(),
                products: products.into_iter().cloned().collect(),
                total_price,
                discounted_price,
                savings: total_price - discounted_price,
                in_cart_count,
                missing_products,
                is_partial: in_cart_count > 0,
            })
        })
        .collect()
}

/// Adds a combo as one cart line.
///
/// With `replace_existing`, loose lines for the constituents are dropped in
/// the same step the combo line appears. Returns `None` when the combo is
/// unknown or a constituent is missing or out of stock.
pub fn add_combo_to_cart(
    combos: &[Combo],
    combo_id: &str,
    cart: &mut Cart,
    catalog: &Catalog,
    now: NaiveDateTime,
    replace_existing: bool,
) -> Option<CartLine> {
    let combo = combos.iter().find(|c| c.id == combo_id)?;
    let products = combo.resolve(catalog)?;

    let total_price: Money = products.iter().map(|p| p.price).sum();
    let discounted_price = combo.discount.apply(total_price);

    let line = CartLine {
        id: format!("combo-{}-{}", combo.id, now.and_utc().timestamp_millis()),
        name: combo.name.clone(),
        price: discounted_price,
        quantity: 1,
        category: COMBO_CATEGORY.to_string(),
        is_combo: true,
        is_accessory: false,
        original_price: Some(total_price),
        discount: Some(total_price - discounted_price),
        included_products: products.iter().map(|p| IncludedProduct::from(*p)).collect(),
    };

    let replaced = if replace_existing {
        let (dropped, kept): (Vec<CartLine>, Vec<CartLine>) = cart
            .lines()
            .iter()
            .cloned()
            .partition(|l| !l.is_combo && combo.products.contains(&l.id));

        let mut next = Cart::from(kept);
        if let Err(err) = next.add_line(line.clone()) {
            warn!(combo_id, error = %err, "combo line rejected");
            return None;
        }
        if let Err(err) = cart.replace_lines(next.into_lines()) {
            warn!(combo_id, error = %err, "combo line rejected");
            return None;
        }
        dropped.len()
    } else {
        if let Err(err) = cart.add_line(line.clone()) {
            warn!(combo_id, error = %err, "combo line rejected");
            return None;
        }
        0
    };

    info!(combo_id, line_id = %line.id, price = %line.price, replaced, "combo added to cart");
    Some(line)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::with_products(vec![
            Product::new("coffee", "Кофе", Money::from_major(150), 10, "Напитки"),
            Product::new("croissant", "Круассан", Money::from_major(120), 10, "Выпечка"),
            Product::new("juice", "Сок", Money::from_major(90), 0, "Напитки"),
            Product::new("tea", "Чай", Money::from_major(80), 10, "Напитки"),
        ])
        .unwrap()
    }

    fn breakfast() -> Combo {
        Combo {
            id: "breakfast".into(),
            name: "Завтрак".into(),
            products: vec!["coffee".into(), "croissant".into()],
            discount: ComboDiscount::Percent { value: Percent::from_percent(15) },
            description: "Кофе и круассан".into(),
            is_active: true,
            valid_from: None,
            valid_to: None,
        }
    }

    #[test]
    fn test_offer_pricing_and_partial_match() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_product(catalog.get("coffee").unwrap(), 1).unwrap();

        let offers = available_combos(&[breakfast()], &cart, &catalog, at(9));
        assert_eq!(offers.len(), 1);

        let offer = &offers[0];
        assert_eq!(offer.total_price, Money::from_major(270));
        // 270 * 0.85 = 229.5 -> 230
        assert_eq!(offer.discounted_price, Money::from_major(230));
        assert_eq!(offer.savings, Money::from_major(40));
        assert_eq!(offer.in_cart_count, 1);
        assert_eq!(offer.missing_products, vec!["croissant".to_string()]);
        assert!(offer.is_partial);
    }

    #[test]
    fn test_combo_fully_in_cart_is_not_offered() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_product(catalog.get("coffee").unwrap(), 1).unwrap();
        cart.add_product(catalog.get("croissant").unwrap(), 1).unwrap();

        assert!(available_combos(&[breakfast()], &cart, &catalog, at(9)).is_empty());
    }

    #[test]
    fn test_products_inside_combo_lines_count_as_in_cart() {
        let catalog = catalog();
        let mut cart = Cart::new();
        add_combo_to_cart(&[breakfast()], "breakfast", &mut cart, &catalog, at(9), false).unwrap();

        let mut morning_tea = breakfast();
        morning_tea.id = "morning-tea".into();
        morning_tea.products = vec!["coffee".into(), "tea".into()];

        let offers = available_combos(&[breakfast(), morning_tea], &cart, &catalog, at(9));
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].combo_id, "morning-tea");
        assert_eq!(offers[0].in_cart_count, 1);
        assert_eq!(offers[0].missing_products, vec!["tea".to_string()]);
    }

    #[test]
    fn test_out_of_stock_or_missing_constituent_excludes_combo() {
        let catalog = catalog();
        let mut combo = breakfast();
        combo.products = vec!["coffee".into(), "juice".into()];
        assert!(available_combos(&[combo.clone()], &Cart::new(), &catalog, at(9)).is_empty());

        combo.products = vec!["coffee".into(), "ghost".into()];
        assert!(available_combos(&[combo], &Cart::new(), &catalog, at(9)).is_empty());
    }

    #[test]
    fn test_inactive_and_out_of_window_combos_are_hidden() {
        let catalog = catalog();
        let mut morning = breakfast();
        morning.valid_from = Some(TimeOfDay::at(7, 0));
        morning.valid_to = Some(TimeOfDay::at(11, 0));

        assert_eq!(available_combos(&[morning.clone()], &Cart::new(), &catalog, at(9)).len(), 1);
        assert!(available_combos(&[morning], &Cart::new(), &catalog, at(12)).is_empty());

        let mut inactive = breakfast();
        inactive.is_active = false;
        assert!(available_combos(&[inactive], &Cart::new(), &catalog, at(9)).is_empty());
    }

    #[test]
    fn test_fixed_combo_discount_floors_at_zero() {
        let discount = ComboDiscount::Fixed { value: Money::from_major(500) };
        assert_eq!(discount.apply(Money::from_major(270)), Money::zero());
    }

    #[test]
    fn test_add_combo_replaces_loose_lines() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_product(catalog.get("coffee").unwrap(), 2).unwrap();
        cart.add_product(catalog.get("tea").unwrap(), 1).unwrap();

        let line = add_combo_to_cart(&[breakfast()], "breakfast", &mut cart, &catalog, at(9), true)
            .unwrap();

        assert!(!cart.contains("coffee"));
        assert!(cart.contains("tea"));
        assert_eq!(cart.lines().iter().filter(|l| l.is_combo).count(), 1);

        assert!(line.id.starts_with("combo-breakfast-"));
        assert_eq!(line.category, COMBO_CATEGORY);
        assert_eq!(line.price, Money::from_major(230));
        assert_eq!(line.original_price, Some(Money::from_major(270)));
        assert_eq!(line.discount, Some(Money::from_major(40)));

        let included: Vec<_> = line
            .included_products
            .iter()
            .map(|p| (p.id.as_str(), p.name.as_str(), p.price))
            .collect();
        assert_eq!(
            included,
            vec![
                ("coffee", "Кофе", Money::from_major(150)),
                ("croissant", "Круассан", Money::from_major(120)),
            ]
        );
    }

    #[test]
    fn test_add_combo_without_replace_keeps_loose_lines() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_product(catalog.get("coffee").unwrap(), 1).unwrap();

        add_combo_to_cart(&[breakfast()], "breakfast", &mut cart, &catalog, at(9), false).unwrap();
        assert!(cart.contains("coffee"));
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_add_combo_fails_cleanly() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_product(catalog.get("coffee").unwrap(), 1).unwrap();
        let before = cart.clone();

        assert!(add_combo_to_cart(&[breakfast()], "nope", &mut cart, &catalog, at(9), true).is_none());

        let mut combo = breakfast();
        combo.products.push("juice".into());
        assert!(add_combo_to_cart(&[combo], "breakfast", &mut cart, &catalog, at(9), true).is_none());

        assert_eq!(cart, before);
    }
}
