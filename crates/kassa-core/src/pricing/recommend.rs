//! # Recommendations
//!
//! Two read-side suggesters for the cart screen:
//!
//! - **pairings**: products the merchandising table says go well with what
//!   is already in the cart, scored by how many cart products suggest them;
//! - **smart**: best sellers over a trailing window of sales.
//!
//! Both skip products already in the cart or out of stock, and both are
//! deterministic: ties keep first-seen (pairings) or catalog (smart) order.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::types::{Product, Transaction, TransactionKind};

/// Product id → ids that go well with it, in merchandising order.
pub type Pairings = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Recommendation {
    pub product: Product,
    /// Shown under the product tile.
    pub reason: String,
    /// Pairing hits or units sold.
    pub score: u32,
}

// =============================================================================
// Pairing Recommendations
// =============================================================================

struct Candidate<'a> {
    id: &'a str,
    score: u32,
    suggested_by: &'a str,
}

/// Products that pair with the cart's contents.
pub fn pairing_recommendations(
    pairings: &Pairings,
    cart: &Cart,
    catalog: &Catalog,
    limit: usize,
) -> Vec<Recommendation> {
    let mut cart_products: Vec<&str> = Vec::new();
    for id in cart.lines().iter().flat_map(|l| l.product_ids()) {
        if !cart_products.contains(&id) {
            cart_products.push(id);
        }
    }

    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for &source in &cart_products {
        let Some(paired) = pairings.get(source) else {
            continue;
        };

        let mut counted: Vec<&str> = Vec::new();
        for id in paired.iter().map(String::as_str) {
            if counted.contains(&id) || cart.holds_product(id) {
                continue;
            }
            counted.push(id);

            match candidates.iter_mut().find(|c| c.id == id) {
                Some(candidate) => candidate.score += 1,
                None => candidates.push(Candidate {
                    id,
                    score: 1,
                    suggested_by: source,
                }),
            }
        }
    }

    // stable: equal scores keep first-seen order
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    candidates
        .into_iter()
        .filter_map(|c| {
            let product = catalog.get(c.id).filter(|p| p.is_in_stock())?;
            let source_name = catalog
                .get(c.suggested_by)
                .map_or(c.suggested_by, |p| p.name.as_str());
            Some(Recommendation {
                product: product.clone(),
                reason: format!("Хорошо сочетается с «{}»", source_name),
                score: c.score,
            })
        })
        .take(limit)
        .collect()
}

// =============================================================================
// Smart Recommendations
// =============================================================================

/// Best sellers over the last `window_days` that the cart does not hold yet.
pub fn smart_recommendations(
    cart: &Cart,
    catalog: &Catalog,
    transactions: &[Transaction],
    now: NaiveDateTime,
    window_days: u32,
    limit: usize,
) -> Vec<Recommendation> {
    // a window reaching past the calendar's start covers all history
    let since = now
        .checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(NaiveDateTime::MIN);

    let mut units: HashMap<&str, i64> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Sale && tx.date >= since && tx.date <= now)
    {
        for line in &tx.items {
            for id in line.product_ids() {
                *units.entry(id).or_default() += line.quantity;
            }
        }
    }

    let mut ranked: Vec<(&Product, i64)> = catalog
        .iter()
        .filter(|p| p.is_in_stock() && !cart.holds_product(&p.id))
        .filter_map(|p| units.get(p.id.as_str()).map(|n| (p, *n)))
        .filter(|(_, n)| *n > 0)
        .collect();

    // stable: equal counts keep catalog order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(limit)
        .map(|(product, sold)| Recommendation {
            product: product.clone(),
            reason: popularity_reason(sold, window_days),
            score: u32::try_from(sold).unwrap_or(u32::MAX),
        })
        .collect()
}

fn popularity_reason(sold: i64, window_days: u32) -> String {
    if window_days == 7 {
        format!("Популярно: {} шт. за неделю", sold)
    } else {
        format!("Популярно: {} шт. за {} дн.", sold, window_days)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{CartLine, IncludedProduct, PaymentMethod};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::with_products(vec![
            Product::new("coffee", "Кофе", Money::from_major(150), 10, "Напитки"),
            Product::new("croissant", "Круассан", Money::from_major(120), 10, "Выпечка"),
            Product::new("cake", "Торт", Money::from_major(300), 10, "Выпечка"),
            Product::new("cookie", "Печенье", Money::from_major(50), 0, "Выпечка"),
            Product::new("tea", "Чай", Money::from_major(80), 10, "Напитки"),
            Product::new("sugar", "Сахар", Money::from_major(10), 10, "Прочее"),
        ])
        .unwrap()
    }

    fn pairings() -> Pairings {
        let mut pairings = Pairings::new();
        pairings.insert(
            "coffee".into(),
            vec!["croissant".into(), "cookie".into(), "cake".into(), "sugar".into()],
        );
        pairings.insert("tea".into(), vec!["sugar".into(), "cake".into()]);
        pairings
    }

    fn sale(days_ago: i64, lines: Vec<CartLine>) -> Transaction {
        let total = lines.iter().map(CartLine::line_total).sum();
        Transaction::sale(lines, total, Money::zero(), PaymentMethod::Cash, now() - Duration::days(days_ago))
    }

    fn line(catalog: &Catalog, id: &str, qty: i64) -> CartLine {
        CartLine::from_product(catalog.get(id).unwrap(), qty)
    }

    #[test]
    fn test_pairings_scored_by_cart_hits() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_product(catalog.get("coffee").unwrap(), 1).unwrap();
        cart.add_product(catalog.get("tea").unwrap(), 1).unwrap();

        let recs = pairing_recommendations(&pairings(), &cart, &catalog, 3);
        let ids: Vec<_> = recs.iter().map(|r| r.product.id.as_str()).collect();

        // cake and sugar are suggested by both; cookie is out of stock
        assert_eq!(ids, vec!["cake", "sugar", "croissant"]);
        assert_eq!(recs[0].score, 2);
        assert_eq!(recs[0].reason, "Хорошо сочетается с «Кофе»");
    }

    #[test]
    fn test_pairings_skip_cart_products_and_respect_limit() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_product(catalog.get("coffee").unwrap(), 1).unwrap();
        cart.add_product(catalog.get("croissant").unwrap(), 1).unwrap();

        let recs = pairing_recommendations(&pairings(), &cart, &catalog, 1);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].product.id, "cake");

        assert!(pairing_recommendations(&pairings(), &Cart::new(), &catalog, 3).is_empty());
    }

    #[test]
    fn test_combo_lines_contribute_their_products() {
        let catalog = catalog();
        let mut combo = line(&catalog, "tea", 1);
        combo.id = "combo-x-1".into();
        combo.is_combo = true;
        combo.included_products = vec![IncludedProduct::from(catalog.get("tea").unwrap())];
        let cart = Cart::from(vec![combo]);

        let recs = pairing_recommendations(&pairings(), &cart, &catalog, 3);
        let ids: Vec<_> = recs.iter().map(|r| r.product.id.as_str()).collect();
        assert_eq!(ids, vec!["sugar", "cake"]);
    }

    #[test]
    fn test_smart_ranks_recent_sales() {
        let catalog = catalog();
        let transactions = vec![
            sale(1, vec![line(&catalog, "tea", 3), line(&catalog, "cake", 1)]),
            sale(2, vec![line(&catalog, "croissant", 2), line(&catalog, "cake", 1)]),
            sale(6, vec![line(&catalog, "cookie", 9)]),
            sale(10, vec![line(&catalog, "sugar", 50)]),
        ];

        let recs = smart_recommendations(&Cart::new(), &catalog, &transactions, now(), 7, 3);
        let ids: Vec<_> = recs.iter().map(|r| r.product.id.as_str()).collect();

        // sugar is outside the window, cookie out of stock; croissant ties cake
        // and comes first in the catalog
        assert_eq!(ids, vec!["tea", "croissant", "cake"]);
        assert_eq!(recs[0].score, 3);
        assert_eq!(recs[0].reason, "Популярно: 3 шт. за неделю");
    }

    #[test]
    fn test_smart_skips_cart_products_and_returns() {
        let catalog = catalog();
        let mut returned = sale(1, vec![line(&catalog, "cake", 5)]);
        returned.kind = TransactionKind::Return;
        let transactions = vec![returned, sale(1, vec![line(&catalog, "tea", 2)])];

        let mut cart = Cart::new();
        cart.add_product(catalog.get("tea").unwrap(), 1).unwrap();

        assert!(smart_recommendations(&cart, &catalog, &transactions, now(), 7, 3).is_empty());
    }

    #[test]
    fn test_smart_reason_for_custom_window() {
        let catalog = catalog();
        let transactions = vec![sale(20, vec![line(&catalog, "tea", 4)])];

        let recs = smart_recommendations(&Cart::new(), &catalog, &transactions, now(), 30, 3);
        assert_eq!(recs[0].reason, "Популярно: 4 шт. за 30 дн.");
    }

    #[test]
    fn test_smart_window_past_calendar_start_counts_everything() {
        let catalog = catalog();
        let transactions = vec![sale(4000, vec![line(&catalog, "tea", 2)])];

        let recs = smart_recommendations(&Cart::new(), &catalog, &transactions, now(), u32::MAX, 3);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].product.id, "tea");
    }
}
