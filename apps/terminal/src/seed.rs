//! # Demo Data
//!
//! A small coffee shop: catalog, automatic discounts, promo codes, combos
//! and pairings. Used by the demo binary and by tests.

use std::sync::Arc;

use kassa_core::pricing::{
    Combo, ComboDiscount, DiscountTemplate, Pairings, PricingEngine, PricingPolicy, PromoKind,
    Promocode,
};
use kassa_core::{Catalog, Clock, CoreResult, Money, Percent, Product};

use crate::state::PosSession;

pub fn demo_catalog() -> CoreResult<Catalog> {
    let product = |id: &str, name: &str, price: i64, stock: i64, category: &str, barcode: &str| {
        let mut p = Product::new(id, name, Money::from_major(price), stock, category);
        p.barcode = Some(barcode.to_string());
        p
    };

    Catalog::with_products(vec![
        product("espresso", "Эспрессо", 120, 50, "Напитки", "4600000000011"),
        product("cappuccino", "Капучино", 180, 50, "Напитки", "4600000000028"),
        product("latte", "Латте", 200, 50, "Напитки", "4600000000035"),
        product("tea", "Чай", 100, 50, "Напитки", "4600000000042"),
        product("juice", "Сок", 160, 0, "Напитки", "4600000000059"),
        product("croissant", "Круассан", 150, 20, "Выпечка", "4600000000066"),
        product("muffin", "Маффин", 130, 20, "Выпечка", "4600000000073"),
        product("cheesecake", "Чизкейк", 250, 10, "Десерты", "4600000000080"),
        product("sandwich", "Сэндвич", 320, 15, "Еда", "4600000000097"),
    ])
}

pub fn demo_pairings() -> Pairings {
    let pair = |ids: &[&str]| ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();

    let mut pairings = Pairings::new();
    pairings.insert("cappuccino".into(), pair(&["croissant", "muffin", "cheesecake"]));
    pairings.insert("latte".into(), pair(&["cheesecake", "croissant"]));
    pairings.insert("espresso".into(), pair(&["cheesecake"]));
    pairings.insert("tea".into(), pair(&["muffin"]));
    pairings.insert("sandwich".into(), pair(&["juice", "tea"]));
    pairings
}

/// Engine loaded with the demo rules.
pub fn demo_engine(policy: &PricingPolicy, clock: Arc<dyn Clock>) -> CoreResult<PricingEngine> {
    let mut engine = PricingEngine::new(policy.clone(), clock);

    engine.add_discount(DiscountTemplate::PercentThreshold.build("threshold"))?;
    engine.add_discount(DiscountTemplate::HappyHour.build("happy-hour"))?;
    engine.add_discount(DiscountTemplate::BuyXGetY.build("drinks-3-1"))?;
    engine.add_discount(DiscountTemplate::DayOfWeek.build("weekend"))?;

    let mut summer = Promocode::new(
        "promo-summer",
        "SUMMER10",
        "Летняя скидка",
        PromoKind::Percent { value: Percent::from_percent(10) },
    );
    summer.description = "10% на заказ от 300 ₽".into();
    summer.min_amount = Money::from_major(300);
    engine.add_promocode(summer)?;

    let mut welcome = Promocode::new(
        "promo-welcome",
        "WELCOME100",
        "Скидка новым гостям",
        PromoKind::Fixed { value: Money::from_major(100) },
    );
    welcome.min_amount = Money::from_major(1000);
    welcome.max_uses = Some(100);
    engine.add_promocode(welcome)?;

    engine.add_combo(Combo {
        id: "breakfast".into(),
        name: "Завтрак".into(),
        products: vec!["cappuccino".into(), "croissant".into()],
        discount: ComboDiscount::Percent { value: Percent::from_percent(15) },
        description: "Капучино и круассан".into(),
        is_active: true,
        valid_from: None,
        valid_to: None,
    })?;
    engine.add_combo(Combo {
        id: "lunch".into(),
        name: "Обед".into(),
        products: vec!["sandwich".into(), "tea".into()],
        discount: ComboDiscount::Fixed { value: Money::from_major(70) },
        description: "Сэндвич и чай".into(),
        is_active: true,
        valid_from: None,
        valid_to: None,
    })?;

    engine.set_pairings(demo_pairings());
    Ok(engine)
}

pub fn demo_session(policy: &PricingPolicy, clock: Arc<dyn Clock>) -> CoreResult<PosSession> {
    Ok(PosSession::new(demo_catalog()?, demo_engine(policy, clock)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_core::SystemClock;

    #[test]
    fn test_demo_data_is_valid() {
        let session = demo_session(&PricingPolicy::default(), Arc::new(SystemClock)).unwrap();
        assert_eq!(session.catalog.len(), 9);
        assert_eq!(session.engine.discounts().len(), 4);
        assert_eq!(session.engine.promocodes().len(), 2);
        assert_eq!(session.engine.combos().len(), 2);
    }

    #[test]
    fn test_pairings_reference_catalog_products() {
        let catalog = demo_catalog().unwrap();
        for (source, paired) in demo_pairings() {
            assert!(catalog.get(&source).is_some(), "{}", source);
            assert!(paired.iter().all(|id| catalog.get(id).is_some()));
        }
    }
}
