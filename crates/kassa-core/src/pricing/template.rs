//! # Discount Templates
//!
//! Starting points the admin screen offers when creating a rule. Every
//! template produces a rule that passes `validate_discount`.
//!
//! | key                 | rule                                      |
//! |---------------------|-------------------------------------------|
//! | `percent_threshold` | 5% off orders from 500 ₽                  |
//! | `happy_hour`        | 15% off between 14:00 and 16:00           |
//! | `buy_x_get_y`       | buy 3 drinks, get the cheapest one free   |
//! | `day_of_week`       | 10% off on Saturdays and Sundays          |
//! | `category_percent`  | 20% off pastries                          |
//! | `bare_promo`        | inactive 10% rule with no conditions      |

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::condition::{Condition, TimeRange};
use crate::pricing::discount::{BuyXGetY, Discount, DiscountKind};
use crate::types::{Percent, TimeOfDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountTemplate {
    PercentThreshold,
    HappyHour,
    BuyXGetY,
    DayOfWeek,
    CategoryPercent,
    BarePromo,
}

impl DiscountTemplate {
    pub const ALL: [DiscountTemplate; 6] = [
        DiscountTemplate::PercentThreshold,
        DiscountTemplate::HappyHour,
        DiscountTemplate::BuyXGetY,
        DiscountTemplate::DayOfWeek,
        DiscountTemplate::CategoryPercent,
        DiscountTemplate::BarePromo,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DiscountTemplate::PercentThreshold => "percent_threshold",
            DiscountTemplate::HappyHour => "happy_hour",
            DiscountTemplate::BuyXGetY => "buy_x_get_y",
            DiscountTemplate::DayOfWeek => "day_of_week",
            DiscountTemplate::CategoryPercent => "category_percent",
            DiscountTemplate::BarePromo => "bare_promo",
        }
    }

    /// Builds a fresh rule with the given id.
    pub fn build(&self, id: impl Into<String>) -> Discount {
        let percent = |p| DiscountKind::Percent { value: Percent::from_percent(p) };

        let (name, description, kind, conditions) = match self {
            DiscountTemplate::PercentThreshold => (
                "Скидка 5% от 500 ₽",
                "5% на заказ от 500 ₽",
                percent(5),
                vec![Condition::MinAmount { value: Money::from_major(500) }],
            ),
            DiscountTemplate::HappyHour => (
                "Счастливые часы",
                "15% с 14:00 до 16:00",
                percent(15),
                vec![Condition::TimeRange {
                    value: TimeRange::new(TimeOfDay::at(14, 0), TimeOfDay::at(16, 0)),
                }],
            ),
            DiscountTemplate::BuyXGetY => (
                "3+1 на напитки",
                "Каждый четвёртый напиток бесплатно",
                DiscountKind::BuyXGetY { value: BuyXGetY { buy_x: 3, get_y: 1 } },
                vec![Condition::Category { value: "Напитки".to_string() }],
            ),
            DiscountTemplate::DayOfWeek => (
                "Скидка выходного дня",
                "10% по субботам и воскресеньям",
                percent(10),
                vec![Condition::DayOfWeek { value: vec![0, 6] }],
            ),
            DiscountTemplate::CategoryPercent => (
                "Скидка на выпечку",
                "20% на категорию «Выпечка»",
                percent(20),
                vec![Condition::Category { value: "Выпечка".to_string() }],
            ),
            DiscountTemplate::BarePromo => ("Новая скидка", "", percent(10), Vec::new()),
        };

        let mut discount = Discount::new(id, name, kind);
        discount.description = description.to_string();
        discount.conditions = conditions;
        // An unconditional rule would discount every cart the moment it is saved.
        discount.is_active = *self != DiscountTemplate::BarePromo;
        discount
    }
}

impl fmt::Display for DiscountTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DiscountTemplate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        DiscountTemplate::ALL
            .into_iter()
            .find(|t| t.key() == key)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "template".to_string(),
                allowed: DiscountTemplate::ALL.iter().map(|t| t.key().to_string()).collect(),
            })
    }
}
