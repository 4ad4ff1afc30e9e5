//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the authorization checks in [`crate::auth::access`].

pub mod article;
pub mod client;
pub mod dashboard;
pub mod faq;
pub mod food;
pub mod learning_path;
pub mod nutrition;
pub mod nutrition_plan;
pub mod shopping_list;
pub mod user;
pub mod workout;

pub use article::{ArticleService, CategoryService};
pub use client::ClientService;
pub use dashboard::DashboardService;
pub use faq::FaqService;
pub use food::FoodService;
pub use learning_path::LearningPathService;
pub use nutrition::RecipeService;
pub use nutrition_plan::NutritionPlanService;
pub use shopping_list::ShoppingListService;
pub use user::UserService;
pub use workout::WorkoutService;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Decimal column value as an API float
pub(crate) fn dec_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// API float as a Decimal column value
///
/// Callers validate the float first, so non-finite values never reach here.
pub(crate) fn f64_to_dec(f: f64) -> Decimal {
    Decimal::try_from(f).unwrap_or(Decimal::ZERO)
}

/// Round to two decimals for display
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_conversions() {
        assert_eq!(dec_to_f64(Decimal::new(125, 1)), 12.5);
        assert_eq!(f64_to_dec(2.25), Decimal::new(225, 2));
        assert_eq!(f64_to_dec(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(33.333_33), 33.33);
    }
}
