// Nutrition: free-text food parsing, meal logging, frequent foods, goals and daily summaries.

use serde::{Deserialize, Serialize};

pub mod fallback;
pub mod frequent;
pub mod handlers;
pub mod meals;
pub mod parser;
pub mod prompts;
pub mod summary;

/// Meal slots a food can be logged under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "snack" => Some(Self::Snack),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

/// A quantity of some food together with its per-unit nutrition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portion {
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Absolute nutrition (per-unit value × quantity, summed), one decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl NutritionTotals {
    pub fn from_portions<I>(portions: I) -> Self
    where
        I: IntoIterator<Item = Portion>,
    {
        let raw = portions
            .into_iter()
            .fold(NutritionTotals::default(), |acc, p| NutritionTotals {
                calories: acc.calories + p.calories * p.quantity,
                protein: acc.protein + p.protein * p.quantity,
                carbs: acc.carbs + p.carbs * p.quantity,
                fats: acc.fats + p.fats * p.quantity,
            });
        raw.rounded()
    }

    pub fn rounded(self) -> Self {
        NutritionTotals {
            calories: round_to(self.calories, 1),
            protein: round_to(self.protein, 1),
            carbs: round_to(self.carbs, 1),
            fats: round_to(self.fats, 1),
        }
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_parse_is_case_insensitive() {
        assert_eq!(MealType::parse(" Dinner "), Some(MealType::Dinner));
        assert_eq!(MealType::parse("brunch"), None);
        assert_eq!(MealType::Snack.as_str(), "snack");
    }

    #[test]
    fn test_totals_multiply_per_unit_values_by_quantity() {
        let totals = NutritionTotals::from_portions([
            Portion {
                quantity: 2.0,
                calories: 78.0,
                protein: 6.3,
                carbs: 0.6,
                fats: 5.3,
            },
            Portion {
                quantity: 1.5,
                calories: 205.0,
                protein: 4.25,
                carbs: 44.5,
                fats: 0.45,
            },
        ]);
        assert_eq!(totals.calories, 463.5);
        assert_eq!(totals.protein, 19.0);
        assert_eq!(totals.carbs, 68.0);
        assert_eq!(totals.fats, 11.3);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.655, 1), 1.7);
        assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
        assert_eq!(round_to(12.5, 0), 13.0);
    }
}
