use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Nutrient columns are per unit: the meal total is value × quantity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FrequentFoodRow {
    pub user_id: Uuid,
    pub meal_type: String,
    pub food_name: String,
    pub unit: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
    pub use_count: i32,
    pub last_used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub meal_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealItemRow {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NutritionGoalsRow {
    pub user_id: Uuid,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
    pub updated_at: DateTime<Utc>,
}
