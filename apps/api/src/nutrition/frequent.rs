//! Frequent foods: the per-user, per-meal-type history behind quick-add
//! suggestions and the fallback food parser.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::nutrition::FrequentFoodRow;
use crate::nutrition::MealType;

/// Read access to a user's frequent foods, ranked by
/// `use_count DESC, last_used_at DESC`.
#[async_trait]
pub trait FrequentFoodSource: Send + Sync {
    async fn top_frequent_foods(
        &self,
        user_id: Uuid,
        meal_type: Option<MealType>,
        limit: i64,
    ) -> Result<Vec<FrequentFoodRow>, sqlx::Error>;
}

#[async_trait]
impl FrequentFoodSource for PgPool {
    async fn top_frequent_foods(
        &self,
        user_id: Uuid,
        meal_type: Option<MealType>,
        limit: i64,
    ) -> Result<Vec<FrequentFoodRow>, sqlx::Error> {
        sqlx::query_as::<_, FrequentFoodRow>(
            r#"
            SELECT * FROM frequent_foods
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR meal_type = $2)
            ORDER BY use_count DESC, last_used_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(meal_type.map(MealType::as_str))
        .bind(limit)
        .fetch_all(self)
        .await
    }
}

/// A food being written back into the history. Nutrients are per unit.
pub struct FrequentFoodUpdate<'a> {
    pub food_name: &'a str,
    pub unit: &'a str,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
}

/// Names are stored lowercased so the same food typed differently collapses into one row.
pub fn history_key(food_name: &str) -> String {
    food_name.trim().to_lowercase()
}

/// Records one more use of a food: inserts it, or bumps `use_count`, refreshes
/// `last_used_at` and takes the latest nutrition values.
pub async fn record_food_use(
    conn: &mut PgConnection,
    user_id: Uuid,
    meal_type: MealType,
    food: &FrequentFoodUpdate<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO frequent_foods
            (user_id, meal_type, food_name, unit, calories, protein_g, carbs_g, fats_g,
             use_count, last_used_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, now())
        ON CONFLICT (user_id, meal_type, food_name, unit) DO UPDATE SET
            calories = EXCLUDED.calories,
            protein_g = EXCLUDED.protein_g,
            carbs_g = EXCLUDED.carbs_g,
            fats_g = EXCLUDED.fats_g,
            use_count = frequent_foods.use_count + 1,
            last_used_at = now()
        "#,
    )
    .bind(user_id)
    .bind(meal_type.as_str())
    .bind(history_key(food.food_name))
    .bind(food.unit)
    .bind(food.calories)
    .bind(food.protein_g)
    .bind(food.carbs_g)
    .bind(food.fats_g)
    .execute(conn)
    .await?;

    Ok(())
}
