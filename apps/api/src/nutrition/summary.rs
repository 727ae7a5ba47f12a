//! Daily nutrition summary: what was eaten against the user's goals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::nutrition::NutritionGoalsRow;
use crate::nutrition::NutritionTotals;

pub const DEFAULT_CALORIES: f64 = 2000.0;
pub const DEFAULT_PROTEIN_G: f64 = 150.0;
pub const DEFAULT_CARBS_G: f64 = 200.0;
pub const DEFAULT_FATS_G: f64 = 65.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutritionGoals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
}

impl Default for NutritionGoals {
    fn default() -> Self {
        Self {
            calories: DEFAULT_CALORIES,
            protein_g: DEFAULT_PROTEIN_G,
            carbs_g: DEFAULT_CARBS_G,
            fats_g: DEFAULT_FATS_G,
        }
    }
}

impl From<NutritionGoalsRow> for NutritionGoals {
    fn from(row: NutritionGoalsRow) -> Self {
        Self {
            calories: row.calories,
            protein_g: row.protein_g,
            carbs_g: row.carbs_g,
            fats_g: row.fats_g,
        }
    }
}

impl NutritionGoals {
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fats_g", self.fats_g),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AppError::Validation(format!(
                    "{field} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

/// Percent of each goal reached. Not capped: 130 means 30% over.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GoalProgress {
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fats: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub consumed: NutritionTotals,
    pub goals: NutritionGoals,
    pub percent_of_goal: GoalProgress,
    pub remaining: NutritionTotals,
    pub meal_count: i64,
}

#[derive(Debug, FromRow)]
struct ConsumedRow {
    calories: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
    meal_count: i64,
}

pub fn percent_of_goal(consumed: f64, goal: f64) -> i32 {
    if goal <= 0.0 {
        return 0;
    }
    (consumed / goal * 100.0).round() as i32
}

pub fn build_summary(
    date: NaiveDate,
    consumed: NutritionTotals,
    goals: NutritionGoals,
    meal_count: i64,
) -> DailySummary {
    let consumed = consumed.rounded();
    let remaining = NutritionTotals {
        calories: (goals.calories - consumed.calories).max(0.0),
        protein: (goals.protein_g - consumed.protein).max(0.0),
        carbs: (goals.carbs_g - consumed.carbs).max(0.0),
        fats: (goals.fats_g - consumed.fats).max(0.0),
    }
    .rounded();

    DailySummary {
        date,
        consumed,
        goals,
        percent_of_goal: GoalProgress {
            calories: percent_of_goal(consumed.calories, goals.calories),
            protein: percent_of_goal(consumed.protein, goals.protein_g),
            carbs: percent_of_goal(consumed.carbs, goals.carbs_g),
            fats: percent_of_goal(consumed.fats, goals.fats_g),
        },
        remaining,
        meal_count,
    }
}

/// The user's goals, or the defaults if they never set any.
pub async fn get_goals(pool: &PgPool, user_id: Uuid) -> Result<NutritionGoals, sqlx::Error> {
    let row = sqlx::query_as::<_, NutritionGoalsRow>(
        "SELECT * FROM nutrition_goals WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(NutritionGoals::from).unwrap_or_default())
}

pub async fn upsert_goals(
    pool: &PgPool,
    user_id: Uuid,
    goals: &NutritionGoals,
) -> Result<NutritionGoalsRow, sqlx::Error> {
    sqlx::query_as::<_, NutritionGoalsRow>(
        r#"
        INSERT INTO nutrition_goals (user_id, calories, protein_g, carbs_g, fats_g, updated_at)
        VALUES ($1, $2, $3, $4, $5, now())
        ON CONFLICT (user_id) DO UPDATE SET
            calories = EXCLUDED.calories,
            protein_g = EXCLUDED.protein_g,
            carbs_g = EXCLUDED.carbs_g,
            fats_g = EXCLUDED.fats_g,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(goals.calories)
    .bind(goals.protein_g)
    .bind(goals.carbs_g)
    .bind(goals.fats_g)
    .fetch_one(pool)
    .await
}

pub async fn daily_summary(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<DailySummary, sqlx::Error> {
    let consumed = sqlx::query_as::<_, ConsumedRow>(
        r#"
        SELECT
            COALESCE(SUM(i.calories * i.quantity), 0)::DOUBLE PRECISION AS calories,
            COALESCE(SUM(i.protein_g * i.quantity), 0)::DOUBLE PRECISION AS protein,
            COALESCE(SUM(i.carbs_g * i.quantity), 0)::DOUBLE PRECISION AS carbs,
            COALESCE(SUM(i.fats_g * i.quantity), 0)::DOUBLE PRECISION AS fats,
            (SELECT COUNT(*) FROM meals WHERE user_id = $1 AND date = $2) AS meal_count
        FROM meals m
        JOIN meal_items i ON i.meal_id = m.id
        WHERE m.user_id = $1 AND m.date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(pool)
    .await?;

    let goals = get_goals(pool, user_id).await?;

    Ok(build_summary(
        date,
        NutritionTotals {
            calories: consumed.calories,
            protein: consumed.protein,
            carbs: consumed.carbs,
            fats: consumed.fats,
        },
        goals,
        consumed.meal_count,
    ))
}
