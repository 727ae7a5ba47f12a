//! Meal logging. Saving a meal also feeds every item back into the user's
//! frequent foods, which is the only way that history grows.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::nutrition::{MealItemRow, MealRow};
use crate::nutrition::frequent::{record_food_use, FrequentFoodUpdate};
use crate::nutrition::{MealType, NutritionTotals, Portion};

const MAX_ITEMS_PER_MEAL: usize = 50;

/// One food in a meal save request. Accepts parser output as-is (`name`,
/// `confidence` and all), nutrients per unit.
#[derive(Debug, Clone, Deserialize)]
pub struct MealItemInput {
    #[serde(alias = "name")]
    pub food_name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
}

#[derive(Debug, Deserialize)]
pub struct SaveMealRequest {
    pub user_id: Uuid,
    pub date: Option<NaiveDate>,
    pub meal_type: String,
    pub notes: Option<String>,
    pub items: Vec<MealItemInput>,
}

/// An item that passed validation, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMealItem {
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealWithItems {
    #[serde(flatten)]
    pub meal: MealRow,
    pub items: Vec<MealItemRow>,
    pub totals: NutritionTotals,
}

impl MealWithItems {
    fn new(meal: MealRow, items: Vec<MealItemRow>) -> Self {
        let totals = NutritionTotals::from_portions(items.iter().map(MealItemRow::portion));
        Self {
            meal,
            items,
            totals,
        }
    }
}

impl MealItemRow {
    pub fn portion(&self) -> Portion {
        Portion {
            quantity: self.quantity,
            calories: self.calories,
            protein: self.protein_g,
            carbs: self.carbs_g,
            fats: self.fats_g,
        }
    }
}

pub fn validate_meal_type(value: &str) -> Result<MealType, AppError> {
    MealType::parse(value).ok_or_else(|| {
        AppError::Validation(format!(
            "meal_type must be one of breakfast, lunch, dinner, snack (got '{value}')"
        ))
    })
}

pub fn validate_items(items: &[MealItemInput]) -> Result<Vec<NewMealItem>, AppError> {
    if items.is_empty() {
        return Err(AppError::Validation(
            "items must contain at least one food".to_string(),
        ));
    }
    if items.len() > MAX_ITEMS_PER_MEAL {
        return Err(AppError::Validation(format!(
            "a meal can hold at most {MAX_ITEMS_PER_MEAL} items"
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let food_name = item.food_name.trim();
            if food_name.is_empty() {
                return Err(AppError::Validation(format!(
                    "items[{i}].food_name cannot be empty"
                )));
            }
            if !item.quantity.is_finite() || item.quantity <= 0.0 {
                return Err(AppError::Validation(format!(
                    "items[{i}].quantity must be greater than zero"
                )));
            }
            for (field, value) in [
                ("calories", item.calories),
                ("protein", item.protein),
                ("carbs", item.carbs),
                ("fats", item.fats),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(AppError::Validation(format!(
                        "items[{i}].{field} cannot be negative"
                    )));
                }
            }
            let unit = item
                .unit
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .unwrap_or("serving");

            Ok(NewMealItem {
                food_name: food_name.to_string(),
                quantity: item.quantity,
                unit: unit.to_lowercase(),
                calories: item.calories,
                protein_g: item.protein,
                carbs_g: item.carbs,
                fats_g: item.fats,
            })
        })
        .collect()
}

/// Inserts the meal and its items and records each food in the frequent-foods
/// history, all in one transaction.
pub async fn save_meal(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
    meal_type: MealType,
    notes: Option<&str>,
    items: &[NewMealItem],
) -> Result<MealWithItems, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let meal = sqlx::query_as::<_, MealRow>(
        r#"
        INSERT INTO meals (user_id, date, meal_type, notes)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(meal_type.as_str())
    .bind(notes)
    .fetch_one(&mut *tx)
    .await?;

    let mut rows = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let row = sqlx::query_as::<_, MealItemRow>(
            r#"
            INSERT INTO meal_items
                (meal_id, food_name, quantity, unit, calories, protein_g, carbs_g, fats_g, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(meal.id)
        .bind(&item.food_name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.calories)
        .bind(item.protein_g)
        .bind(item.carbs_g)
        .bind(item.fats_g)
        .bind(position as i32)
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);

        record_food_use(
            &mut *tx,
            user_id,
            meal_type,
            &FrequentFoodUpdate {
                food_name: &item.food_name,
                unit: &item.unit,
                calories: item.calories,
                protein_g: item.protein_g,
                carbs_g: item.carbs_g,
                fats_g: item.fats_g,
            },
        )
        .await?;
    }

    tx.commit().await?;

    info!(
        "Saved {} meal {} with {} items for user {user_id}",
        meal_type.as_str(),
        meal.id,
        rows.len()
    );
    Ok(MealWithItems::new(meal, rows))
}

/// Meals for one day in breakfast → snack order, each with its items.
pub async fn list_meals(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<MealWithItems>, sqlx::Error> {
    let meals = sqlx::query_as::<_, MealRow>(
        r#"
        SELECT * FROM meals
        WHERE user_id = $1 AND date = $2
        ORDER BY array_position(ARRAY['breakfast', 'lunch', 'dinner', 'snack'], meal_type),
                 created_at
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    if meals.is_empty() {
        return Ok(Vec::new());
    }

    let meal_ids: Vec<Uuid> = meals.iter().map(|m| m.id).collect();
    let items = sqlx::query_as::<_, MealItemRow>(
        "SELECT * FROM meal_items WHERE meal_id = ANY($1) ORDER BY meal_id, position",
    )
    .bind(&meal_ids)
    .fetch_all(pool)
    .await?;

    Ok(group_items(meals, items))
}

fn group_items(meals: Vec<MealRow>, items: Vec<MealItemRow>) -> Vec<MealWithItems> {
    let mut by_meal: HashMap<Uuid, Vec<MealItemRow>> = HashMap::new();
    for item in items {
        by_meal.entry(item.meal_id).or_default().push(item);
    }
    meals
        .into_iter()
        .map(|meal| {
            let items = by_meal.remove(&meal.id).unwrap_or_default();
            MealWithItems::new(meal, items)
        })
        .collect()
}

/// Returns `false` when the meal does not exist or belongs to another user.
/// Frequent foods are left alone: they record what was eaten, not what is logged.
pub async fn delete_meal(pool: &PgPool, user_id: Uuid, meal_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
        .bind(meal_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(name: &str, quantity: f64) -> MealItemInput {
        MealItemInput {
            food_name: name.to_string(),
            quantity,
            unit: None,
            calories: 100.0,
            protein: 10.0,
            carbs: 5.0,
            fats: 2.0,
        }
    }

    #[test]
    fn test_validate_items_defaults_unit_and_trims_name() {
        let items = validate_items(&[item("  Greek Yogurt ", 1.5)]).unwrap();
        assert_eq!(items[0].food_name, "Greek Yogurt");
        assert_eq!(items[0].unit, "serving");
        assert_eq!(items[0].quantity, 1.5);
    }

    #[test]
    fn test_validate_items_rejects_bad_input() {
        assert!(matches!(validate_items(&[]), Err(AppError::Validation(_))));
        assert!(matches!(
            validate_items(&[item("", 1.0)]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_items(&[item("rice", 0.0)]),
            Err(AppError::Validation(_))
        ));
        let mut negative = item("rice", 1.0);
        negative.fats = -1.0;
        match validate_items(&[negative]) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("fats"), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_meal_type() {
        assert_eq!(validate_meal_type("Lunch").unwrap(), MealType::Lunch);
        assert!(matches!(
            validate_meal_type("elevenses"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_item_input_accepts_parsed_food_shape() {
        let json = r#"{"name": "Chicken Breast", "quantity": 2, "unit": "serving",
                       "calories": 165, "protein": 31, "carbs": 0, "fats": 3.6, "confidence": 0.6}"#;
        let item: MealItemInput = serde_json::from_str(json).unwrap();
        assert_eq!(item.food_name, "Chicken Breast");
        assert_eq!(item.quantity, 2.0);
        assert_eq!(item.unit.as_deref(), Some("serving"));
    }

    #[test]
    fn test_group_items_keeps_meal_order_and_totals() {
        let user_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let meal = |meal_type: &str| MealRow {
            id: Uuid::new_v4(),
            user_id,
            date,
            meal_type: meal_type.to_string(),
            notes: None,
            created_at: Utc::now(),
        };
        let breakfast = meal("breakfast");
        let dinner = meal("dinner");
        let row = |meal_id: Uuid, calories: f64, quantity: f64| MealItemRow {
            id: Uuid::new_v4(),
            meal_id,
            food_name: "food".to_string(),
            quantity,
            unit: "serving".to_string(),
            calories,
            protein_g: 1.0,
            carbs_g: 1.0,
            fats_g: 1.0,
            position: 0,
        };
        let items = vec![
            row(dinner.id, 300.0, 1.0),
            row(breakfast.id, 80.0, 2.0),
            row(breakfast.id, 120.0, 1.0),
        ];

        let grouped = group_items(vec![breakfast.clone(), dinner.clone()], items);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].meal.id, breakfast.id);
        assert_eq!(grouped[0].items.len(), 2);
        assert_eq!(grouped[0].totals.calories, 280.0);
        assert_eq!(grouped[1].totals.calories, 300.0);
    }

    #[test]
    fn test_meal_without_items_has_zero_totals() {
        let grouped = group_items(
            vec![MealRow {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                meal_type: "snack".to_string(),
                notes: None,
                created_at: Utc::now(),
            }],
            Vec::new(),
        );
        assert_eq!(grouped[0].totals, NutritionTotals::default());
    }
}
