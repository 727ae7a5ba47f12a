//! Axum route handlers for the nutrition API.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::nutrition::{FrequentFoodRow, NutritionGoalsRow};
use crate::nutrition::frequent::FrequentFoodSource;
use crate::nutrition::meals::{
    delete_meal, list_meals, save_meal, validate_items, validate_meal_type, MealWithItems,
    SaveMealRequest,
};
use crate::nutrition::parser::{parse_food_text, ParseOutcome};
use crate::nutrition::summary::{
    daily_summary, get_goals, upsert_goals, DailySummary, NutritionGoals,
};
use crate::routes::extract::{AppJson, AppPath, AppQuery};
use crate::routes::params::{date_or_today, UserDateQuery, UserIdQuery};
use crate::state::AppState;

const MAX_PARSE_TEXT_CHARS: usize = 1000;
const DEFAULT_FREQUENT_LIMIT: i64 = 10;
const MAX_FREQUENT_LIMIT: i64 = 50;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// `text` is taken as raw JSON so a missing or non-string value is a 400 with
/// a field-specific message rather than a generic body rejection.
#[derive(Debug, Deserialize)]
pub struct ParseFoodRequest {
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ParseFoodResponse {
    #[serde(flatten)]
    pub outcome: ParseOutcome,
    pub ai_available: bool,
}

#[derive(Debug, Deserialize)]
pub struct FrequentFoodsQuery {
    pub user_id: Uuid,
    pub meal_type: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FrequentFoodsResponse {
    pub foods: Vec<FrequentFoodRow>,
}

#[derive(Debug, Serialize)]
pub struct MealsResponse {
    pub date: NaiveDate,
    pub meals: Vec<MealWithItems>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalsRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub goals: NutritionGoals,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/nutrition/parse
///
/// Always 200 once the input is valid; `success: false` means nothing was recognized.
pub async fn handle_parse_food(
    State(state): State<AppState>,
    AppJson(request): AppJson<ParseFoodRequest>,
) -> Result<Json<ParseFoodResponse>, AppError> {
    let text = validate_parse_text(request.text.as_ref())?;
    let user_id = request
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;

    let outcome = parse_food_text(text, user_id, state.completion.as_deref(), &state.db).await?;

    Ok(Json(ParseFoodResponse {
        outcome,
        ai_available: state.ai_available(),
    }))
}

fn validate_parse_text(text: Option<&Value>) -> Result<&str, AppError> {
    let text = match text {
        Some(Value::String(s)) => s.trim(),
        Some(_) => return Err(AppError::Validation("text must be a string".to_string())),
        None => return Err(AppError::Validation("text is required".to_string())),
    };
    if text.is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_PARSE_TEXT_CHARS {
        return Err(AppError::Validation(format!(
            "text cannot exceed {MAX_PARSE_TEXT_CHARS} characters"
        )));
    }
    Ok(text)
}

/// GET /api/nutrition/frequent?user_id&meal_type&limit
///
/// Quick-add list, most used first.
pub async fn handle_frequent_foods(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<FrequentFoodsQuery>,
) -> Result<Json<FrequentFoodsResponse>, AppError> {
    let meal_type = params
        .meal_type
        .as_deref()
        .map(validate_meal_type)
        .transpose()?;
    let limit = params.limit.unwrap_or(DEFAULT_FREQUENT_LIMIT);
    if !(1..=MAX_FREQUENT_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_FREQUENT_LIMIT}"
        )));
    }

    let foods = state
        .db
        .top_frequent_foods(params.user_id, meal_type, limit)
        .await?;
    Ok(Json(FrequentFoodsResponse { foods }))
}

/// POST /api/nutrition/meals
pub async fn handle_save_meal(
    State(state): State<AppState>,
    AppJson(request): AppJson<SaveMealRequest>,
) -> Result<(StatusCode, Json<MealWithItems>), AppError> {
    let meal_type = validate_meal_type(&request.meal_type)?;
    let items = validate_items(&request.items)?;
    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let meal = save_meal(
        &state.db,
        request.user_id,
        date_or_today(request.date),
        meal_type,
        notes,
        &items,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(meal)))
}

/// GET /api/nutrition/meals?user_id&date
pub async fn handle_list_meals(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserDateQuery>,
) -> Result<Json<MealsResponse>, AppError> {
    let date = date_or_today(params.date);
    let meals = list_meals(&state.db, params.user_id, date).await?;
    Ok(Json(MealsResponse { date, meals }))
}

/// DELETE /api/nutrition/meals/:id?user_id
pub async fn handle_delete_meal(
    State(state): State<AppState>,
    AppPath(meal_id): AppPath<Uuid>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if !delete_meal(&state.db, params.user_id, meal_id).await? {
        return Err(AppError::NotFound(format!("Meal {meal_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/nutrition/goals?user_id
pub async fn handle_get_goals(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<NutritionGoals>, AppError> {
    Ok(Json(get_goals(&state.db, params.user_id).await?))
}

/// PUT /api/nutrition/goals
pub async fn handle_update_goals(
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateGoalsRequest>,
) -> Result<Json<NutritionGoalsRow>, AppError> {
    request.goals.validate()?;
    let row = upsert_goals(&state.db, request.user_id, &request.goals).await?;
    Ok(Json(row))
}

/// GET /api/nutrition/summary?user_id&date
pub async fn handle_daily_summary(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserDateQuery>,
) -> Result<Json<DailySummary>, AppError> {
    let date = date_or_today(params.date);
    Ok(Json(daily_summary(&state.db, params.user_id, date).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_validation() {
        assert!(matches!(
            validate_parse_text(None),
            Err(AppError::Validation(msg)) if msg == "text is required"
        ));
        assert!(matches!(
            validate_parse_text(Some(&json!(42))),
            Err(AppError::Validation(msg)) if msg == "text must be a string"
        ));
        assert!(matches!(
            validate_parse_text(Some(&json!("   "))),
            Err(AppError::Validation(_))
        ));
        let long = json!("a".repeat(MAX_PARSE_TEXT_CHARS + 1));
        assert!(matches!(
            validate_parse_text(Some(&long)),
            Err(AppError::Validation(_))
        ));
        let ok = json!("  2 eggs ");
        assert_eq!(validate_parse_text(Some(&ok)).unwrap(), "2 eggs");
    }

    #[test]
    fn test_update_goals_request_flattens() {
        let request: UpdateGoalsRequest = serde_json::from_value(json!({
            "user_id": "00000000-0000-0000-0000-000000000002",
            "calories": 2400,
            "protein_g": 180,
            "carbs_g": 250,
            "fats_g": 70
        }))
        .unwrap();
        assert_eq!(request.goals.calories, 2400.0);
        assert_eq!(request.goals.fats_g, 70.0);
    }
}
