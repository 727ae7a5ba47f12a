//! Axum route handlers for workout logging.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::routes::extract::{AppJson, AppPath, AppQuery};
use crate::routes::params::{date_or_today, day_window, today, UserDaysQuery, UserIdQuery};
use crate::state::AppState;
use crate::workouts::store::{
    delete_workout, get_workout, list_workouts, save_workout, NewWorkout, WorkoutWithSets,
};
use crate::workouts::{number_sets, validate_duration, validate_workout_name, WorkoutSetInput};

const DEFAULT_HISTORY_DAYS: u32 = 30;
const MAX_HISTORY_DAYS: u32 = 365;

#[derive(Debug, Deserialize)]
pub struct SaveWorkoutRequest {
    pub user_id: Uuid,
    pub date: Option<NaiveDate>,
    pub name: String,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
    pub sets: Vec<WorkoutSetInput>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutsResponse {
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub workouts: Vec<WorkoutWithSets>,
}

/// POST /api/workouts
pub async fn handle_save_workout(
    State(state): State<AppState>,
    AppJson(request): AppJson<SaveWorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutWithSets>), AppError> {
    let name = validate_workout_name(&request.name)?;
    let duration_minutes = validate_duration(request.duration_minutes)?;
    let sets = number_sets(&request.sets)?;
    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let workout = save_workout(
        &state.db,
        &NewWorkout {
            user_id: request.user_id,
            date: date_or_today(request.date),
            name,
            duration_minutes,
            notes,
            sets: &sets,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(workout)))
}

/// GET /api/workouts?user_id&days
pub async fn handle_list_workouts(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserDaysQuery>,
) -> Result<Json<WorkoutsResponse>, AppError> {
    let (since, until) = day_window(today(), params.days, DEFAULT_HISTORY_DAYS, MAX_HISTORY_DAYS)?;
    let workouts = list_workouts(&state.db, params.user_id, since, until).await?;
    Ok(Json(WorkoutsResponse {
        since,
        until,
        workouts,
    }))
}

/// GET /api/workouts/:id?user_id
pub async fn handle_get_workout(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<Json<WorkoutWithSets>, AppError> {
    get_workout(&state.db, params.user_id, session_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Workout {session_id} not found")))
}

/// DELETE /api/workouts/:id?user_id
pub async fn handle_delete_workout(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if !delete_workout(&state.db, params.user_id, session_id).await? {
        return Err(AppError::NotFound(format!(
            "Workout {session_id} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
