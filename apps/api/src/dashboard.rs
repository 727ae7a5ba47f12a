//! One-call daily overview across nutrition, recovery, body metrics and workouts.

use axum::{
    extract::State,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;

use crate::body::store::latest_body_metric;
use crate::errors::AppError;
use crate::models::body::BodyMetricRow;
use crate::nutrition::summary::{daily_summary, DailySummary};
use crate::recovery::calculator::recovery_recommendation;
use crate::recovery::handlers::RecoveryResponse;
use crate::recovery::store::get_recovery_score;
use crate::routes::extract::AppQuery;
use crate::routes::params::{date_or_today, UserDateQuery};
use crate::state::AppState;
use crate::workouts::store::{recent_workouts, WorkoutWithSets};

const RECENT_WORKOUT_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub nutrition: DailySummary,
    pub recovery: Option<RecoveryResponse>,
    pub latest_body_metric: Option<BodyMetricRow>,
    pub recent_workouts: Vec<WorkoutWithSets>,
}

/// GET /api/dashboard?user_id&date
///
/// Sections with no data come back as `null` or empty; only database failures error.
pub async fn handle_dashboard(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserDateQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let date = date_or_today(params.date);
    let user_id = params.user_id;

    let (nutrition, recovery, latest_body_metric, recent_workouts) = tokio::try_join!(
        daily_summary(&state.db, user_id, date),
        get_recovery_score(&state.db, user_id, date),
        latest_body_metric(&state.db, user_id, date),
        recent_workouts(&state.db, user_id, date, RECENT_WORKOUT_LIMIT),
    )?;

    let recovery = recovery.map(|recovery| RecoveryResponse {
        recommendation: recovery_recommendation(recovery.recovery_score),
        recovery,
    });

    Ok(Json(DashboardResponse {
        date,
        nutrition,
        recovery,
        latest_body_metric,
        recent_workouts,
    }))
}
