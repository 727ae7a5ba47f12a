//! Axum route handlers for recovery tracking.

use axum::{
    extract::State,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::recovery::RecoveryScoreRow;
use crate::recovery::calculator::{
    calculate_recovery_score, recovery_components, recovery_recommendation, RecoveryComponents,
    RecoveryInput, RecoveryRecommendation,
};
use crate::recovery::store::{
    average_score, get_recovery_score, list_recovery_scores, upsert_recovery_score,
};
use crate::routes::extract::{AppJson, AppQuery};
use crate::routes::params::{date_or_today, day_window, today, UserDateQuery, UserDaysQuery};
use crate::state::AppState;

const DEFAULT_HISTORY_DAYS: u32 = 30;
const MAX_HISTORY_DAYS: u32 = 365;

#[derive(Debug, Deserialize)]
pub struct RecordRecoveryRequest {
    pub user_id: Uuid,
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub input: RecoveryInput,
}

#[derive(Debug, Serialize)]
pub struct RecoveryResponse {
    pub recovery: RecoveryScoreRow,
    pub recommendation: RecoveryRecommendation,
}

#[derive(Debug, Serialize)]
pub struct RecordRecoveryResponse {
    pub recovery: RecoveryScoreRow,
    pub components: RecoveryComponents,
    pub recommendation: RecoveryRecommendation,
}

#[derive(Debug, Serialize)]
pub struct RecoveryHistoryResponse {
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub average_score: Option<f64>,
    pub scores: Vec<RecoveryScoreRow>,
}

/// POST /api/recovery
///
/// Computes today's (or the given date's) score and overwrites any earlier one.
pub async fn handle_record_recovery(
    State(state): State<AppState>,
    AppJson(request): AppJson<RecordRecoveryRequest>,
) -> Result<Json<RecordRecoveryResponse>, AppError> {
    let date = date_or_today(request.date);
    let components = recovery_components(&request.input);
    let score = calculate_recovery_score(&request.input);

    let recovery = upsert_recovery_score(
        &state.db,
        request.user_id,
        date,
        &request.input,
        &components,
        score,
    )
    .await?;

    Ok(Json(RecordRecoveryResponse {
        recovery,
        components,
        recommendation: recovery_recommendation(score),
    }))
}

/// GET /api/recovery?user_id&date
pub async fn handle_get_recovery(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserDateQuery>,
) -> Result<Json<RecoveryResponse>, AppError> {
    let date = date_or_today(params.date);
    let recovery = get_recovery_score(&state.db, params.user_id, date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No recovery score recorded for {date}")))?;

    let recommendation = recovery_recommendation(recovery.recovery_score);
    Ok(Json(RecoveryResponse {
        recovery,
        recommendation,
    }))
}

/// GET /api/recovery/history?user_id&days
pub async fn handle_recovery_history(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserDaysQuery>,
) -> Result<Json<RecoveryHistoryResponse>, AppError> {
    let (since, until) = day_window(today(), params.days, DEFAULT_HISTORY_DAYS, MAX_HISTORY_DAYS)?;
    let scores = list_recovery_scores(&state.db, params.user_id, since, until).await?;

    Ok(Json(RecoveryHistoryResponse {
        since,
        until,
        average_score: average_score(&scores),
        scores,
    }))
}
