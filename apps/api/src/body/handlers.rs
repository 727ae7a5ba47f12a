//! Axum route handlers for body metrics.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::body::store::{delete_body_metric, list_body_metrics, upsert_body_metric, weight_change};
use crate::body::BodyMeasurements;
use crate::errors::AppError;
use crate::models::body::BodyMetricRow;
use crate::routes::extract::{AppJson, AppPath, AppQuery};
use crate::routes::params::{date_or_today, day_window, today, UserDaysQuery, UserIdQuery};
use crate::state::AppState;

const DEFAULT_HISTORY_DAYS: u32 = 90;
const MAX_HISTORY_DAYS: u32 = 730;

#[derive(Debug, Deserialize)]
pub struct RecordBodyMetricRequest {
    pub user_id: Uuid,
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub measurements: BodyMeasurements,
}

#[derive(Debug, Serialize)]
pub struct BodyMetricsResponse {
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub weight_change_kg: Option<f64>,
    pub entries: Vec<BodyMetricRow>,
}

/// POST /api/body-metrics
///
/// One entry per day; posting the same date again replaces it.
pub async fn handle_record_body_metric(
    State(state): State<AppState>,
    AppJson(request): AppJson<RecordBodyMetricRequest>,
) -> Result<Json<BodyMetricRow>, AppError> {
    request.measurements.validate()?;
    let date = date_or_today(request.date);

    let row = upsert_body_metric(&state.db, request.user_id, date, &request.measurements).await?;
    info!("Stored body metrics for user {} on {date}", request.user_id);
    Ok(Json(row))
}

/// GET /api/body-metrics?user_id&days
pub async fn handle_list_body_metrics(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UserDaysQuery>,
) -> Result<Json<BodyMetricsResponse>, AppError> {
    let (since, until) = day_window(today(), params.days, DEFAULT_HISTORY_DAYS, MAX_HISTORY_DAYS)?;
    let entries = list_body_metrics(&state.db, params.user_id, since, until).await?;

    Ok(Json(BodyMetricsResponse {
        since,
        until,
        weight_change_kg: weight_change(&entries),
        entries,
    }))
}

/// DELETE /api/body-metrics/:date?user_id
pub async fn handle_delete_body_metric(
    State(state): State<AppState>,
    AppPath(date): AppPath<NaiveDate>,
    AppQuery(params): AppQuery<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if !delete_body_metric(&state.db, params.user_id, date).await? {
        return Err(AppError::NotFound(format!(
            "No body metrics recorded for {date}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_flattens_measurements() {
        let json = r#"{
            "user_id": "00000000-0000-0000-0000-000000000003",
            "weight_kg": 78.4,
            "notes": "morning"
        }"#;
        let request: RecordBodyMetricRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.date, None);
        assert_eq!(request.measurements.weight_kg, Some(78.4));
        assert_eq!(request.measurements.body_fat_pct, None);
        assert!(request.measurements.validate().is_ok());
    }
}
