use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecoveryScoreRow {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub recovery_score: i32,
    pub sleep_score: Option<i32>,
    pub hrv_score: Option<i32>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<i32>,
    pub resting_hr: Option<i32>,
    pub muscle_soreness: i32,
    pub energy_level: i32,
    pub calculated_at: DateTime<Utc>,
}
