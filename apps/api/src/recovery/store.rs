use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::recovery::RecoveryScoreRow;
use crate::recovery::calculator::{RecoveryComponents, RecoveryInput};

/// Inserts or overwrites the score for `(user_id, date)`.
pub async fn upsert_recovery_score(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
    input: &RecoveryInput,
    components: &RecoveryComponents,
    score: i32,
) -> Result<RecoveryScoreRow, sqlx::Error> {
    let row = sqlx::query_as::<_, RecoveryScoreRow>(
        r#"
        INSERT INTO recovery_scores
            (user_id, date, recovery_score, sleep_score, hrv_score, sleep_hours,
             sleep_quality, resting_hr, muscle_soreness, energy_level, calculated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
        ON CONFLICT (user_id, date) DO UPDATE SET
            recovery_score = EXCLUDED.recovery_score,
            sleep_score = EXCLUDED.sleep_score,
            hrv_score = EXCLUDED.hrv_score,
            sleep_hours = EXCLUDED.sleep_hours,
            sleep_quality = EXCLUDED.sleep_quality,
            resting_hr = EXCLUDED.resting_hr,
            muscle_soreness = EXCLUDED.muscle_soreness,
            energy_level = EXCLUDED.energy_level,
            calculated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(score)
    .bind(components.sleep.map(|s| s.round() as i32))
    .bind(input.hrv_score)
    .bind(input.sleep_hours)
    .bind(input.sleep_quality.map(|q| q.clamp(1, 5)))
    .bind(input.resting_hr)
    .bind(input.muscle_soreness.clamp(1, 5))
    .bind(input.energy_level.clamp(1, 5))
    .fetch_one(pool)
    .await?;

    info!("Stored recovery score {score} for user {user_id} on {date}");
    Ok(row)
}

pub async fn get_recovery_score(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<RecoveryScoreRow>, sqlx::Error> {
    sqlx::query_as::<_, RecoveryScoreRow>(
        "SELECT * FROM recovery_scores WHERE user_id = $1 AND date = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// Scores dated within `[since, until]`, newest first.
pub async fn list_recovery_scores(
    pool: &PgPool,
    user_id: Uuid,
    since: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<RecoveryScoreRow>, sqlx::Error> {
    sqlx::query_as::<_, RecoveryScoreRow>(
        r#"
        SELECT * FROM recovery_scores
        WHERE user_id = $1 AND date BETWEEN $2 AND $3
        ORDER BY date DESC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .bind(until)
    .fetch_all(pool)
    .await
}

/// Mean score rounded to one decimal, `None` for an empty window.
pub fn average_score(rows: &[RecoveryScoreRow]) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let sum: i64 = rows.iter().map(|r| i64::from(r.recovery_score)).sum();
    let mean = sum as f64 / rows.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}
