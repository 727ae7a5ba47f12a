use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::body::BodyMeasurements;
use crate::models::body::BodyMetricRow;

pub async fn upsert_body_metric(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
    measurements: &BodyMeasurements,
) -> Result<BodyMetricRow, sqlx::Error> {
    sqlx::query_as::<_, BodyMetricRow>(
        r#"
        INSERT INTO body_metrics (user_id, date, weight_kg, body_fat_pct, waist_cm, notes, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, now())
        ON CONFLICT (user_id, date) DO UPDATE SET
            weight_kg = EXCLUDED.weight_kg,
            body_fat_pct = EXCLUDED.body_fat_pct,
            waist_cm = EXCLUDED.waist_cm,
            notes = EXCLUDED.notes,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(measurements.weight_kg)
    .bind(measurements.body_fat_pct)
    .bind(measurements.waist_cm)
    .bind(measurements.trimmed_notes())
    .fetch_one(pool)
    .await
}

/// Entries dated within `[since, until]`, newest first.
pub async fn list_body_metrics(
    pool: &PgPool,
    user_id: Uuid,
    since: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<BodyMetricRow>, sqlx::Error> {
    sqlx::query_as::<_, BodyMetricRow>(
        r#"
        SELECT * FROM body_metrics
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

/// Most recent entry on or before `date`.
pub async fn latest_body_metric(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<BodyMetricRow>, sqlx::Error> {
    sqlx::query_as::<_, BodyMetricRow>(
        r#"
        SELECT * FROM body_metrics
        WHERE user_id = $1 AND date <= $2
        ORDER BY date DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

pub async fn delete_body_metric(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM body_metrics WHERE user_id = $1 AND date = $2")
        .bind(user_id)
        .bind(date)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Newest weigh-in minus oldest weigh-in, rounded to one decimal.
/// Expects rows newest first; `None` with fewer than two weigh-ins.
pub fn weight_change(rows: &[BodyMetricRow]) -> Option<f64> {
    let mut weights = rows.iter().filter_map(|r| r.weight_kg);
    let newest = weights.next()?;
    let oldest = weights.last()?;
    Some(((newest - oldest) * 10.0).round() / 10.0)
}
