use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::workout::{WorkoutSessionRow, WorkoutSetRow};
use crate::workouts::{NewWorkoutSet, WorkoutSummary};

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutWithSets {
    #[serde(flatten)]
    pub session: WorkoutSessionRow,
    pub sets: Vec<WorkoutSetRow>,
    pub summary: WorkoutSummary,
}

impl WorkoutWithSets {
    fn new(session: WorkoutSessionRow, sets: Vec<WorkoutSetRow>) -> Self {
        let summary = WorkoutSummary::from_sets(&sets);
        Self {
            session,
            sets,
            summary,
        }
    }
}

pub struct NewWorkout<'a> {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub name: &'a str,
    pub duration_minutes: Option<i32>,
    pub notes: Option<&'a str>,
    pub sets: &'a [NewWorkoutSet],
}

/// Inserts the session and all of its sets in one transaction.
pub async fn save_workout(
    pool: &PgPool,
    workout: &NewWorkout<'_>,
) -> Result<WorkoutWithSets, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let session = sqlx::query_as::<_, WorkoutSessionRow>(
        r#"
        INSERT INTO workout_sessions (user_id, date, name, duration_minutes, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(workout.user_id)
    .bind(workout.date)
    .bind(workout.name)
    .bind(workout.duration_minutes)
    .bind(workout.notes)
    .fetch_one(&mut *tx)
    .await?;

    let mut sets = Vec::with_capacity(workout.sets.len());
    for (position, set) in workout.sets.iter().enumerate() {
        let row = sqlx::query_as::<_, WorkoutSetRow>(
            r#"
            INSERT INTO workout_sets (session_id, exercise_name, set_number, reps, weight_kg, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(session.id)
        .bind(&set.exercise_name)
        .bind(set.set_number)
        .bind(set.reps)
        .bind(set.weight_kg)
        .bind(position as i32)
        .fetch_one(&mut *tx)
        .await?;
        sets.push(row);
    }

    tx.commit().await?;

    info!(
        "Saved workout {} with {} sets for user {}",
        session.id,
        sets.len(),
        workout.user_id
    );
    Ok(WorkoutWithSets::new(session, sets))
}

/// Sessions dated within `[since, until]`, newest first.
pub async fn list_workouts(
    pool: &PgPool,
    user_id: Uuid,
    since: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<WorkoutWithSets>, sqlx::Error> {
    let sessions = sqlx::query_as::<_, WorkoutSessionRow>(
        r#"
        SELECT * FROM workout_sessions
        WHERE user_id = $1 AND date BETWEEN $2 AND $3
        ORDER BY date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .bind(until)
    .fetch_all(pool)
    .await?;

    attach_sets(pool, sessions).await
}

/// The `limit` most recent sessions on or before `date`.
pub async fn recent_workouts(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
    limit: i64,
) -> Result<Vec<WorkoutWithSets>, sqlx::Error> {
    let sessions = sqlx::query_as::<_, WorkoutSessionRow>(
        r#"
        SELECT * FROM workout_sessions
        WHERE user_id = $1 AND date <= $2
        ORDER BY date DESC, created_at DESC
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    attach_sets(pool, sessions).await
}

pub async fn get_workout(
    pool: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<Option<WorkoutWithSets>, sqlx::Error> {
    let session = sqlx::query_as::<_, WorkoutSessionRow>(
        "SELECT * FROM workout_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(session) = session else {
        return Ok(None);
    };
    let mut found = attach_sets(pool, vec![session]).await?;
    Ok(found.pop())
}

/// Returns `false` when the session does not exist or belongs to another user.
pub async fn delete_workout(
    pool: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM workout_sessions WHERE id = $1 AND user_id = $2")
        .bind(session_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

async fn attach_sets(
    pool: &PgPool,
    sessions: Vec<WorkoutSessionRow>,
) -> Result<Vec<WorkoutWithSets>, sqlx::Error> {
    if sessions.is_empty() {
        return Ok(Vec::new());
    }

    let session_ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();
    let sets = sqlx::query_as::<_, WorkoutSetRow>(
        "SELECT * FROM workout_sets WHERE session_id = ANY($1) ORDER BY session_id, position",
    )
    .bind(&session_ids)
    .fetch_all(pool)
    .await?;

    Ok(group_sets(sessions, sets))
}

fn group_sets(sessions: Vec<WorkoutSessionRow>, sets: Vec<WorkoutSetRow>) -> Vec<WorkoutWithSets> {
    let mut by_session: HashMap<Uuid, Vec<WorkoutSetRow>> = HashMap::new();
    for set in sets {
        by_session.entry(set.session_id).or_default().push(set);
    }
    sessions
        .into_iter()
        .map(|session| {
            let sets = by_session.remove(&session.id).unwrap_or_default();
            WorkoutWithSets::new(session, sets)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(day: u32) -> WorkoutSessionRow {
        WorkoutSessionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
            name: "Push".to_string(),
            duration_minutes: Some(50),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn set(session_id: Uuid, reps: i32, weight_kg: f64) -> WorkoutSetRow {
        WorkoutSetRow {
            id: Uuid::new_v4(),
            session_id,
            exercise_name: "Bench Press".to_string(),
            set_number: 1,
            reps,
            weight_kg: Some(weight_kg),
            position: 0,
        }
    }

    #[test]
    fn test_group_sets_keeps_session_order_and_summaries() {
        let newer = session(12);
        let older = session(10);
        let sets = vec![
            set(older.id, 10, 50.0),
            set(newer.id, 5, 80.0),
            set(newer.id, 5, 80.0),
        ];

        let grouped = group_sets(vec![newer.clone(), older.clone()], sets);
        assert_eq!(grouped[0].session.id, newer.id);
        assert_eq!(grouped[0].summary.set_count, 2);
        assert_eq!(grouped[0].summary.volume_kg, 800.0);
        assert_eq!(grouped[1].summary.total_reps, 10);
    }

    #[test]
    fn test_session_without_sets_gets_empty_summary() {
        let grouped = group_sets(vec![session(1)], Vec::new());
        assert!(grouped[0].sets.is_empty());
        assert_eq!(grouped[0].summary, WorkoutSummary::default());
    }
}
