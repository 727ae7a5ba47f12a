//! Strength workout logging: sessions made of sets, plus per-session totals.

pub mod handlers;
pub mod store;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::workout::WorkoutSetRow;

const MAX_SETS_PER_SESSION: usize = 200;
const MAX_DURATION_MINUTES: i32 = 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutSetInput {
    pub exercise_name: String,
    pub reps: i32,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// A validated set with its per-exercise number assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutSet {
    pub exercise_name: String,
    pub set_number: i32,
    pub reps: i32,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct WorkoutSummary {
    pub set_count: usize,
    pub total_reps: i64,
    /// Sum of reps × weight over weighted sets, kilograms.
    pub volume_kg: f64,
    pub exercise_count: usize,
}

impl WorkoutSummary {
    pub fn from_sets(sets: &[WorkoutSetRow]) -> Self {
        let volume: f64 = sets
            .iter()
            .map(|s| f64::from(s.reps) * s.weight_kg.unwrap_or(0.0))
            .sum();
        let exercises: HashSet<String> = sets
            .iter()
            .map(|s| s.exercise_name.to_lowercase())
            .collect();

        Self {
            set_count: sets.len(),
            total_reps: sets.iter().map(|s| i64::from(s.reps)).sum(),
            volume_kg: (volume * 10.0).round() / 10.0,
            exercise_count: exercises.len(),
        }
    }
}

pub fn validate_workout_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    Ok(name)
}

pub fn validate_duration(minutes: Option<i32>) -> Result<Option<i32>, AppError> {
    match minutes {
        Some(m) if !(1..=MAX_DURATION_MINUTES).contains(&m) => Err(AppError::Validation(
            format!("duration_minutes must be between 1 and {MAX_DURATION_MINUTES}"),
        )),
        other => Ok(other),
    }
}

/// Validates the sets and numbers them 1, 2, 3… per exercise in submission order.
/// Exercise names are matched case-insensitively; the first spelling seen is kept.
pub fn number_sets(sets: &[WorkoutSetInput]) -> Result<Vec<NewWorkoutSet>, AppError> {
    if sets.is_empty() {
        return Err(AppError::Validation(
            "sets must contain at least one set".to_string(),
        ));
    }
    if sets.len() > MAX_SETS_PER_SESSION {
        return Err(AppError::Validation(format!(
            "a workout can hold at most {MAX_SETS_PER_SESSION} sets"
        )));
    }

    let mut seen: HashMap<String, (String, i32)> = HashMap::new();
    sets.iter()
        .enumerate()
        .map(|(i, set)| {
            let name = set.exercise_name.trim();
            if name.is_empty() {
                return Err(AppError::Validation(format!(
                    "sets[{i}].exercise_name cannot be empty"
                )));
            }
            if set.reps < 0 {
                return Err(AppError::Validation(format!(
                    "sets[{i}].reps cannot be negative"
                )));
            }
            if let Some(weight) = set.weight_kg {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(AppError::Validation(format!(
                        "sets[{i}].weight_kg cannot be negative"
                    )));
                }
            }

            let entry = seen
                .entry(name.to_lowercase())
                .or_insert_with(|| (name.to_string(), 0));
            entry.1 += 1;

            Ok(NewWorkoutSet {
                exercise_name: entry.0.clone(),
                set_number: entry.1,
                reps: set.reps,
                weight_kg: set.weight_kg,
            })
        })
        .collect()
}
