//! Recovery score: a 0-100 readiness composite from sleep, HRV, resting heart
//! rate and how the user feels.
//!
//! Every component is normalized to 0–100 on its own, then blended with fixed
//! weights. Missing objective data contributes a neutral 50 rather than a
//! penalty, so the score only moves on information the user actually gave.

use serde::{Deserialize, Serialize};

const SLEEP_WEIGHT: f64 = 0.30;
const HRV_WEIGHT: f64 = 0.25;
const RESTING_HR_WEIGHT: f64 = 0.20;
const SORENESS_WEIGHT: f64 = 0.125;
const ENERGY_WEIGHT: f64 = 0.125;

const NEUTRAL: f64 = 50.0;

/// Ideal nightly sleep band, hours.
const SLEEP_BAND: (f64, f64) = (7.0, 9.0);
/// Points lost per hour outside the ideal band.
const SLEEP_PENALTY_PER_HOUR: f64 = 20.0;
/// HRV (ms) at or above which the HRV component is maxed.
const HRV_CEILING_MS: f64 = 70.0;
/// Resting HR (bpm) scoring 100 and 0 respectively.
const RESTING_HR_BEST: f64 = 50.0;
const RESTING_HR_WORST: f64 = 80.0;

fn default_subjective() -> i32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoveryInput {
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    /// 1 (poor) – 5 (great)
    #[serde(default)]
    pub sleep_quality: Option<i32>,
    /// Milliseconds.
    #[serde(default)]
    pub hrv_score: Option<i32>,
    /// Beats per minute.
    #[serde(default)]
    pub resting_hr: Option<i32>,
    /// 1 (fresh) – 5 (very sore)
    #[serde(default = "default_subjective")]
    pub muscle_soreness: i32,
    /// 1 (drained) – 5 (energized)
    #[serde(default = "default_subjective")]
    pub energy_level: i32,
}

impl Default for RecoveryInput {
    fn default() -> Self {
        Self {
            sleep_hours: None,
            sleep_quality: None,
            hrv_score: None,
            resting_hr: None,
            muscle_soreness: default_subjective(),
            energy_level: default_subjective(),
        }
    }
}

/// Per-component sub-scores, each 0–100. `None` means the input was absent
/// and the neutral midpoint was used in the blend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoveryComponents {
    pub sleep: Option<f64>,
    pub hrv: Option<f64>,
    pub resting_hr: Option<f64>,
    pub soreness: f64,
    pub energy: f64,
}

impl RecoveryComponents {
    fn weighted_total(&self) -> f64 {
        SLEEP_WEIGHT * self.sleep.unwrap_or(NEUTRAL)
            + HRV_WEIGHT * self.hrv.unwrap_or(NEUTRAL)
            + RESTING_HR_WEIGHT * self.resting_hr.unwrap_or(NEUTRAL)
            + SORENESS_WEIGHT * self.soreness
            + ENERGY_WEIGHT * self.energy
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    Excellent,
    Good,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoveryRecommendation {
    pub status: RecoveryStatus,
    pub color: String,
    pub message: String,
}

pub fn recovery_components(input: &RecoveryInput) -> RecoveryComponents {
    RecoveryComponents {
        sleep: sleep_component(input.sleep_hours, input.sleep_quality),
        hrv: input.hrv_score.map(|ms| hrv_component(f64::from(ms))),
        resting_hr: input
            .resting_hr
            .map(|bpm| resting_hr_component(f64::from(bpm))),
        soreness: f64::from(5 - clamp_scale(input.muscle_soreness)) / 4.0 * 100.0,
        energy: f64::from(clamp_scale(input.energy_level) - 1) / 4.0 * 100.0,
    }
}

/// Always within `[0, 100]`, whatever the input.
pub fn calculate_recovery_score(input: &RecoveryInput) -> i32 {
    let total = recovery_components(input).weighted_total();
    (total.round() as i32).clamp(0, 100)
}

pub fn recovery_recommendation(score: i32) -> RecoveryRecommendation {
    let (status, color, message) = match score {
        s if s >= 80 => (
            RecoveryStatus::Excellent,
            "green",
            "Fully recovered. You're ready for high-intensity training.",
        ),
        s if s >= 60 => (
            RecoveryStatus::Good,
            "blue",
            "Well recovered. Moderate to hard training is fine today.",
        ),
        s if s >= 40 => (
            RecoveryStatus::Moderate,
            "yellow",
            "Partially recovered. Keep the intensity moderate and focus on technique.",
        ),
        _ => (
            RecoveryStatus::Low,
            "red",
            "Low recovery. Prioritize rest, sleep and light mobility work.",
        ),
    };

    RecoveryRecommendation {
        status,
        color: color.to_string(),
        message: message.to_string(),
    }
}

fn sleep_component(hours: Option<f64>, quality: Option<i32>) -> Option<f64> {
    let from_hours = hours.filter(|h| h.is_finite()).map(sleep_hours_score);
    let from_quality = quality.map(|q| f64::from(clamp_scale(q) - 1) / 4.0 * 100.0);

    match (from_hours, from_quality) {
        (Some(h), Some(q)) => Some((h + q) / 2.0),
        (Some(h), None) => Some(h),
        (None, Some(q)) => Some(q),
        (None, None) => None,
    }
}

fn sleep_hours_score(hours: f64) -> f64 {
    let (low, high) = SLEEP_BAND;
    let hours_outside = if hours < low {
        low - hours
    } else if hours > high {
        hours - high
    } else {
        0.0
    };
    (100.0 - hours_outside * SLEEP_PENALTY_PER_HOUR).clamp(0.0, 100.0)
}

fn hrv_component(ms: f64) -> f64 {
    (ms / HRV_CEILING_MS * 100.0).clamp(0.0, 100.0)
}

fn resting_hr_component(bpm: f64) -> f64 {
    ((RESTING_HR_WORST - bpm) / (RESTING_HR_WORST - RESTING_HR_BEST) * 100.0).clamp(0.0, 100.0)
}

/// Subjective 1–5 scales are clamped, not rejected.
fn clamp_scale(value: i32) -> i32 {
    value.clamp(1, 5)
}
