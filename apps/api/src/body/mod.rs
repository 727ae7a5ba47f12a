// Body metrics: daily weight, body fat and waist measurements.

pub mod handlers;
pub mod store;

use serde::Deserialize;

use crate::errors::AppError;

pub const MAX_WEIGHT_KG: f64 = 500.0;
pub const MAX_WAIST_CM: f64 = 300.0;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BodyMeasurements {
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub waist_cm: Option<f64>,
    pub notes: Option<String>,
}

impl BodyMeasurements {
    /// At least one measurement must be present and each must be in range.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.weight_kg.is_none() && self.body_fat_pct.is_none() && self.waist_cm.is_none() {
            return Err(AppError::Validation(
                "at least one of weight_kg, body_fat_pct or waist_cm is required".to_string(),
            ));
        }
        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight <= 0.0 || weight > MAX_WEIGHT_KG {
                return Err(AppError::Validation(format!(
                    "weight_kg must be greater than 0 and at most {MAX_WEIGHT_KG}"
                )));
            }
        }
        if let Some(fat) = self.body_fat_pct {
            if !fat.is_finite() || !(0.0..=100.0).contains(&fat) {
                return Err(AppError::Validation(
                    "body_fat_pct must be between 0 and 100".to_string(),
                ));
            }
        }
        if let Some(waist) = self.waist_cm {
            if !waist.is_finite() || waist <= 0.0 || waist > MAX_WAIST_CM {
                return Err(AppError::Validation(format!(
                    "waist_cm must be greater than 0 and at most {MAX_WAIST_CM}"
                )));
            }
        }
        Ok(())
    }

    pub fn trimmed_notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_a_measurement() {
        let notes_only = BodyMeasurements {
            notes: Some("felt bloated".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            notes_only.validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_weight_bounds() {
        let at_max = BodyMeasurements {
            weight_kg: Some(500.0),
            ..Default::default()
        };
        assert!(at_max.validate().is_ok());

        for weight in [0.0, -3.0, 500.1, f64::NAN] {
            let m = BodyMeasurements {
                weight_kg: Some(weight),
                ..Default::default()
            };
            assert!(m.validate().is_err(), "weight {weight} accepted");
        }
    }

    #[test]
    fn test_body_fat_bounds_are_inclusive() {
        for fat in [0.0, 100.0, 18.5] {
            let m = BodyMeasurements {
                body_fat_pct: Some(fat),
                ..Default::default()
            };
            assert!(m.validate().is_ok());
        }
        let over = BodyMeasurements {
            body_fat_pct: Some(100.5),
            ..Default::default()
        };
        match over.validate() {
            Err(AppError::Validation(msg)) => assert!(msg.starts_with("body_fat_pct")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let m = BodyMeasurements {
            notes: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(m.trimmed_notes(), None);
    }
}
