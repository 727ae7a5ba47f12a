//! Query-string shapes and date-window helpers shared by the handlers.

use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UserDateQuery {
    pub user_id: Uuid,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UserDaysQuery {
    pub user_id: Uuid,
    pub days: Option<u32>,
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(today)
}

/// Inclusive `[since, until]` window ending at `until` and spanning `days` days.
pub fn day_window(
    until: NaiveDate,
    days: Option<u32>,
    default_days: u32,
    max_days: u32,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let days = days.unwrap_or(default_days);
    if days == 0 || days > max_days {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {max_days}"
        )));
    }
    let since = until
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .unwrap_or(NaiveDate::MIN);
    Ok((since, until))
}
