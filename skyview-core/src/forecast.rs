//! Reduction of a 3-hour forecast series to one representative sample per day.

use chrono::{NaiveDate, Timelike};
use serde::Serialize;

use crate::{
    format::{local_time, weekday_label},
    model::{ForecastSample, ForecastSeries},
};

pub const MAX_FORECAST_DAYS: usize = 5;

const TARGET_HOUR: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    /// Local calendar date of the place.
    pub date: NaiveDate,
    /// Short weekday, e.g. `"Mon"`.
    pub label: String,
    pub sample: ForecastSample,
}

/// Picks, for each local calendar day in `series`, the sample closest to noon.
///
/// Days are kept in order of first appearance and capped at
/// [`MAX_FORECAST_DAYS`]. Ties go to the sample listed first. Grouping uses the
/// full date, so samples a week apart never share a day.
pub fn daily_forecast(series: &ForecastSeries) -> Vec<DailyForecast> {
    let offset = series.place.utc_offset_secs;

    // (date, best sample, distance from noon)
    let mut days: Vec<(NaiveDate, &ForecastSample, u32)> = Vec::new();

    for sample in &series.samples {
        let local = local_time(sample.time, offset);
        let date = local.date();
        let distance = local.hour().abs_diff(TARGET_HOUR);

        match days.iter_mut().find(|(day, _, _)| *day == date) {
            Some(day) => {
                if distance < day.2 {
                    day.1 = sample;
                    day.2 = distance;
                }
            }
            None => days.push((date, sample, distance)),
        }
    }

    days.into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|(date, sample, _)| DailyForecast {
            date,
            label: weekday_label(sample.time, offset),
            sample: sample.clone(),
        })
        .collect()
}
