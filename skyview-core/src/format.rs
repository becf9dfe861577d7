//! Display formatting for raw weather values.
//!
//! All functions are pure. Timestamps are shifted by the place's UTC offset and
//! then formatted as naive wall-clock values, so the output never depends on the
//! host time zone.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::model::UnitSystem;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Wall-clock time at a place `utc_offset_secs` east of UTC.
pub fn local_time(time: DateTime<Utc>, utc_offset_secs: i32) -> NaiveDateTime {
    (time + TimeDelta::seconds(i64::from(utc_offset_secs))).naive_utc()
}

/// `21.6, metric` -> `"22°C"`
pub fn format_temperature(temp: f64, units: UnitSystem) -> String {
    // `as` saturates; -0.0 renders as 0
    let rounded = temp.round() as i64;
    format!("{}°{}", rounded, units.temperature_suffix())
}

/// 12-hour clock, e.g. `"6:05 AM"`.
pub fn format_time(time: DateTime<Utc>, utc_offset_secs: i32) -> String {
    local_time(time, utc_offset_secs).format("%-I:%M %p").to_string()
}

/// Long date, e.g. `"Monday, June 3, 2024"`.
pub fn format_date(time: DateTime<Utc>, utc_offset_secs: i32) -> String {
    local_time(time, utc_offset_secs).format("%A, %B %-d, %Y").to_string()
}

/// Short weekday label, e.g. `"Mon"`.
pub fn weekday_label(time: DateTime<Utc>, utc_offset_secs: i32) -> String {
    local_time(time, utc_offset_secs).format("%a").to_string()
}

/// 16-point compass direction for a bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    let index = (degrees / 22.5).round() as i64;
    COMPASS_POINTS[index.rem_euclid(16) as usize]
}

pub fn format_wind_speed(speed: f64, units: UnitSystem) -> String {
    format!("{} {}", speed, units.speed_suffix())
}

/// Speed plus compass direction, e.g. `"3.6 m/s WSW"`.
pub fn format_wind(speed: f64, degrees: f64, units: UnitSystem) -> String {
    format!("{} {}", format_wind_speed(speed, units), wind_direction(degrees))
}

pub fn format_visibility(meters: u32) -> String {
    format!("{:.1} km", f64::from(meters) / 1000.0)
}

pub fn format_pressure(hpa: f64) -> String {
    format!("{hpa} hPa")
}

pub fn format_percent(value: u8) -> String {
    format!("{value}%")
}

pub fn format_precipitation_chance(pop: f64) -> String {
    format!("{}%", (pop * 100.0).round() as i64)
}

/// Image URL for a provider icon code such as `"01d"`.
pub fn icon_url(icon: &str) -> String {
    format!("{ICON_URL_BASE}/{icon}@2x.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn temperature_rounds_and_suffixes() {
        assert_eq!(format_temperature(0.0, UnitSystem::Metric), "0°C");
        assert_eq!(format_temperature(32.0, UnitSystem::Imperial), "32°F");
        assert_eq!(format_temperature(21.6, UnitSystem::Metric), "22°C");
        assert_eq!(format_temperature(-3.4, UnitSystem::Metric), "-3°C");
        assert_eq!(format_temperature(-0.2, UnitSystem::Metric), "0°C");
    }

    #[test]
    fn compass_points() {
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(22.5), "NNE");
        assert_eq!(wind_direction(90.0), "E");
        assert_eq!(wind_direction(250.0), "WSW");
        assert_eq!(wind_direction(350.0), "N");
        assert_eq!(wind_direction(360.0), "N");
        assert_eq!(wind_direction(382.5), "NNE");
    }

    #[test]
    fn clock_time_uses_offset() {
        // 2024-06-03 04:30:00 UTC
        let t = ts(1717389000);
        assert_eq!(format_time(t, 0), "4:30 AM");
        assert_eq!(format_time(t, 7200), "6:30 AM");
        assert_eq!(format_time(t, -5 * 3600), "11:30 PM");
    }

    #[test]
    fn midnight_and_noon_are_twelve() {
        // 2024-06-03 00:00:00 UTC
        let midnight = ts(1717372800);
        assert_eq!(format_time(midnight, 0), "12:00 AM");
        assert_eq!(format_time(midnight, 12 * 3600), "12:00 PM");
    }

    #[test]
    fn long_date_and_weekday() {
        let t = ts(1717389000);
        assert_eq!(format_date(t, 0), "Monday, June 3, 2024");
        assert_eq!(weekday_label(t, 0), "Mon");
        assert_eq!(weekday_label(t, -5 * 3600), "Sun");
    }

    #[test]
    fn detail_values() {
        assert_eq!(format_wind(3.6, 250.0, UnitSystem::Metric), "3.6 m/s WSW");
        assert_eq!(format_wind(8.0, 0.0, UnitSystem::Imperial), "8 mph N");
        assert_eq!(format_visibility(10000), "10.0 km");
        assert_eq!(format_visibility(2400), "2.4 km");
        assert_eq!(format_pressure(1016.0), "1016 hPa");
        assert_eq!(format_percent(48), "48%");
        assert_eq!(format_precipitation_chance(0.26), "26%");
    }

    #[test]
    fn icon_url_template() {
        assert_eq!(icon_url("10n"), "https://openweathermap.org/img/wn/10n@2x.png");
    }
}
