//! Plain-text rendering of controller snapshots.

use skyview_core::{
    AppState, CurrentConditions, DailyForecast, UnitSystem,
    format::{
        format_date, format_percent, format_precipitation_chance, format_pressure,
        format_temperature, format_time, format_visibility, format_wind,
    },
    history::RecentSearches,
    map::{MapSettings, MapTarget, MapView},
};

const EMPTY_PROMPT: &str = "Search for a city to see the weather.";

pub fn render_state(state: &AppState) -> String {
    let mut lines = Vec::new();

    if state.is_loading() {
        lines.push("Loading weather data...".to_string());
    }

    if let Some(error) = &state.error {
        lines.push(format!("! {error}"));
    }

    match state.current.as_deref() {
        Some(current) => {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.extend(render_current(current, state.units));

            let days = state.daily_forecast();
            if !days.is_empty() {
                lines.push(String::new());
                lines.extend(render_forecast(&days, state.units));
            }
        }
        None if state.error.is_none() && !state.is_loading() => lines.push(EMPTY_PROMPT.to_string()),
        None => {}
    }

    lines.join("\n")
}

fn render_current(current: &CurrentConditions, units: UnitSystem) -> Vec<String> {
    let offset = current.utc_offset_secs;
    let t = &current.temperature;
    let description = current
        .primary_condition()
        .map(|c| c.description.as_str())
        .unwrap_or_default();

    vec![
        current.display_name(),
        format_date(current.observed_at, offset),
        format!("{}  {}", format_temperature(t.current, units), description),
        format!(
            "Feels like {}  H: {}  L: {}",
            format_temperature(t.feels_like, units),
            format_temperature(t.max, units),
            format_temperature(t.min, units),
        ),
        String::new(),
        detail("Wind", format_wind(current.wind.speed, current.wind.direction_deg, units)),
        detail("Humidity", format_percent(t.humidity)),
        detail("Visibility", format_visibility(current.visibility_m)),
        detail("Pressure", format_pressure(t.pressure)),
        detail("Cloudiness", format_percent(current.cloudiness_pct)),
        detail("Sunrise", format_time(current.sunrise, offset)),
        detail("Sunset", format_time(current.sunset, offset)),
    ]
}

fn detail(label: &str, value: String) -> String {
    format!("  {label:<11}{value}")
}

fn render_forecast(days: &[DailyForecast], units: UnitSystem) -> Vec<String> {
    let mut lines = vec![format!("{}-Day Forecast", days.len())];

    for day in days {
        let description = day
            .sample
            .primary_condition()
            .map(|c| c.description.as_str())
            .unwrap_or_default();

        lines.push(format!(
            "  {:<4}{:>6}  {:<18}{:>4} rain",
            day.label,
            format_temperature(day.sample.temperature.current, units),
            description,
            format_precipitation_chance(day.sample.precipitation_chance),
        ));
    }

    lines
}

pub fn render_history(history: &RecentSearches) -> String {
    if history.is_empty() {
        return "No recent searches.".to_string();
    }

    let mut lines = vec!["Recent searches:".to_string()];
    lines.extend(
        history
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("  {}. {entry}", i + 1)),
    );
    lines.join("\n")
}

pub fn render_map(settings: &MapSettings, target: Option<&MapTarget>) -> String {
    let provider = settings.effective_provider();

    match settings.view(target) {
        MapView::Placeholder { message } => message,
        MapView::Embed { url } => {
            let mut lines = vec![format!("Map ({})", provider.label), format!("  embed: {url}")];
            if let Some(target) = target {
                lines.push(format!("  open:  {}", settings.external_link(target)));
            }
            if let Some(coordinates) = target.and_then(|t| t.coordinates) {
                let tiles = settings.layer.tile_layer();
                lines.push(format!(
                    "  tile:  {} ({})",
                    tiles.tile_url(coordinates, settings.zoom),
                    tiles.attribution
                ));
            }
            lines.join("\n")
        }
        MapView::Image { url, alt } => {
            let mut lines = vec![format!("{alt} ({})", provider.label), format!("  image: {url}")];
            if let Some(target) = target {
                lines.push(format!("  open:  {}", settings.external_link(target)));
            }
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use skyview_core::{
        Coordinates, ForecastSeries,
        model::{Condition, ForecastPlace, ForecastSample, Temperatures, Wind},
    };
    use std::sync::Arc;

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    fn clouds() -> Vec<Condition> {
        vec![Condition {
            id: 803,
            category: "Clouds".into(),
            description: "broken clouds".into(),
            icon: "04d".into(),
        }]
    }

    fn temps(current: f64) -> Temperatures {
        Temperatures {
            current,
            feels_like: current - 1.0,
            min: current - 3.0,
            max: current + 2.0,
            pressure: 1015.0,
            humidity: 64,
        }
    }

    // 2024-06-03 12:00 UTC, shown at UTC+2
    const NOON: i64 = 1_717_416_000;

    fn paris_state() -> AppState {
        let coordinates = Coordinates::new(48.85, 2.35);
        let current = CurrentConditions {
            name: "Paris".into(),
            country: "FR".into(),
            observed_at: at(NOON),
            utc_offset_secs: 7200,
            conditions: clouds(),
            temperature: temps(21.6),
            wind: Wind {
                speed: 3.6,
                direction_deg: 250.0,
            },
            cloudiness_pct: 75,
            visibility_m: 10000,
            sunrise: at(NOON - 8 * 3600),
            sunset: at(NOON + 7 * 3600),
            coordinates,
        };
        let forecast = ForecastSeries {
            place: ForecastPlace {
                name: "Paris".into(),
                country: "FR".into(),
                utc_offset_secs: 7200,
                sunrise: current.sunrise,
                sunset: current.sunset,
                coordinates,
            },
            samples: vec![ForecastSample {
                time: at(NOON - 2 * 3600),
                temperature: temps(19.2),
                conditions: clouds(),
                cloudiness_pct: 75,
                wind: current.wind,
                visibility_m: Some(10000),
                precipitation_chance: 0.2,
            }],
        };

        AppState {
            place: Some("Paris, FR".into()),
            current: Some(Arc::new(current)),
            forecast: Some(Arc::new(forecast)),
            ..AppState::default()
        }
    }

    #[test]
    fn empty_state_prompts_for_search() {
        assert_eq!(render_state(&AppState::default()), EMPTY_PROMPT);
    }

    #[test]
    fn renders_current_conditions_in_local_time() {
        let out = render_state(&paris_state());

        assert!(out.starts_with("Paris, FR\nMonday, June 3, 2024\n22°C  broken clouds"));
        assert!(out.contains("Feels like 21°C  H: 24°C  L: 19°C"));
        assert!(out.contains("Wind       3.6 m/s WSW"));
        assert!(out.contains("Humidity   64%"));
        assert!(out.contains("Visibility 10.0 km"));
        assert!(out.contains("Pressure   1015 hPa"));
        assert!(out.contains("Sunrise    6:00 AM"));
        assert!(out.contains("Sunset     9:00 PM"));
    }

    #[test]
    fn renders_forecast_rows() {
        let out = render_state(&paris_state());

        assert!(out.contains("1-Day Forecast"));
        assert!(out.contains("Mon"));
        assert!(out.contains("19°C"));
        assert!(out.contains("20% rain"));
    }

    #[test]
    fn imperial_units_change_suffixes() {
        let state = AppState {
            units: UnitSystem::Imperial,
            ..paris_state()
        };
        let out = render_state(&state);

        assert!(out.contains("22°F"));
        assert!(out.contains("3.6 mph WSW"));
    }

    #[test]
    fn error_banner_sits_above_stale_data() {
        let state = AppState {
            error: Some("City not found. Please check the spelling and try again.".into()),
            ..paris_state()
        };
        let out = render_state(&state);

        assert!(out.starts_with("! City not found."));
        assert!(out.contains("Paris, FR"));
    }

    #[test]
    fn history_is_numbered() {
        let mut history = RecentSearches::new();
        history.record("Paris, FR");
        history.record("Oslo, NO");

        assert_eq!(
            render_history(&history),
            "Recent searches:\n  1. Oslo, NO\n  2. Paris, FR"
        );
        assert_eq!(render_history(&RecentSearches::new()), "No recent searches.");
    }

    #[test]
    fn map_without_target_shows_placeholder() {
        let out = render_map(&MapSettings::default(), None);
        assert_eq!(out, "Search for a city to display the map");
    }

    #[test]
    fn map_with_target_lists_embed_link_and_tile() {
        let target = paris_state().map_target().unwrap();
        let out = render_map(&MapSettings::default(), Some(&target));

        assert!(out.starts_with("Map (OpenStreetMap)"));
        assert!(out.contains("embed: https://www.openstreetmap.org/export/embed.html?bbox="));
        assert!(out.contains("open:  https://www.openstreetmap.org/?mlat=48.85&mlon=2.35&zoom=12"));
        assert!(out.contains("tile.openstreetmap.org/12/"));
    }
}
