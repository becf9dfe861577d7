use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use tracing::instrument;

use crate::{
    error::{Endpoint, WeatherError},
    model::{
        Condition, Coordinates, CurrentConditions, ForecastPlace, ForecastSample, ForecastSeries,
        PlaceQuery, Temperatures, UnitSystem, Wind,
    },
};

use super::WeatherClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Client for the OpenWeather 2.5 current-weather and 5 day / 3 hour forecast endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &PlaceQuery,
        units: UnitSystem,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint.path());

        let mut params = query.query_pairs();
        params.push(("appid", self.api_key.clone()));
        params.push(("units", units.as_str().to_string()));

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(%endpoint, status = status.as_u16(), "weather request failed");
            return Err(status_error(endpoint, status, &body));
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_current(
        &self,
        query: &PlaceQuery,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json(Endpoint::Current, query, units).await?;
        Ok(parsed.into())
    }

    async fn fetch_forecast(
        &self,
        query: &PlaceQuery,
        units: UnitSystem,
    ) -> Result<ForecastSeries, WeatherError> {
        let parsed: OwForecastResponse = self.get_json(Endpoint::Forecast, query, units).await?;
        Ok(parsed.into())
    }
}

fn status_error(endpoint: Endpoint, status: StatusCode, body: &str) -> WeatherError {
    match status {
        StatusCode::NOT_FOUND => WeatherError::NotFound { endpoint },
        StatusCode::UNAUTHORIZED => WeatherError::Unauthorized,
        _ => WeatherError::Service {
            status: status.as_u16(),
            body: truncate_body(body),
        },
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Vec<OwCondition>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<OwCondition>::deserialize(deserializer)?;
    if items.is_empty() {
        return Err(serde::de::Error::invalid_length(0, &"at least one weather condition"));
    }
    Ok(items)
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    sunrise: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    sunset: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    dt: DateTime<Utc>,
    timezone: i32,
    #[serde(deserialize_with = "non_empty")]
    weather: Vec<OwCondition>,
    main: OwMain,
    wind: OwWind,
    clouds: OwClouds,
    visibility: u32,
    sys: OwSys,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    #[serde(with = "chrono::serde::ts_seconds")]
    dt: DateTime<Utc>,
    main: OwMain,
    #[serde(deserialize_with = "non_empty")]
    weather: Vec<OwCondition>,
    clouds: OwClouds,
    wind: OwWind,
    visibility: Option<u32>,
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
    timezone: i32,
    #[serde(with = "chrono::serde::ts_seconds")]
    sunrise: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    sunset: DateTime<Utc>,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl From<OwCondition> for Condition {
    fn from(c: OwCondition) -> Self {
        Self {
            id: c.id,
            category: c.main,
            description: c.description,
            icon: c.icon,
        }
    }
}

impl From<OwMain> for Temperatures {
    fn from(m: OwMain) -> Self {
        Self {
            current: m.temp,
            feels_like: m.feels_like,
            min: m.temp_min,
            max: m.temp_max,
            pressure: m.pressure,
            humidity: m.humidity,
        }
    }
}

impl From<OwWind> for Wind {
    fn from(w: OwWind) -> Self {
        Self {
            speed: w.speed,
            direction_deg: w.deg,
        }
    }
}

impl From<OwCoord> for Coordinates {
    fn from(c: OwCoord) -> Self {
        Coordinates::new(c.lat, c.lon)
    }
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(r: OwCurrentResponse) -> Self {
        Self {
            name: r.name,
            country: r.sys.country,
            observed_at: r.dt,
            utc_offset_secs: r.timezone,
            conditions: r.weather.into_iter().map(Condition::from).collect(),
            temperature: r.main.into(),
            wind: r.wind.into(),
            cloudiness_pct: r.clouds.all,
            visibility_m: r.visibility,
            sunrise: r.sys.sunrise,
            sunset: r.sys.sunset,
            coordinates: r.coord.into(),
        }
    }
}

impl From<OwForecastResponse> for ForecastSeries {
    fn from(r: OwForecastResponse) -> Self {
        let place = ForecastPlace {
            name: r.city.name,
            country: r.city.country,
            utc_offset_secs: r.city.timezone,
            sunrise: r.city.sunrise,
            sunset: r.city.sunset,
            coordinates: r.city.coord.into(),
        };

        let samples = r
            .list
            .into_iter()
            .map(|e| ForecastSample {
                time: e.dt,
                temperature: e.main.into(),
                conditions: e.weather.into_iter().map(Condition::from).collect(),
                cloudiness_pct: e.clouds.all,
                wind: e.wind.into(),
                visibility_m: e.visibility,
                precipitation_chance: e.pop,
            })
            .collect();

        Self { place, samples }
    }
}
