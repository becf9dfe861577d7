use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Measurement convention used both for the request and for display suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "C",
            UnitSystem::Imperial => "F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(UnitSystem::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Location specifier sent to the weather service. Exactly one form per request.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceQuery {
    Name(String),
    Coordinates(Coordinates),
}

impl PlaceQuery {
    pub fn name(text: impl Into<String>) -> Self {
        PlaceQuery::Name(text.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlaceQuery::Name(_) => "name",
            PlaceQuery::Coordinates(_) => "coordinates",
        }
    }

    /// Query-string pairs identifying the location.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            PlaceQuery::Name(name) => vec![("q", name.clone())],
            PlaceQuery::Coordinates(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
        }
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceQuery::Name(name) => f.write_str(name),
            PlaceQuery::Coordinates(c) => c.fmt(f),
        }
    }
}

/// One weather-condition tag as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: u32,
    pub category: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    pub current: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
    /// hPa
    pub pressure: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub direction_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    pub observed_at: DateTime<Utc>,
    /// Seconds east of UTC.
    pub utc_offset_secs: i32,
    pub conditions: Vec<Condition>,
    pub temperature: Temperatures,
    pub wind: Wind,
    pub cloudiness_pct: u8,
    pub visibility_m: u32,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub coordinates: Coordinates,
}

impl CurrentConditions {
    /// `"Name, CountryCode"`, the form stored in the recent-search list.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// One 3-hour forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature: Temperatures,
    pub conditions: Vec<Condition>,
    pub cloudiness_pct: u8,
    pub wind: Wind,
    pub visibility_m: Option<u32>,
    /// Probability of precipitation, 0.0..=1.0
    pub precipitation_chance: f64,
}

impl ForecastSample {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPlace {
    pub name: String,
    pub country: String,
    pub utc_offset_secs: i32,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub place: ForecastPlace,
    /// Chronologically ordered.
    pub samples: Vec<ForecastSample>,
}
