//! Device position sources.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Mutex, time::Duration};

use crate::{error::GeolocationError, model::Coordinates};

pub const IP_API_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Acquisition settings passed to every [`Geolocator`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    /// Request the most precise fix the source offers. Sources with a fixed
    /// precision, such as IP lookup, treat this as a hint.
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position still acceptable.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    pub acquired_at: DateTime<Utc>,
}

impl Position {
    fn is_fresh(&self, maximum_age: Duration) -> bool {
        (Utc::now() - self.acquired_at)
            .to_std()
            .map(|age| age <= maximum_age)
            .unwrap_or(false)
    }
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Position, GeolocationError>;
}

/// Always reports the same coordinates, e.g. a configured home location.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator {
    coordinates: Coordinates,
}

impl FixedLocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl Geolocator for FixedLocator {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Position, GeolocationError> {
        Ok(Position {
            coordinates: self.coordinates,
            acquired_at: Utc::now(),
        })
    }
}

/// City-level position from the public IP address.
#[derive(Debug)]
pub struct IpLocator {
    http: Client,
    url: String,
    cached: Mutex<Option<Position>>,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_url(IP_API_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self {
            http: Client::new(),
            url: url.to_string(),
            cached: Mutex::new(None),
        }
    }

    async fn lookup(&self) -> Result<Position, GeolocationError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(GeolocationError::Unavailable(format!("lookup failed with status {status}")));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;

        if body.status != "success" {
            return Err(GeolocationError::Denied(
                body.message.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Position {
                coordinates: Coordinates::new(lat, lon),
                    acquired_at: Utc::now(),
            }),
            _ => Err(GeolocationError::Unavailable("lookup returned no coordinates".to_string())),
        }
    }

    fn cached_within(&self, maximum_age: Duration) -> Option<Position> {
        let cached = self.cached.lock().ok()?;
        (*cached).filter(|p| p.is_fresh(maximum_age))
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geolocator for IpLocator {
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Position, GeolocationError> {
        if let Some(position) = self.cached_within(options.maximum_age) {
            tracing::debug!("reusing cached position");
            return Ok(position);
        }

        if options.high_accuracy {
            tracing::debug!("IP lookup is city-level, ignoring high accuracy");
        }

        let position = tokio::time::timeout(options.timeout, self.lookup())
            .await
            .map_err(|_| GeolocationError::Timeout)??;

        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(position);
        }

        Ok(position)
    }
}
