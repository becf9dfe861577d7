//! Domain error types surfaced by the weather client and geolocation sources.

use std::fmt;
use thiserror::Error;

/// Which weather endpoint a request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Path segment below the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("{endpoint} request found no matching place")]
    NotFound { endpoint: Endpoint },

    #[error("weather service rejected the API key")]
    Unauthorized,

    #[error("weather service returned status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl WeatherError {
    /// Banner text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { endpoint: Endpoint::Current } => {
                "City not found. Please check the spelling and try again.".to_string()
            }
            Self::NotFound { endpoint: Endpoint::Forecast } => {
                "Forecast data not available for this location.".to_string()
            }
            Self::Unauthorized => "API key error. Please check your API configuration.".to_string(),
            Self::Service { status, .. } => format!("Weather service error: {status}"),
            Self::Network(_) => "Network error. Please check your connection and try again.".to_string(),
            Self::Decode { .. } => "Unexpected response from the weather service.".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    Unsupported,

    #[error("location access denied: {0}")]
    Denied(String),

    #[error("location request timed out")]
    Timeout,

    #[error("location service unavailable: {0}")]
    Unavailable(String),
}

impl GeolocationError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Unsupported => "Geolocation is not supported on this system".to_string(),
            _ => "Unable to retrieve your location. Please allow location access or search manually."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_wording_depends_on_endpoint() {
        let current = WeatherError::NotFound { endpoint: Endpoint::Current };
        let forecast = WeatherError::NotFound { endpoint: Endpoint::Forecast };

        assert!(current.user_message().starts_with("City not found"));
        assert!(forecast.user_message().starts_with("Forecast data not available"));
    }

    #[test]
    fn service_error_carries_status() {
        let err = WeatherError::Service { status: 503, body: String::new() };
        assert_eq!(err.user_message(), "Weather service error: 503");
    }

    #[test]
    fn unauthorized_mentions_api_key() {
        assert!(WeatherError::Unauthorized.user_message().contains("API key"));
    }

    #[test]
    fn geolocation_messages() {
        assert!(GeolocationError::Unsupported.user_message().contains("not supported"));
        assert!(GeolocationError::Timeout.user_message().contains("Unable to retrieve"));
        assert!(GeolocationError::Denied("nope".into())
            .user_message()
            .contains("search manually"));
    }
}
