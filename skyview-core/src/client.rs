use crate::{
    Config, CurrentConditions, ForecastSeries, PlaceQuery, UnitSystem,
    client::openweather::OpenWeatherClient, config::API_KEY_ENV, error::WeatherError,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Read-only access to a weather service. One network call per method, no retries.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        query: &PlaceQuery,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_forecast(
        &self,
        query: &PlaceQuery,
        units: UnitSystem,
    ) -> Result<ForecastSeries, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    build_client(config, config.api_key())
}

fn build_client(config: &Config, api_key: Option<String>) -> anyhow::Result<OpenWeatherClient> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `skyview configure` or set {API_KEY_ENV}."
        )
    })?;

    let client = match config.api_base_url.as_deref() {
        Some(base_url) => OpenWeatherClient::with_base_url(api_key, base_url),
        None => OpenWeatherClient::new(api_key),
    };

    Ok(client)
}
