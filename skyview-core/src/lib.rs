//! Core library for the `skyview` weather lookup tool.
//!
//! This crate defines:
//! - Configuration & preference storage
//! - The OpenWeather client and its error mapping
//! - Forecast aggregation and display formatting
//! - The session controller driving searches, unit changes and geolocation
//! - Map view selection
//!
//! It is used by `skyview-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod forecast;
pub mod format;
pub mod geolocation;
pub mod history;
pub mod map;
pub mod model;
pub mod store;
pub mod theme;

pub use client::{WeatherClient, client_from_config};
pub use config::Config;
pub use controller::{AppState, Controller, Phase};
pub use error::{GeolocationError, WeatherError};
pub use forecast::{DailyForecast, daily_forecast};
pub use model::{Coordinates, CurrentConditions, ForecastSeries, PlaceQuery, UnitSystem};
pub use theme::Theme;
