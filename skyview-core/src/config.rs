use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    map::{DEFAULT_ZOOM, MapLayer, MapProvider, MapSettings},
    model::{Coordinates, UnitSystem},
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Map-related settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    /// Provider short name, e.g. "openstreetmap" or "bing".
    pub provider: Option<String>,
    /// "standard", "satellite" or "terrain".
    pub layer: Option<String>,
    pub zoom: Option<u8>,
    pub google_maps_key: Option<String>,
    pub mapbox_token: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
///
/// [map]
/// provider = "openstreetmap"
///
/// [home]
/// lat = 59.91
/// lon = 10.75
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override of the weather API base URL.
    pub api_base_url: Option<String>,

    pub units: UnitSystem,

    pub map: MapConfig,

    /// Fixed coordinates reported as the device position.
    pub home: Option<Coordinates>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyview", "skyview")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key, with [`API_KEY_ENV`] taking precedence over the stored value.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env: Option<String>) -> Option<String> {
        env.filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn map_provider_id(&self) -> Result<MapProvider> {
        match self.map.provider.as_deref() {
            Some(s) => MapProvider::try_from(s),
            None => Ok(MapProvider::OpenStreetMap),
        }
    }

    pub fn map_layer(&self) -> Result<MapLayer> {
        match self.map.layer.as_deref() {
            Some(s) => MapLayer::try_from(s),
            None => Ok(MapLayer::default()),
        }
    }

    pub fn map_settings(&self) -> Result<MapSettings> {
        Ok(MapSettings {
            provider: self.map_provider_id()?,
            layer: self.map_layer()?,
            zoom: self.map.zoom.unwrap_or(DEFAULT_ZOOM),
            google_maps_key: self.map.google_maps_key.clone(),
            mapbox_token: self.map.mapbox_token.clone(),
        })
    }
}
