//! `skyview configure`: interactive prompts that fill the config file.

use anyhow::{Context, Result};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select, Text};
use skyview_core::{
    Config, Coordinates, UnitSystem,
    map::{Credential, MapLayer, MapProvider},
};

pub fn run() -> Result<()> {
    let mut config = Config::load()?;

    prompt_api_key(&mut config)?;

    config.units = Select::new("Default units:", UnitSystem::all().to_vec())
        .with_starting_cursor(starting_cursor(UnitSystem::all(), &config.units))
        .prompt()
        .context("Failed to read units")?;

    prompt_map(&mut config)?;
    prompt_home(&mut config)?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

fn prompt_api_key(config: &mut Config) -> Result<()> {
    let help = if config.api_key.is_some() {
        "Leave empty to keep the stored key"
    } else {
        "Get one at https://openweathermap.org/api"
    };

    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(help)
        .prompt()
        .context("Failed to read API key")?;

    if !key.trim().is_empty() {
        config.set_api_key(key.trim().to_string());
    }

    Ok(())
}

fn prompt_map(config: &mut Config) -> Result<()> {
    let current = config.map_provider_id().unwrap_or(MapProvider::OpenStreetMap);
    let provider = Select::new("Map provider:", MapProvider::all().to_vec())
        .with_starting_cursor(starting_cursor(MapProvider::all(), &current))
        .prompt()
        .context("Failed to read map provider")?;
    config.map.provider = Some(provider.as_str().to_string());

    let layer = Select::new("Map layer:", MapLayer::all().to_vec())
        .with_starting_cursor(starting_cursor(MapLayer::all(), &config.map_layer().unwrap_or_default()))
        .prompt()
        .context("Failed to read map layer")?;
    config.map.layer = Some(layer.as_str().to_string());

    match provider.descriptor().credential {
        Credential::None => {}
        Credential::GoogleMapsKey => {
            config.map.google_maps_key = prompt_optional("Google Maps API key:", config.map.google_maps_key.take())?;
        }
        Credential::MapboxToken => {
            config.map.mapbox_token = prompt_optional("Mapbox access token:", config.map.mapbox_token.take())?;
        }
    }

    Ok(())
}

/// Empty input keeps `existing`.
fn prompt_optional(message: &str, existing: Option<String>) -> Result<Option<String>> {
    let value = Text::new(message)
        .with_default(existing.as_deref().unwrap_or_default())
        .with_help_message("Without it the map falls back to OpenStreetMap")
        .prompt()
        .with_context(|| format!("Failed to read {message}"))?;

    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()).or(existing))
}

fn prompt_home(config: &mut Config) -> Result<()> {
    let set_home = Confirm::new("Use fixed home coordinates for `skyview here`?")
        .with_default(config.home.is_some())
        .with_help_message("Otherwise your location is estimated from your IP address")
        .prompt()
        .context("Failed to read home choice")?;

    if !set_home {
        config.home = None;
        return Ok(());
    }

    let lat = CustomType::<f64>::new("Latitude:")
        .with_error_message("Enter a number between -90 and 90")
        .prompt()
        .context("Failed to read latitude")?;
    let lon = CustomType::<f64>::new("Longitude:")
        .with_error_message("Enter a number between -180 and 180")
        .prompt()
        .context("Failed to read longitude")?;

    config.home = Some(Coordinates::new(lat.clamp(-90.0, 90.0), lon.clamp(-180.0, 180.0)));
    Ok(())
}

fn starting_cursor<T: PartialEq>(options: &[T], selected: &T) -> usize {
    options.iter().position(|o| o == selected).unwrap_or(0)
}
