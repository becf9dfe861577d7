//! Composition root: wires config, persisted preferences, the weather client
//! and a geolocation source into one [`Controller`].

use std::sync::Arc;

use anyhow::{Result, bail};
use skyview_core::{
    AppState, Config, Controller, Theme, UnitSystem, client_from_config,
    geolocation::{FixedLocator, Geolocator, IpLocator},
    history::RecentSearches,
    store::{self, FileStore, PreferenceStore},
    theme,
};

pub fn build_controller(config: &Config, units: Option<UnitSystem>) -> Result<Controller> {
    let client = client_from_config(config)?;
    let store = FileStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "using preference store");

    let controller = Controller::new(
        Arc::new(client),
        Arc::new(store),
        units.unwrap_or(config.units),
        theme::system_prefers_dark(),
    );

    Ok(controller.with_geolocator(geolocator_for(config)))
}

/// Configured home coordinates win over IP lookup.
fn geolocator_for(config: &Config) -> Arc<dyn Geolocator> {
    match config.home {
        Some(home) => Arc::new(FixedLocator::new(home)),
        None => Arc::new(IpLocator::new()),
    }
}

// History and theme live in the preference store alone; these helpers need
// neither an API key nor the network.

pub fn recent_searches(store: &dyn PreferenceStore) -> Result<RecentSearches> {
    store::load_history(store)
}

pub fn clear_history(store: &dyn PreferenceStore) -> Result<()> {
    store::save_history(store, &RecentSearches::new())
}

/// Current theme, toggled first if asked. The result is persisted.
pub fn resolve_theme(store: &dyn PreferenceStore, toggle: bool, system_prefers_dark: bool) -> Result<Theme> {
    let stored = store::load_theme(store)?;
    let mut theme = Theme::initial(stored, system_prefers_dark);
    if toggle {
        theme = theme.toggled();
    }
    if toggle || stored.is_none() {
        store::save_theme(store, theme)?;
    }
    Ok(theme)
}

/// Fails the process when the last lookup left an error banner.
pub fn exit_status(state: &AppState) -> Result<()> {
    match &state.error {
        Some(message) => bail!("{message}"),
        None => Ok(()),
    }
}
