use anyhow::Context;
use clap::{Parser, Subcommand};
use skyview_core::{
    Config, Coordinates, UnitSystem,
    map::{MapProvider, MapTarget},
    store::FileStore,
    theme,
};

use crate::{app, configure, render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Current weather, forecast and map for any city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, default units, map provider and home location.
    Configure,

    /// Show current weather and the 5-day forecast for a place.
    Show {
        /// City name, e.g. "Paris" or "Paris, FR".
        place: String,

        /// "metric" or "imperial"; defaults to the configured units.
        #[arg(long)]
        units: Option<UnitSystem>,

        /// Also print the map view and an external map link.
        #[arg(long)]
        map: bool,
    },

    /// Show weather for the current location.
    Here {
        /// Latitude; given together with --lon it overrides detection.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[arg(long)]
        units: Option<UnitSystem>,

        #[arg(long)]
        map: bool,
    },

    /// List or manage recent searches.
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Show the current theme.
    Theme {
        /// Switch between light and dark.
        #[arg(long)]
        toggle: bool,
    },

    /// Print the map view for a place without fetching weather.
    Map {
        place: String,

        /// Provider short name, e.g. "bing"; defaults to the configured one.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Interactive session: search, switch units, locate, browse history.
    Session {
        #[arg(long)]
        units: Option<UnitSystem>,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// Forget every recent search.
    Clear,

    /// Look up the N-th recent search (1 is the most recent).
    Pick { index: usize },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure::run()?,

            Command::Show { place, units, map } => {
                let config = Config::load()?;
                let controller = app::build_controller(&config, units)?;

                controller.search(&place).await;

                let state = controller.snapshot();
                println!("{}", render::render_state(&state));
                if map {
                    println!("{}", render::render_map(&config.map_settings()?, state.map_target().as_ref()));
                }
                app::exit_status(&state)?;
            }

            Command::Here { lat, lon, units, map } => {
                let mut config = Config::load()?;
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    config.home = Some(Coordinates::new(lat, lon));
                }
                let controller = app::build_controller(&config, units)?;

                controller.geolocate().await;

                let state = controller.snapshot();
                println!("{}", render::render_state(&state));
                if map {
                    println!("{}", render::render_map(&config.map_settings()?, state.map_target().as_ref()));
                }
                app::exit_status(&state)?;
            }

            Command::History { action } => match action {
                None => {
                    let store = FileStore::open_default()?;
                    println!("{}", render::render_history(&app::recent_searches(&store)?));
                }
                Some(HistoryAction::Clear) => {
                    let store = FileStore::open_default()?;
                    app::clear_history(&store)?;
                    println!("Recent searches cleared.");
                }
                Some(HistoryAction::Pick { index }) => {
                    let config = Config::load()?;
                    let controller = app::build_controller(&config, None)?;

                    let entry = controller
                        .snapshot()
                        .history
                        .get(index.saturating_sub(1))
                        .map(str::to_string)
                        .with_context(|| format!("No recent search #{index}"))?;

                    controller.select_from_history(&entry).await;

                    let state = controller.snapshot();
                    println!("{}", render::render_state(&state));
                    app::exit_status(&state)?;
                }
            },

            Command::Theme { toggle } => {
                let store = FileStore::open_default()?;
                let theme = app::resolve_theme(&store, toggle, theme::system_prefers_dark())?;
                println!("Theme: {theme}");
            }

            Command::Map { place, provider } => {
                let config = Config::load()?;
                let mut settings = config.map_settings()?;
                if let Some(provider) = provider.as_deref() {
                    settings.provider = MapProvider::try_from(provider)?;
                }

                let target = MapTarget {
                    city: place,
                    coordinates: None,
                };
                println!("{}", render::render_map(&settings, Some(&target)));
            }

            Command::Session { units } => {
                let config = Config::load()?;
                let controller = app::build_controller(&config, units)?;
                session::run(&controller, &config.map_settings()?).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_show_with_units() {
        let cli = Cli::try_parse_from(["skyview", "show", "Paris", "--units", "imperial", "--map"]).unwrap();

        match cli.command {
            Command::Show { place, units, map } => {
                assert_eq!(place, "Paris");
                assert_eq!(units, Some(UnitSystem::Imperial));
                assert!(map);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn here_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["skyview", "here", "--lat", "-12.05", "--lon", "-77.04"]).unwrap();

        match cli.command {
            Command::Here { lat, lon, .. } => {
                assert_eq!(lat, Some(-12.05));
                assert_eq!(lon, Some(-77.04));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn here_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["skyview", "here", "--lat", "10"]).is_err());
    }

    #[test]
    fn parses_history_pick() {
        let cli = Cli::try_parse_from(["skyview", "history", "pick", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::History {
                action: Some(HistoryAction::Pick { index: 2 })
            }
        ));
    }
}
