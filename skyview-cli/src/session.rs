//! Interactive session: every line is either a search or a `:command`.

use anyhow::{Result, anyhow};
use inquire::{InquireError, Text};
use skyview_core::{Controller, UnitSystem, map::MapSettings};
use tokio::{sync::watch, task::JoinHandle};

use crate::render;

const HELP: &str = "\
Type a city name to search, or one of:
  :units [metric|imperial]  switch units (toggles without an argument)
  :here                     weather at your location
  :history                  list recent searches
  :pick N                   search the N-th recent entry
  :clear                    forget recent searches
  :theme                    toggle light/dark
  :map                      show the map for the current place
  :help                     this text
  :quit                     leave";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Search(String),
    Units(Option<UnitSystem>),
    Here,
    History,
    Pick(usize),
    Clear,
    Theme,
    Map,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(SessionCommand::Search(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        let parsed = match name {
            "units" | "u" => SessionCommand::Units(arg.map(str::parse).transpose()?),
            "here" => SessionCommand::Here,
            "history" | "h" => SessionCommand::History,
            "pick" | "p" => {
                let index = arg
                    .ok_or_else(|| anyhow!("Usage: :pick N"))?
                    .parse::<usize>()
                    .map_err(|_| anyhow!("Usage: :pick N"))?;
                if index == 0 {
                    return Err(anyhow!("Entries are numbered from 1"));
                }
                SessionCommand::Pick(index)
            }
            "clear" => SessionCommand::Clear,
            "theme" => SessionCommand::Theme,
            "map" | "m" => SessionCommand::Map,
            "help" | "?" => SessionCommand::Help,
            "quit" | "q" | "exit" => SessionCommand::Quit,
            other => return Err(anyhow!("Unknown command ':{other}'. Type :help for a list.")),
        };

        Ok(parsed)
    }
}

pub async fn run(controller: &Controller, map: &MapSettings) -> Result<()> {
    let indicator = spawn_loading_indicator(controller.subscribe());

    println!("{}", render::render_state(&controller.snapshot()));
    println!("Theme: {}. Type :help for commands.", controller.snapshot().theme);

    loop {
        let line = match Text::new(">").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => {
                indicator.abort();
                return Err(err.into());
            }
        };

        let command = match SessionCommand::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            SessionCommand::Search(text) => {
                controller.search(&text).await;
                println!("{}", render::render_state(&controller.snapshot()));
            }
            SessionCommand::Units(units) => {
                let current = controller.snapshot().units;
                let next = units.unwrap_or(match current {
                    UnitSystem::Metric => UnitSystem::Imperial,
                    UnitSystem::Imperial => UnitSystem::Metric,
                });
                controller.change_unit(next).await;
                println!("{}", render::render_state(&controller.snapshot()));
            }
            SessionCommand::Here => {
                controller.geolocate().await;
                println!("{}", render::render_state(&controller.snapshot()));
            }
            SessionCommand::History => {
                println!("{}", render::render_history(&controller.snapshot().history));
            }
            SessionCommand::Pick(index) => {
                let entry = controller.snapshot().history.get(index - 1).map(str::to_string);
                match entry {
                    Some(entry) => {
                        controller.select_from_history(&entry).await;
                        println!("{}", render::render_state(&controller.snapshot()));
                    }
                    None => println!("No recent search #{index}"),
                }
            }
            SessionCommand::Clear => {
                controller.clear_history();
                println!("Recent searches cleared.");
            }
            SessionCommand::Theme => println!("Theme: {}", controller.toggle_theme()),
            SessionCommand::Map => {
                let state = controller.snapshot();
                println!("{}", render::render_map(map, state.map_target().as_ref()));
            }
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Quit => break,
        }
    }

    indicator.abort();
    Ok(())
}

/// Prints a notice on stderr each time a lookup starts.
fn spawn_loading_indicator(mut rx: watch::Receiver<skyview_core::AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut was_loading = false;
        while rx.changed().await.is_ok() {
            let loading = rx.borrow_and_update().is_loading();
            if loading && !was_loading {
                eprintln!("Loading weather data...");
            }
            was_loading = loading;
        }
    })
}
