//! Search, unit and geolocation controller.
//!
//! The [`Controller`] owns the session state and publishes it through a
//! `tokio::sync::watch` channel; presentation code reads snapshots via
//! [`Controller::snapshot`] or [`Controller::subscribe`] and never mutates them.
//!
//! Triggers may overlap. Each network request takes a ticket from a
//! monotonically increasing counter, and a response is committed only if its
//! ticket is still the latest issued; superseded responses are dropped.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;

use crate::{
    client::WeatherClient,
    error::{GeolocationError, WeatherError},
    forecast::{DailyForecast, daily_forecast},
    geolocation::{GeolocationOptions, Geolocator},
    history::RecentSearches,
    map::MapTarget,
    model::{CurrentConditions, ForecastSeries, PlaceQuery, UnitSystem},
    store::{self, PreferenceStore},
    theme::Theme,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// `"Name, CountryCode"` of the place shown on the map.
    pub place: Option<String>,
    /// Query reused by unit changes.
    pub active_query: Option<PlaceQuery>,
    pub current: Option<Arc<CurrentConditions>>,
    pub forecast: Option<Arc<ForecastSeries>>,
    pub units: UnitSystem,
    pub phase: Phase,
    pub error: Option<String>,
    pub history: RecentSearches,
    pub theme: Theme,
}

impl AppState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn daily_forecast(&self) -> Vec<DailyForecast> {
        self.forecast.as_deref().map(daily_forecast).unwrap_or_default()
    }

    /// Input for the map collaborator; `None` until something was loaded.
    pub fn map_target(&self) -> Option<MapTarget> {
        self.current.as_deref().map(|current| MapTarget {
            city: self.place.clone().unwrap_or_else(|| current.display_name()),
            coordinates: Some(current.coordinates),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Search,
    UnitChange,
    Geolocate,
}

impl Trigger {
    fn as_str(&self) -> &'static str {
        match self {
            Trigger::Search => "search",
            Trigger::UnitChange => "unit_change",
            Trigger::Geolocate => "geolocate",
        }
    }

    fn updates_place(&self) -> bool {
        !matches!(self, Trigger::UnitChange)
    }
}

pub struct Controller {
    client: Arc<dyn WeatherClient>,
    geolocator: Option<Arc<dyn Geolocator>>,
    geolocation_options: GeolocationOptions,
    store: Arc<dyn PreferenceStore>,
    state: watch::Sender<AppState>,
    latest_ticket: AtomicU64,
}

impl Controller {
    /// Creates a controller, restoring history and theme from `store`.
    ///
    /// `system_prefers_dark` is consulted only when no theme was stored.
    pub fn new(
        client: Arc<dyn WeatherClient>,
        store: Arc<dyn PreferenceStore>,
        units: UnitSystem,
        system_prefers_dark: bool,
    ) -> Self {
        let history = store::load_history(store.as_ref()).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring unreadable search history");
            RecentSearches::new()
        });

        let stored_theme = store::load_theme(store.as_ref()).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring unreadable theme preference");
            None
        });
        let theme = Theme::initial(stored_theme, system_prefers_dark);
        if stored_theme.is_none() {
            persist(store::save_theme(store.as_ref(), theme), "theme");
        }

        let (state, _) = watch::channel(AppState {
            units,
            history,
            theme,
            ..AppState::default()
        });

        Self {
            client,
            geolocator: None,
            geolocation_options: GeolocationOptions::default(),
            store,
            state,
            latest_ticket: AtomicU64::new(0),
        }
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = Some(geolocator);
        self
    }

    pub fn with_geolocation_options(mut self, options: GeolocationOptions) -> Self {
        self.geolocation_options = options;
        self
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Looks up `text` by name. Blank input is ignored.
    pub async fn search(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("ignoring blank search");
            return;
        }

        let units = self.state.borrow().units;
        self.run(PlaceQuery::name(text), units, Trigger::Search).await;
    }

    /// Switches units and, if a place is displayed, reloads it by coordinates.
    pub async fn change_unit(&self, units: UnitSystem) {
        let mut coordinates = None;
        self.state.send_modify(|s| {
            s.units = units;
            coordinates = s.current.as_ref().map(|c| c.coordinates);
        });

        if let Some(coordinates) = coordinates {
            self.run(PlaceQuery::Coordinates(coordinates), units, Trigger::UnitChange)
                .await;
        }
    }

    /// Looks up the device position. Fails without entering Loading when the
    /// position cannot be obtained.
    pub async fn geolocate(&self) {
        let Some(geolocator) = self.geolocator.clone() else {
            self.fail_geolocation(GeolocationError::Unsupported);
            return;
        };

        match geolocator.current_position(&self.geolocation_options).await {
            Ok(position) => {
                let units = self.state.borrow().units;
                self.run(PlaceQuery::Coordinates(position.coordinates), units, Trigger::Geolocate)
                    .await;
            }
            Err(err) => self.fail_geolocation(err),
        }
    }

    pub async fn select_from_history(&self, name: &str) {
        self.search(name).await;
    }

    pub fn clear_history(&self) {
        let mut cleared = RecentSearches::new();
        self.state.send_modify(|s| {
            s.history.clear();
            cleared = s.history.clone();
        });
        persist(store::save_history(self.store.as_ref(), &cleared), "search history");
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut theme = Theme::default();
        self.state.send_modify(|s| {
            s.theme = s.theme.toggled();
            theme = s.theme;
        });
        persist(store::save_theme(self.store.as_ref(), theme), "theme");
        theme
    }

    fn fail_geolocation(&self, err: GeolocationError) {
        tracing::warn!(error = %err, "geolocation failed");
        let message = err.user_message();
        self.state.send_modify(|s| s.error = Some(message));
    }

    async fn run(&self, query: PlaceQuery, units: UnitSystem, trigger: Trigger) {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(
            trigger = trigger.as_str(),
            ticket,
            query_kind = query.kind(),
            %query,
            %units,
            "loading weather"
        );

        self.state.send_modify(|s| {
            s.phase = Phase::Loading;
            s.error = None;
        });

        let result = self.fetch(&query, units).await;

        let latest = self.latest_ticket.load(Ordering::SeqCst);
        if ticket != latest {
            tracing::debug!(trigger = trigger.as_str(), ticket, latest, "discarding superseded response");
            return;
        }

        match result {
            Ok((current, forecast)) => self.commit(current, forecast, trigger),
            Err(err) => {
                tracing::warn!(trigger = trigger.as_str(), error = %err, "weather lookup failed");
                let message = err.user_message();
                self.state.send_modify(|s| {
                    s.error = Some(message);
                    s.phase = Phase::Idle;
                });
            }
        }
    }

    async fn fetch(
        &self,
        query: &PlaceQuery,
        units: UnitSystem,
    ) -> Result<(CurrentConditions, ForecastSeries), WeatherError> {
        // current conditions decide the error wording, so they go first
        let current = self.client.fetch_current(query, units).await?;
        let forecast = self.client.fetch_forecast(query, units).await?;
        Ok((current, forecast))
    }

    fn commit(&self, current: CurrentConditions, forecast: ForecastSeries, trigger: Trigger) {
        let name = current.display_name();
        let mut changed_history = None;

        self.state.send_modify(|s| {
            s.active_query = Some(PlaceQuery::Coordinates(current.coordinates));
            if trigger.updates_place() {
                if s.history.record(&name) {
                    changed_history = Some(s.history.clone());
                }
                s.place = Some(name);
            }
            s.current = Some(Arc::new(current));
            s.forecast = Some(Arc::new(forecast));
            s.phase = Phase::Idle;
        });

        if let Some(history) = changed_history {
            persist(store::save_history(self.store.as_ref(), &history), "search history");
        }
    }
}

fn persist(result: anyhow::Result<()>, what: &str) {
    if let Err(err) = result {
        tracing::warn!(error = %err, "failed to persist {what}");
    }
}
