//! Dashboard session
//!
//! One logical actor per session. User input, fetch completions and
//! highlight expiries are all applied on the task that owns the
//! [`Dashboard`]; weather fetches run on spawned tasks and report back over
//! a channel, so input stays responsive while a fetch is outstanding.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::autocomplete::{AutocompleteEngine, Direction};
use crate::coordinator::CityFetchCoordinator;
use crate::models::{CatalogCity, CityId, TemperatureUnit, WeatherSnapshot};
use crate::selection::{FetchTicket, HighlightExpiry, SelectOutcome, SelectionStore, SlotStorage};

/// Navigation keys understood by the search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
}

/// User input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Replace the search term
    Type(String),
    Key(Key),
    /// Pointer pick of the suggestion at this position
    Pick(usize),
    Remove(CityId),
    /// Fetch fresh weather for a tracked city
    Refresh(CityId),
    ToggleUnit,
}

/// Result of applying one internal event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    WeatherAttached(CityId),
    /// The selection went away before its fetch resolved
    WeatherDiscarded(CityId),
    FetchFailed(CityId),
    HighlightCleared(CityId),
    /// Superseded timer or similar no-op
    Ignored,
}

struct FetchDone {
    ticket: FetchTicket,
    result: crate::Result<WeatherSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub country: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityCard {
    pub catalog_ref: CityId,
    /// Catalog name, or the id when the city left the catalog
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub temperature: Option<String>,
    pub highlighted: bool,
    pub loading: bool,
}

/// Render model of the whole dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub term: String,
    pub suggestions: Vec<Suggestion>,
    pub cards: Vec<CityCard>,
    pub unit: TemperatureUnit,
}

pub struct Dashboard {
    autocomplete: AutocompleteEngine,
    selection: SelectionStore,
    coordinator: Arc<CityFetchCoordinator>,
    unit: TemperatureUnit,
    in_flight: HashSet<FetchTicket>,
    fetch_tx: mpsc::UnboundedSender<FetchDone>,
    fetch_rx: mpsc::UnboundedReceiver<FetchDone>,
    expiry_rx: mpsc::UnboundedReceiver<HighlightExpiry>,
}

impl Dashboard {
    /// Restore the saved selection and start fetching weather for any
    /// restored city that has none. Must run inside a Tokio runtime.
    pub fn start(
        coordinator: Arc<CityFetchCoordinator>,
        storage: Box<dyn SlotStorage>,
        highlight_delay: Duration,
    ) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();

        let mut dashboard = Self {
            autocomplete: AutocompleteEngine::new(coordinator.catalog().clone()),
            selection: SelectionStore::restore(storage, highlight_delay, expiry_tx),
            coordinator,
            unit: TemperatureUnit::default(),
            in_flight: HashSet::new(),
            fetch_tx,
            fetch_rx,
            expiry_rx,
        };

        for ticket in dashboard.selection.missing_weather() {
            dashboard.spawn_fetch(ticket);
        }
        dashboard
    }

    pub fn apply(&mut self, input: Input) {
        match input {
            Input::Type(term) => self.autocomplete.set_term(term),
            Input::Key(Key::Up) => self.autocomplete.move_highlight(Direction::Up),
            Input::Key(Key::Down) => self.autocomplete.move_highlight(Direction::Down),
            Input::Key(Key::Enter) => {
                let committed = self.autocomplete.commit();
                self.select(committed);
            }
            Input::Pick(index) => {
                let committed = self.autocomplete.commit_at(index);
                self.select(committed);
            }
            Input::Remove(catalog_ref) => {
                self.selection.remove(&catalog_ref);
            }
            Input::Refresh(catalog_ref) => match self.selection.ticket(&catalog_ref) {
                Some(ticket) => self.spawn_fetch(ticket),
                None => debug!("Refresh for unselected city {}", catalog_ref),
            },
            Input::ToggleUnit => self.unit = self.unit.toggled(),
        }
    }

    fn select(&mut self, committed: Option<CatalogCity>) {
        let Some(city) = committed else {
            return;
        };
        if let SelectOutcome::Added(ticket) = self.selection.select(&city) {
            self.spawn_fetch(ticket);
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        if !self.in_flight.insert(ticket.clone()) {
            debug!("Fetch for {} already in flight", ticket.catalog_ref);
            return;
        }

        let coordinator = self.coordinator.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = coordinator.fetch(&ticket.catalog_ref).await;
            let _ = tx.send(FetchDone { ticket, result });
        });
    }

    /// Wait for the next fetch completion or highlight expiry and apply it
    pub async fn process_next(&mut self) -> DashboardEvent {
        tokio::select! {
            Some(done) = self.fetch_rx.recv() => self.finish_fetch(done),
            Some(expiry) = self.expiry_rx.recv() => {
                if self.selection.clear_highlight(&expiry) {
                    DashboardEvent::HighlightCleared(expiry.catalog_ref)
                } else {
                    DashboardEvent::Ignored
                }
            }
        }
    }

    fn finish_fetch(&mut self, done: FetchDone) -> DashboardEvent {
        self.in_flight.remove(&done.ticket);
        let catalog_ref = done.ticket.catalog_ref.clone();

        match done.result {
            Ok(snapshot) => {
                if self.selection.attach_weather(&done.ticket, snapshot) {
                    DashboardEvent::WeatherAttached(catalog_ref)
                } else {
                    DashboardEvent::WeatherDiscarded(catalog_ref)
                }
            }
            Err(e) => {
                warn!("{} ({})", e.user_message(), e);
                DashboardEvent::FetchFailed(catalog_ref)
            }
        }
    }

    /// Drive the session until the input channel closes, rendering after
    /// every change.
    pub async fn run<F>(mut self, mut inputs: mpsc::Receiver<Input>, mut render: F)
    where
        F: FnMut(&DashboardView),
    {
        render(&self.view());
        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => self.apply(input),
                    None => break,
                },
                event = self.process_next() => {
                    if event == DashboardEvent::Ignored {
                        continue;
                    }
                }
            }
            render(&self.view());
        }
    }

    #[must_use]
    pub fn view(&self) -> DashboardView {
        let highlighted = self.autocomplete.highlighted();
        let suggestions = self
            .autocomplete
            .matches()
            .enumerate()
            .map(|(index, city)| Suggestion {
                name: city.name.clone(),
                country: city.country.clone(),
                highlighted: highlighted == Some(index),
            })
            .collect();

        let catalog = self.coordinator.catalog();
        let cards = self
            .selection
            .list()
            .iter()
            .map(|entry| CityCard {
                catalog_ref: entry.catalog_ref.clone(),
                name: catalog
                    .get(&entry.catalog_ref)
                    .map_or_else(|| entry.catalog_ref.to_string(), |city| city.name.clone()),
                display_name: entry.weather.as_ref().map(|w| w.display_name.clone()),
                description: entry.weather.as_ref().map(|w| w.description.clone()),
                temperature: entry.weather.as_ref().map(|w| w.format_temperature(self.unit)),
                highlighted: entry.highlighted,
                loading: entry.weather.is_none()
                    && self
                        .in_flight
                        .iter()
                        .any(|ticket| ticket.catalog_ref == entry.catalog_ref),
            })
            .collect();

        DashboardView {
            term: self.autocomplete.term().to_string(),
            suggestions,
            cards,
            unit: self.unit,
        }
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    /// Number of fetches that have not reported back yet
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
