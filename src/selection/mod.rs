//! Tracked city selection
//!
//! Ordered, deduplicated list of the cities the user follows. Every change to
//! the visible collection is written through to a [`SlotStorage`] slot, and
//! the store restores itself from that slot once on construction.

pub mod highlight;
pub mod storage;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::CityWeatherError;
use crate::models::{CatalogCity, CityId, WeatherSnapshot};
use highlight::HighlightTimers;

pub use highlight::HighlightExpiry;
pub use storage::{FjallSlotStorage, MemorySlotStorage, SlotStorage};

/// Name of the durable slot holding the selection
pub const SELECTION_SLOT: &str = "selectedCities";

/// Default duration of the duplicate-selection highlight
pub const DEFAULT_HIGHLIGHT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCity {
    pub catalog_ref: CityId,
    pub weather: Option<WeatherSnapshot>,
    /// Set briefly after a duplicate selection. Never persisted.
    pub highlighted: bool,
    epoch: u64,
}

/// Persisted form of [`SelectedCity`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCity {
    pub catalog_ref: CityId,
    pub weather: Option<WeatherSnapshot>,
}

impl From<&SelectedCity> for PersistedCity {
    fn from(city: &SelectedCity) -> Self {
        Self {
            catalog_ref: city.catalog_ref.clone(),
            weather: city.weather.clone(),
        }
    }
}

/// Identifies the selection a weather fetch was started for.
///
/// A ticket outlives its selection when the city is removed (and possibly
/// re-added) while the fetch is in flight; such tickets no longer attach.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub catalog_ref: CityId,
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// New entry appended; weather should be fetched for the ticket
    Added(FetchTicket),
    /// Already tracked; the existing entry is highlighted
    Duplicate,
}

pub fn encode_selection(cities: &[SelectedCity]) -> serde_json::Result<Vec<u8>> {
    let persisted: Vec<PersistedCity> = cities.iter().map(PersistedCity::from).collect();
    serde_json::to_vec(&persisted)
}

pub fn decode_selection(bytes: &[u8]) -> crate::Result<Vec<PersistedCity>> {
    serde_json::from_slice(bytes).map_err(|e| CityWeatherError::persistence_read(e.to_string()))
}

pub struct SelectionStore {
    entries: Vec<SelectedCity>,
    storage: Box<dyn SlotStorage>,
    timers: HighlightTimers,
    next_epoch: u64,
}

impl SelectionStore {
    /// Build the store from whatever the storage slot holds. Missing or
    /// unreadable data yields an empty selection.
    pub fn restore(
        storage: Box<dyn SlotStorage>,
        highlight_delay: Duration,
        expiry_tx: mpsc::UnboundedSender<HighlightExpiry>,
    ) -> Self {
        let mut store = Self {
            entries: Vec::new(),
            storage,
            timers: HighlightTimers::new(highlight_delay, expiry_tx),
            next_epoch: 0,
        };

        let persisted = match store.storage.read(SELECTION_SLOT) {
            Ok(Some(bytes)) => decode_selection(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring saved selection: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(
                    "Ignoring saved selection: {}",
                    CityWeatherError::persistence_read(e.to_string())
                );
                Vec::new()
            }
        };

        for city in persisted {
            if store.position(&city.catalog_ref).is_some() {
                debug!("Dropping duplicate saved entry {}", city.catalog_ref);
                continue;
            }
            let epoch = store.bump_epoch();
            store.entries.push(SelectedCity {
                catalog_ref: city.catalog_ref,
                weather: city.weather,
                highlighted: false,
                epoch,
            });
        }

        info!("Restored {} selected cities", store.entries.len());
        store
    }

    pub fn select(&mut self, city: &CatalogCity) -> SelectOutcome {
        if let Some(index) = self.position(&city.id) {
            debug!("{} already selected, highlighting", city.name);
            // Without a reset timer the flag would never clear
            self.entries[index].highlighted = self.timers.schedule(&city.id);
            return SelectOutcome::Duplicate;
        }

        let epoch = self.bump_epoch();
        self.entries.push(SelectedCity {
            catalog_ref: city.id.clone(),
            weather: None,
            highlighted: false,
            epoch,
        });
        info!("Selected {} ({})", city.name, city.id);
        self.persist();

        SelectOutcome::Added(FetchTicket {
            catalog_ref: city.id.clone(),
            epoch,
        })
    }

    /// Replace the weather of the selection the ticket was issued for.
    /// Returns false (and changes nothing) if that selection is gone.
    pub fn attach_weather(&mut self, ticket: &FetchTicket, snapshot: WeatherSnapshot) -> bool {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.catalog_ref == ticket.catalog_ref && entry.epoch == ticket.epoch)
        else {
            debug!("Discarding weather for removed selection {}", ticket.catalog_ref);
            return false;
        };

        entry.weather = Some(snapshot);
        self.persist();
        true
    }

    pub fn remove(&mut self, catalog_ref: &CityId) -> bool {
        let Some(index) = self.position(catalog_ref) else {
            return false;
        };

        self.entries.remove(index);
        self.timers.cancel(catalog_ref);
        info!("Removed {}", catalog_ref);
        self.persist();
        true
    }

    /// Apply a fired highlight timer
    pub fn clear_highlight(&mut self, expiry: &HighlightExpiry) -> bool {
        if !self.timers.expire(expiry) {
            return false;
        }
        match self.position(&expiry.catalog_ref) {
            Some(index) => {
                self.entries[index].highlighted = false;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn list(&self) -> &[SelectedCity] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, catalog_ref: &CityId) -> Option<&SelectedCity> {
        self.entries.iter().find(|entry| &entry.catalog_ref == catalog_ref)
    }

    /// Ticket for re-fetching an entry that is currently selected
    #[must_use]
    pub fn ticket(&self, catalog_ref: &CityId) -> Option<FetchTicket> {
        self.get(catalog_ref).map(|entry| FetchTicket {
            catalog_ref: entry.catalog_ref.clone(),
            epoch: entry.epoch,
        })
    }

    /// Tickets for every entry that has no weather yet
    #[must_use]
    pub fn missing_weather(&self) -> Vec<FetchTicket> {
        self.entries
            .iter()
            .filter(|entry| entry.weather.is_none())
            .map(|entry| FetchTicket {
                catalog_ref: entry.catalog_ref.clone(),
                epoch: entry.epoch,
            })
            .collect()
    }

    fn position(&self, catalog_ref: &CityId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| &entry.catalog_ref == catalog_ref)
    }

    fn bump_epoch(&mut self) -> u64 {
        self.next_epoch += 1;
        self.next_epoch
    }

    fn persist(&self) {
        let result = if self.entries.is_empty() {
            self.storage.remove(SELECTION_SLOT)
        } else {
            encode_selection(&self.entries)
                .map_err(anyhow::Error::from)
                .and_then(|bytes| self.storage.write(SELECTION_SLOT, bytes))
        };

        if let Err(e) = result {
            warn!("{}", CityWeatherError::storage(e.to_string()));
        }
    }
}
