//! `CityWeather` - personal city weather dashboard
//!
//! This library provides catalog search with keyboard-driven autocomplete,
//! a persisted and deduplicated city selection, weather fetching, and an
//! optional cached rewrite of weather descriptions into short one-liners.

pub mod api;
pub mod autocomplete;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod dashboard;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod selection;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use autocomplete::{AutocompleteEngine, Direction};
pub use catalog::Catalog;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CityWeatherConfig;
pub use coordinator::{CityFetchCoordinator, Enrichment};
pub use dashboard::{Dashboard, DashboardEvent, DashboardView, Input, Key};
pub use enrichment::{EnrichmentCache, LlmClient, TextGenerator};
pub use error::CityWeatherError;
pub use models::{CatalogCity, CityId, CurrentConditions, TemperatureUnit, WeatherSnapshot};
pub use selection::{
    FjallSlotStorage, MemorySlotStorage, SelectOutcome, SelectionStore, SlotStorage,
};
pub use weather::{OpenWeatherClient, WeatherLookup};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CityWeatherError>;
