//! Data models for the `CityWeather` dashboard
//!
//! This module contains the core domain models organized by concern:
//! - City: catalog identifiers and reference entries
//! - Weather: lookup results and immutable weather snapshots

pub mod city;
pub mod weather;

// Re-export all public types for convenient access
pub use city::{CatalogCity, CityId};
pub use weather::{CurrentConditions, TemperatureUnit, WeatherSnapshot};
