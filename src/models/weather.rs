//! Weather data model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions as reported by a weather lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Human-readable description of weather conditions
    pub description: String,
    /// Temperature in Celsius
    pub temperature_celsius: f64,
    /// Place name reported by the provider (may differ from the catalog name)
    pub display_name: String,
}

/// Weather attached to a selected city. Replaced wholesale on re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Description as returned by the provider
    pub raw_description: String,
    /// Enriched one-liner, or the raw description when enrichment is off or failed
    pub description: String,
    /// Temperature in Celsius
    pub temperature_celsius: f64,
    pub display_name: String,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    #[must_use]
    pub fn new(
        conditions: CurrentConditions,
        description: String,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            raw_description: conditions.description,
            description,
            temperature_celsius: conditions.temperature_celsius,
            display_name: conditions.display_name,
            fetched_at,
        }
    }

    #[must_use]
    pub fn temperature_fahrenheit(&self) -> f64 {
        self.temperature_celsius * 9.0 / 5.0 + 32.0
    }

    /// Format temperature rounded to whole degrees with unit
    #[must_use]
    pub fn format_temperature(&self, unit: TemperatureUnit) -> String {
        match unit {
            TemperatureUnit::Celsius => format!("{:.0}°C", self.temperature_celsius),
            TemperatureUnit::Fahrenheit => format!("{:.0}°F", self.temperature_fahrenheit()),
        }
    }
}

/// Display unit for temperatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }
}
