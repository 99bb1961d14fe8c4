//! Error types and handling for the `CityWeather` dashboard

use thiserror::Error;

/// Main error type for the `CityWeather` dashboard
#[derive(Error, Debug)]
pub enum CityWeatherError {
    /// Coordinate or weather lookup failed
    #[error("Retrieval error: {message}")]
    Retrieval { message: String },

    /// Text generation failed or produced unusable output
    #[error("Enrichment error: {message}")]
    Enrichment { message: String },

    /// Persisted selection could not be decoded
    #[error("Persistence read error: {message}")]
    PersistenceRead { message: String },

    /// Durable storage operation errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CityWeatherError {
    /// Create a new retrieval error
    pub fn retrieval<S: Into<String>>(message: S) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }

    /// Create a new enrichment error
    pub fn enrichment<S: Into<String>>(message: S) -> Self {
        Self::Enrichment {
            message: message.into(),
        }
    }

    /// Create a new persistence read error
    pub fn persistence_read<S: Into<String>>(message: S) -> Self {
        Self::PersistenceRead {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CityWeatherError::Retrieval { .. } => {
                "Unable to fetch weather right now. Remove the city and select it again to retry."
                    .to_string()
            }
            CityWeatherError::Enrichment { .. } => {
                "Description enrichment is unavailable; showing the raw description.".to_string()
            }
            CityWeatherError::PersistenceRead { .. } => {
                "Saved cities could not be read. Starting with an empty dashboard.".to_string()
            }
            CityWeatherError::Storage { .. } => {
                "Saving your cities failed. Changes may not survive a restart.".to_string()
            }
            CityWeatherError::Config { message } => {
                format!("Configuration error: {message}")
            }
        }
    }
}
