//! Configuration management for the `CityWeather` dashboard
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::CityWeatherError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CityWeatherConfig {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API key
    pub api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Description enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the text-generation service
    pub base_url: Option<String>,
    #[serde(default = "default_enrichment_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Where the city catalog comes from. A local path wins over a URL.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    pub path: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the durable selection store
    #[serde(default = "default_storage_location")]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// How long a card stays highlighted after a duplicate selection
    #[serde(default = "default_highlight_millis")]
    pub highlight_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    crate::weather::DEFAULT_OPENWEATHER_URL.to_string()
}

fn default_enrichment_ttl() -> u64 {
    crate::enrichment::DEFAULT_TTL.as_secs()
}

fn default_max_tokens() -> u32 {
    20
}

fn default_temperature() -> f32 {
    0.85
}

fn default_storage_location() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("cityweather").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".cityweather".to_string())
}

fn default_highlight_millis() -> u64 {
    u64::try_from(crate::selection::DEFAULT_HIGHLIGHT_DELAY.as_millis()).unwrap_or(1000)
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            ttl_seconds: default_enrichment_ttl(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: default_storage_location(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            highlight_millis: default_highlight_millis(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl EnrichmentConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn highlight_delay(&self) -> Duration {
        Duration::from_millis(self.highlight_millis)
    }
}

impl CityWeatherConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. CITYWEATHER_WEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("CITYWEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CityWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cityweather").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.enrichment.ttl_seconds == 0 {
            self.enrichment.ttl_seconds = default_enrichment_ttl();
        }
        if self.enrichment.max_tokens == 0 {
            self.enrichment.max_tokens = default_max_tokens();
        }
        if self.storage.location.is_empty() {
            self.storage.location = default_storage_location();
        }
        if self.dashboard.highlight_millis == 0 {
            self.dashboard.highlight_millis = default_highlight_millis();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_urls()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        let urls = [
            Some(("Weather API base URL", self.weather.base_url.as_str())),
            self.enrichment
                .base_url
                .as_deref()
                .map(|url| ("Enrichment base URL", url)),
            self.catalog.url.as_deref().map(|url| ("Catalog URL", url)),
        ];

        for (label, url) in urls.into_iter().flatten() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CityWeatherError::config(format!(
                    "{label} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.enrichment.enabled && self.enrichment.base_url.is_none() {
            return Err(CityWeatherError::config(
                "Enrichment is enabled but enrichment.base_url is not set",
            )
            .into());
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.enrichment.ttl_seconds > 7 * 24 * 3600 {
            return Err(
                CityWeatherError::config("Enrichment TTL cannot exceed 1 week").into(),
            );
        }

        if !(0.0..=2.0).contains(&self.enrichment.temperature) {
            return Err(CityWeatherError::config(
                "Enrichment temperature must be between 0.0 and 2.0",
            )
            .into());
        }

        if self.dashboard.highlight_millis > 10_000 {
            return Err(CityWeatherError::config(
                "Highlight duration cannot exceed 10 seconds",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CityWeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CityWeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
