//! City catalog
//!
//! Read-only reference list of selectable cities, loaded once at startup from
//! a local JSON export or from a remote `/api/cities` endpoint.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::models::{CatalogCity, CityId};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cities: Vec<CatalogCity>,
}

impl Catalog {
    #[must_use]
    pub fn new(cities: Vec<CatalogCity>) -> Self {
        Self { cities }
    }

    /// Load the catalog from a JSON array on disk
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let cities: Vec<CatalogCity> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;

        info!("Loaded {} cities from {}", cities.len(), path.display());
        Ok(Self::new(cities))
    }

    /// Fetch the catalog from `{base_url}/api/cities`
    #[instrument(skip(client))]
    pub async fn fetch(client: &reqwest::Client, base_url: &str) -> Result<Self> {
        let url = format!("{}/api/cities", base_url.trim_end_matches('/'));
        let cities: Vec<CatalogCity> = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to request catalog from {url}"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| "Failed to parse catalog response")?;

        info!("Fetched {} cities from {}", cities.len(), url);
        Ok(Self::new(cities))
    }

    #[must_use]
    pub fn cities(&self) -> &[CatalogCity] {
        &self.cities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &CityId) -> Option<&CatalogCity> {
        self.cities.iter().find(|city| &city.id == id)
    }

    /// Exact, case-sensitive name lookup
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogCity> {
        self.cities.iter().find(|city| city.name == name)
    }

    /// Case-insensitive exact name lookup
    #[must_use]
    pub fn find_by_name_ignore_case(&self, name: &str) -> Option<&CatalogCity> {
        let needle = name.to_lowercase();
        self.cities
            .iter()
            .find(|city| city.name.to_lowercase() == needle)
    }
}
