//! City weather fetching
//!
//! Resolves a catalog city to coordinates, looks up its current weather and,
//! when enrichment is configured, rewrites the description through the
//! shared [`EnrichmentCache`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::catalog::Catalog;
use crate::clock::Clock;
use crate::enrichment::{EnrichmentCache, TextGenerator};
use crate::error::CityWeatherError;
use crate::models::{CatalogCity, CityId, WeatherSnapshot};
use crate::weather::WeatherLookup;

/// Optional enrichment stage
pub struct Enrichment {
    pub cache: Arc<EnrichmentCache>,
    pub generator: Arc<dyn TextGenerator>,
    pub ttl: Duration,
}

pub struct CityFetchCoordinator {
    catalog: Arc<Catalog>,
    weather: Arc<dyn WeatherLookup>,
    enrichment: Option<Enrichment>,
    clock: Arc<dyn Clock>,
}

impl CityFetchCoordinator {
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        weather: Arc<dyn WeatherLookup>,
        enrichment: Option<Enrichment>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            weather,
            enrichment,
            clock,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Fetch a fresh snapshot for a catalog city
    #[instrument(skip(self))]
    pub async fn fetch(&self, catalog_ref: &CityId) -> Result<WeatherSnapshot> {
        let city = self.catalog.get(catalog_ref).ok_or_else(|| {
            CityWeatherError::retrieval(format!("{catalog_ref} is not in the catalog"))
        })?;
        self.fetch_city(city).await
    }

    /// Fetch by exact catalog name. `Ok(None)` if the name is unknown.
    pub async fn fetch_by_name(&self, name: &str) -> Result<Option<WeatherSnapshot>> {
        match self.catalog.find_by_name(name) {
            Some(city) => self.fetch_city(city).await.map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_city(&self, city: &CatalogCity) -> Result<WeatherSnapshot> {
        debug!("Looking up {} at {}", city.name, city.format_coordinates());
        let conditions = self
            .weather
            .current(city.latitude, city.longitude)
            .await
            .map_err(|e| {
                warn!("Weather lookup for {} failed: {:#}", city.name, e);
                CityWeatherError::retrieval(format!("{}: {e}", city.name))
            })?;

        let description = match &self.enrichment {
            Some(enrichment) => {
                let generator = enrichment.generator.clone();
                enrichment
                    .cache
                    .get_or_compute(&conditions.description, enrichment.ttl, |raw| async move {
                        generator.generate(&raw).await
                    })
                    .await
            }
            None => conditions.description.clone(),
        };

        info!(
            "Fetched weather for {}: {} ({:.1}°C)",
            city.name, description, conditions.temperature_celsius
        );
        Ok(WeatherSnapshot::new(conditions, description, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::CurrentConditions;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedWeather;

    #[async_trait]
    impl WeatherLookup for FixedWeather {
        async fn current(&self, latitude: f64, _longitude: f64) -> Result<CurrentConditions> {
            if latitude > 50.0 {
                return Err(anyhow!("provider down"));
            }
            Ok(CurrentConditions {
                description: "light rain".to_string(),
                temperature_celsius: 11.0,
                display_name: "Paris 1er".to_string(),
            })
        }
    }

    struct CountingGenerator {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, text: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("generator offline"));
            }
            Ok(format!("Expect {text} today. Umbrella advised.\nextra"))
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()))
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(vec![
            CatalogCity::new("1", "Paris", "FR", 48.8566, 2.3522),
            CatalogCity::new("2", "Oslo", "NO", 59.91, 10.75),
        ]))
    }

    fn coordinator(generator: Option<Arc<CountingGenerator>>) -> CityFetchCoordinator {
        let clock = clock();
        let enrichment = generator.map(|generator| Enrichment {
            cache: Arc::new(EnrichmentCache::new(clock.clone())),
            generator,
            ttl: Duration::from_secs(3600),
        });
        CityFetchCoordinator::new(catalog(), Arc::new(FixedWeather), enrichment, clock)
    }

    #[tokio::test]
    async fn test_fetch_without_enrichment_uses_raw_description() {
        let snapshot = coordinator(None).fetch(&CityId::from("1")).await.unwrap();

        assert_eq!(snapshot.description, "light rain");
        assert_eq!(snapshot.raw_description, "light rain");
        assert_eq!(snapshot.display_name, "Paris 1er");
        assert_eq!(snapshot.fetched_at.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_fetch_enriches_once_per_description() {
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let coordinator = coordinator(Some(generator.clone()));

        let first = coordinator.fetch(&CityId::from("1")).await.unwrap();
        let second = coordinator.fetch(&CityId::from("1")).await.unwrap();

        assert_eq!(first.description, "Expect light rain today.");
        assert_eq!(second.description, first.description);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_enrichment_failure_falls_back_to_raw() {
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let snapshot = coordinator(Some(generator)).fetch(&CityId::from("1")).await.unwrap();
        assert_eq!(snapshot.description, "light rain");
    }

    #[tokio::test]
    async fn test_lookup_failure_is_retrieval_error() {
        let err = coordinator(None).fetch(&CityId::from("2")).await.unwrap_err();
        assert!(matches!(err, CityWeatherError::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_unknown_city_is_retrieval_error() {
        let err = coordinator(None).fetch(&CityId::from("404")).await.unwrap_err();
        assert!(matches!(err, CityWeatherError::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_fetch_by_name() {
        let coordinator = coordinator(None);
        assert!(coordinator.fetch_by_name("Paris").await.unwrap().is_some());
        assert!(coordinator.fetch_by_name("Atlantis").await.unwrap().is_none());
    }
}
