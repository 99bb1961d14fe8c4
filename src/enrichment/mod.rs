//! Description enrichment
//!
//! Raw provider descriptions ("light rain") can be rewritten into a short
//! generated one-liner. Generation is slow, so results are kept in a
//! time-bounded cache keyed by the raw description.

pub mod generator;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::CityWeatherError;

pub use generator::{LlmClient, TextGenerator};

/// Default lifetime of a generated description
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-memory cache of generated descriptions with per-entry TTL.
///
/// Expiry is checked lazily on read. Concurrent misses for the same key may
/// both compute; the last write wins.
pub struct EnrichmentCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl EnrichmentCache {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Live value for `key`, if any. Expired entries are dropped on sight.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if now < entry.expires_at {
                debug!("Cache hit for {:?}", key);
                return Some(entry.value.clone());
            }
        }

        if self
            .entries
            .remove_if(key, |_, entry| now >= entry.expires_at)
            .is_some()
        {
            debug!("Cache entry for {:?} expired", key);
        }
        None
    }

    /// Return the cached one-liner for `raw`, generating it on a miss.
    ///
    /// Failed or empty generations fall back to `raw` and are not cached.
    pub async fn get_or_compute<F, Fut>(&self, raw: &str, ttl: Duration, compute: F) -> String
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = anyhow::Result<String>>,
    {
        if let Some(value) = self.get(raw) {
            return value;
        }

        let generated = match compute(raw.to_string()).await {
            Ok(text) => one_liner(&text),
            Err(e) => {
                warn!("{}", CityWeatherError::enrichment(e.to_string()));
                return raw.to_string();
            }
        };

        if generated.is_empty() {
            warn!(
                "{}",
                CityWeatherError::enrichment(format!("no usable text for {raw:?}"))
            );
            return raw.to_string();
        }

        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(
            raw.to_string(),
            CacheEntry {
                value: generated.clone(),
                expires_at,
            },
        );
        debug!("Cached enrichment for {:?}", raw);
        generated
    }

    /// Number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .iter()
            .filter(|entry| now < entry.expires_at)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physically drop expired entries
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries.retain(|_, entry| now < entry.expires_at);
    }
}

/// Reduce raw generator output to a single short line: first line only,
/// cut after the first period, surrounding whitespace trimmed.
#[must_use]
pub fn one_liner(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    match line.find('.') {
        Some(end) => line[..=end].trim().to_string(),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use anyhow::anyhow;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> (EnrichmentCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        (EnrichmentCache::new(clock.clone()), clock)
    }

    #[rstest]
    #[case("Soft drops tap the roofs.\nSecond line", "Soft drops tap the roofs.")]
    #[case("  A grey blanket hangs low. Bring a coat.  ", "A grey blanket hangs low.")]
    #[case("Sunshine everywhere!! Enjoy", "Sunshine everywhere!! Enjoy")]
    #[case("Wow! It is pouring out there. Stay dry.", "Wow! It is pouring out there.")]
    #[case("Need an umbrella? Yes, light rain today.", "Need an umbrella? Yes, light rain today.")]
    #[case("no terminator here   ", "no terminator here")]
    #[case("\nleading newline wins", "")]
    #[case("", "")]
    fn test_one_liner(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(one_liner(raw), expected);
    }

    #[tokio::test]
    async fn test_hit_within_ttl_computes_once() {
        let (cache, clock) = cache();
        let calls = AtomicUsize::new(0);
        let compute = |_: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>("Drizzle dances on the pavement. Really.".to_string()) }
        };

        let first = cache.get_or_compute("light rain", DEFAULT_TTL, compute).await;
        clock.advance(TimeDelta::seconds(3599));
        let second = cache.get_or_compute("light rain", DEFAULT_TTL, compute).await;

        assert_eq!(first, "Drizzle dances on the pavement.");
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entry_expires_at_ttl() {
        let (cache, clock) = cache();
        let calls = AtomicUsize::new(0);
        let compute = |_: String| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, anyhow::Error>(format!("Version {n}.")) }
        };

        assert_eq!(cache.get_or_compute("mist", DEFAULT_TTL, compute).await, "Version 0.");
        clock.advance(TimeDelta::seconds(3600));
        assert!(cache.get("mist").is_none());
        assert_eq!(cache.get_or_compute("mist", DEFAULT_TTL, compute).await, "Version 1.");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_returns_raw_and_is_not_cached() {
        let (cache, _clock) = cache();

        let value = cache
            .get_or_compute("light rain", Duration::from_secs(3600), |_| async {
                Err(anyhow!("generator offline"))
            })
            .await;

        assert_eq!(value, "light rain");
        assert!(cache.get("light rain").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_blank_output_returns_raw_and_is_not_cached() {
        let (cache, _clock) = cache();

        let value = cache
            .get_or_compute("haze", DEFAULT_TTL, |_| async { Ok("   \n trailing".to_string()) })
            .await;

        assert_eq!(value, "haze");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_keys_are_independent_and_purge_drops_expired() {
        let (cache, clock) = cache();

        cache
            .get_or_compute("snow", Duration::from_secs(10), |_| async {
                Ok("White out.".to_string())
            })
            .await;
        cache
            .get_or_compute("fog", Duration::from_secs(100), |_| async {
                Ok("Grey veil.".to_string())
            })
            .await;
        assert_eq!(cache.len(), 2);

        clock.advance(TimeDelta::seconds(50));
        assert_eq!(cache.len(), 1);
        cache.purge_expired();
        assert_eq!(cache.entries.len(), 1);
        assert_eq!(cache.get("fog").as_deref(), Some("Grey veil."));
    }
}
