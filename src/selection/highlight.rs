//! One-shot highlight reset timers
//!
//! Selecting a city that is already tracked flashes its card. The flash is
//! cleared by a delayed task keyed by city; scheduling again for the same
//! city aborts the previous task so timers restart instead of stacking.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::warn;

use crate::models::CityId;

/// Emitted when a highlight timer fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightExpiry {
    pub catalog_ref: CityId,
    pub generation: u64,
}

pub(crate) struct HighlightTimers {
    delay: Duration,
    tx: mpsc::UnboundedSender<HighlightExpiry>,
    next_generation: u64,
    pending: HashMap<CityId, (u64, AbortHandle)>,
}

impl HighlightTimers {
    pub(crate) fn new(delay: Duration, tx: mpsc::UnboundedSender<HighlightExpiry>) -> Self {
        Self {
            delay,
            tx,
            next_generation: 0,
            pending: HashMap::new(),
        }
    }

    /// (Re)start the timer for `catalog_ref`. Returns false when no runtime
    /// is available to run it.
    pub(crate) fn schedule(&mut self, catalog_ref: &CityId) -> bool {
        self.cancel(catalog_ref);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; highlight for {} will not reset", catalog_ref);
            return false;
        };

        self.next_generation += 1;
        let expiry = HighlightExpiry {
            catalog_ref: catalog_ref.clone(),
            generation: self.next_generation,
        };
        let tx = self.tx.clone();
        let delay = self.delay;

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(expiry);
        });
        self.pending.insert(
            catalog_ref.clone(),
            (self.next_generation, handle.abort_handle()),
        );
        true
    }

    pub(crate) fn cancel(&mut self, catalog_ref: &CityId) {
        if let Some((_, handle)) = self.pending.remove(catalog_ref) {
            handle.abort();
        }
    }

    /// Consume an expiry. False if it was superseded or cancelled.
    pub(crate) fn expire(&mut self, expiry: &HighlightExpiry) -> bool {
        match self.pending.get(&expiry.catalog_ref) {
            Some((generation, _)) if *generation == expiry.generation => {
                self.pending.remove(&expiry.catalog_ref);
                true
            }
            _ => false,
        }
    }
}

impl Drop for HighlightTimers {
    fn drop(&mut self) {
        for (_, handle) in self.pending.values() {
            handle.abort();
        }
    }
}
