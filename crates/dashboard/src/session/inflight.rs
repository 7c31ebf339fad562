//! In-flight request tracking.
//!
//! Each submission for a key takes a [`Ticket`]. Starting a newer submission
//! for the same key makes older tickets stale; a handler whose ticket is stale
//! when its backend call returns discards the result (no cookie, no toast).

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

/// Claim on the latest submission for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    generation: u64,
}

/// Tracks the newest submission per client key.
#[derive(Clone)]
pub struct RequestSlots {
    current: Cache<String, u64>,
    next_generation: Arc<AtomicU64>,
}

impl RequestSlots {
    /// Slots forget a key `ttl` after its last submission started.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
            next_generation: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start a submission, superseding any in flight for `key`.
    pub async fn begin(&self, key: &str) -> Ticket {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.current.insert(key.to_owned(), generation).await;
        Ticket {
            key: key.to_owned(),
            generation,
        }
    }

    /// Whether `ticket` is still the newest for its key.
    pub async fn is_current(&self, ticket: &Ticket) -> bool {
        self.current.get(&ticket.key).await == Some(ticket.generation)
    }

    /// Finish a submission. Returns false if it was superseded.
    pub async fn finish(&self, ticket: Ticket) -> bool {
        let current = self.is_current(&ticket).await;
        if current {
            self.current.invalidate(&ticket.key).await;
        } else {
            tracing::debug!(key = %ticket.key, "discarding superseded response");
        }
        current
    }

    /// Run `work` as a submission for `key`; `None` if it was superseded.
    pub async fn run<T, Fut>(&self, key: &str, work: Fut) -> Option<T>
    where
        Fut: Future<Output = T>,
    {
        let ticket = self.begin(key).await;
        let output = work.await;
        self.finish(ticket).await.then_some(output)
    }
}

impl Default for RequestSlots {
    fn default() -> Self {
        Self::new(Duration::from_secs(120))
    }
}
