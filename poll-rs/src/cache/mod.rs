//! Caching layer
//!
//! One bounded cache implementation serves both the search result cache
//! (LRU with TTL) and the compiled-pattern cache (FIFO, no expiry).

pub mod bounded;

pub use bounded::{BoundedCache, CacheEntry, CacheEntryStats, CacheStats, EvictionPolicy};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Default number of cached search results
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default lifetime of a cached search result
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// String-keyed LRU cache with a TTL
pub type SearchCache<V> = BoundedCache<String, V>;

impl<V: Clone> BoundedCache<String, V> {
    /// `max_size = 100`, `ttl = 5 minutes`
    pub fn with_defaults() -> Self {
        Self::lru(DEFAULT_MAX_SIZE, DEFAULT_TTL)
    }

    /// Deterministic key for a query and its filters.
    ///
    /// Object keys are sorted at every depth so two filter sets that only
    /// differ in field order share a key.
    pub fn generate_key<F: Serialize + ?Sized>(query: &str, filters: &F) -> String {
        let filters = serde_json::to_value(filters)
            .map(canonicalize)
            .unwrap_or(Value::Null);

        format!("{}:{}", query, filters)
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Periodically purge expired entries of a shared cache.
///
/// The task holds the lock only for the duration of one `cleanup()` call;
/// abort the returned handle to stop it.
pub fn spawn_cleanup<K, V>(cache: Arc<Mutex<BoundedCache<K, V>>>, every: Duration) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let removed = cache.lock().cleanup();
            if removed > 0 {
                debug!("Periodic cleanup removed {} cache entries", removed);
            }
        }
    })
}
