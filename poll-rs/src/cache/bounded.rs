//! Bounded in-memory cache with optional TTL
//!
//! Ordering is kept by an [`LruCache`]: the front of its recency list is the
//! next eviction candidate. Under [`EvictionPolicy::Lru`] a successful `get`
//! refreshes the entry; under [`EvictionPolicy::Fifo`] lookups only peek, so
//! eviction follows insertion order.

use lru::LruCache;
use regex::RegexBuilder;
use serde::Serialize;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Which entry leaves first when the cache is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently read or written
    Lru,
    /// Oldest insertion, reads do not count
    Fifo,
}

/// A cached value with its bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Insertion time
    pub timestamp: Instant,
    /// Starts at 1 on insertion, incremented by every hit
    pub hits: u64,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Instant::now(),
            hits: 1,
        }
    }

    fn is_expired(&self, ttl: Option<Duration>, now: Instant) -> bool {
        match ttl {
            Some(ttl) => now.saturating_duration_since(self.timestamp) > ttl,
            None => false,
        }
    }
}

/// Per-entry statistics exposed for debug tooling
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryStats {
    pub key: String,
    pub hits: u64,
    pub age_ms: u128,
}

/// Snapshot of the cache state
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub ttl_ms: Option<u128>,
    pub policy: EvictionPolicy,
    pub total_hits: u64,
    /// Ordered from next-to-evict to most recent
    pub entries: Vec<CacheEntryStats>,
}

/// Size-bounded cache parameterised by eviction policy
#[derive(Debug)]
pub struct BoundedCache<K: Hash + Eq, V> {
    entries: LruCache<K, CacheEntry<V>>,
    max_size: usize,
    ttl: Option<Duration>,
    policy: EvictionPolicy,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(max_size: usize, ttl: Option<Duration>, policy: EvictionPolicy) -> Self {
        let capacity = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);

        Self {
            entries: LruCache::new(capacity),
            max_size: capacity.get(),
            ttl,
            policy,
        }
    }

    /// Least-recently-used cache with a time-to-live
    pub fn lru(max_size: usize, ttl: Duration) -> Self {
        Self::new(max_size, Some(ttl), EvictionPolicy::Lru)
    }

    /// Insertion-ordered cache without expiry
    pub fn fifo(max_size: usize) -> Self {
        Self::new(max_size, None, EvictionPolicy::Fifo)
    }

    /// Look up a value, dropping it if it outlived the TTL
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        let expired = self.entries.peek(key)?.is_expired(self.ttl, now);

        if expired {
            self.entries.pop(key);
            debug!("Cache entry expired on read");
            return None;
        }

        let entry = match self.policy {
            EvictionPolicy::Lru => self.entries.get_mut(key)?,
            EvictionPolicy::Fifo => self.entries.peek_mut(key)?,
        };
        entry.hits += 1;

        Some(entry.data.clone())
    }

    /// Insert a value, evicting the oldest entry when full
    pub fn set(&mut self, key: K, data: V) {
        // Replacing a key moves it to the back instead of evicting a neighbour
        if self.entries.pop(&key).is_none() && self.entries.len() >= self.max_size {
            if self.entries.pop_lru().is_some() {
                debug!(policy = ?self.policy, "Cache full, evicted oldest entry");
            }
        }

        self.entries.put(key, CacheEntry::new(data));
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.pop(key).map(|entry| entry.data)
    }

    /// Remove every entry
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Drop all entries older than the TTL; returns how many were removed
    pub fn cleanup(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;

        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.pop(key);
        }

        if !expired.is_empty() {
            debug!("Cache cleanup removed {} expired entries", expired.len());
        }

        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Hit counter of a live entry, without touching its position
    pub fn hits(&self, key: &K) -> Option<u64> {
        self.entries.peek(key).map(|entry| entry.hits)
    }
}

impl<V: Clone> BoundedCache<String, V> {
    /// Remove everything, or only keys matching a case-insensitive pattern.
    ///
    /// A pattern that is not a valid regex is matched literally.
    pub fn invalidate(&mut self, pattern: Option<&str>) -> usize {
        let Some(pattern) = pattern else {
            let removed = self.clear();
            debug!("Cache cleared ({} entries)", removed);
            return removed;
        };

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .or_else(|err| {
                warn!("Invalid invalidation pattern {:?}: {}", pattern, err);
                RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()
            });

        let regex = match regex {
            Ok(regex) => regex,
            Err(err) => {
                warn!("Cannot compile invalidation pattern: {}", err);
                return 0;
            }
        };

        let matching: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| regex.is_match(key))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matching {
            self.entries.pop(key);
        }

        debug!("Invalidated {} cache entries matching {:?}", matching.len(), pattern);

        matching.len()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();

        // LruCache iterates most recent first
        let mut entries: Vec<CacheEntryStats> = self
            .entries
            .iter()
            .map(|(key, entry)| CacheEntryStats {
                key: key.clone(),
                hits: entry.hits,
                age_ms: now.saturating_duration_since(entry.timestamp).as_millis(),
            })
            .collect();
        entries.reverse();

        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            ttl_ms: self.ttl.map(|ttl| ttl.as_millis()),
            policy: self.policy,
            total_hits: entries.iter().map(|entry| entry.hits).sum(),
            entries,
        }
    }
}
