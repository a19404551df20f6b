use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::MatchingConfig;

/// Fraction of entries removed by a capacity sweep, as a divisor.
const CAPACITY_SWEEP_DIVISOR: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// When false, lookups always miss and stores are dropped
    pub enabled: bool,
    /// Maximum number of entries
    pub capacity: usize,
    /// Lifetime of an entry
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 100,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl From<&MatchingConfig> for CacheConfig {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            enabled: config.cache_enabled,
            capacity: config.cache_size,
            ttl: config.cache_duration(),
        }
    }
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub capacity: usize,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created: Instant,
    /// Insertion order, breaks ties between equal creation instants
    seq: u64,
}

struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_seq: u64,
}

/// Size- and time-bounded memoisation store.
///
/// All state lives behind one `RwLock`: lookups share the read lock, while
/// stores, sweeps and the lazy removal of an expired entry take the write
/// lock, so eviction never interleaves with another writer.
///
/// Eviction runs on every store:
/// 1. entries older than the TTL are purged
/// 2. if the store is still at capacity, the oldest fifth (at least one) is removed
pub struct ResultCache<V> {
    state: RwLock<CacheState<V>>,
    config: CacheConfig,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        log::info!(
            "Creating result cache (enabled: {}, capacity: {}, ttl: {}s)",
            config.enabled,
            config.capacity,
            config.ttl.as_secs()
        );
        Self {
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.created) >= self.config.ttl
    }

    /// Looks up a live entry.
    ///
    /// An expired entry found here is dropped; nothing else is touched.
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.config.enabled {
            return None;
        }

        {
            let state = self.state.read();
            match state.entries.get(key) {
                None => return None,
                Some(entry) if !self.is_expired(entry, Instant::now()) => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock; a writer may have replaced the entry.
        let mut state = self.state.write();
        match state.entries.get(key) {
            None => return None,
            Some(entry) if !self.is_expired(entry, Instant::now()) => {
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }
        state.entries.remove(key);
        log::debug!("Dropped expired cache entry {}", key);
        None
    }

    /// Stores a value, overwriting any previous entry for the key.
    pub fn set(&self, key: impl Into<String>, value: V) {
        if !self.config.enabled {
            return;
        }

        let key = key.into();
        let now = Instant::now();
        let mut state = self.state.write();

        let before = state.entries.len();
        let ttl = self.config.ttl;
        state
            .entries
            .retain(|_, entry| now.saturating_duration_since(entry.created) < ttl);
        let purged = before - state.entries.len();
        if purged > 0 {
            log::debug!("Purged {} expired cache entries", purged);
        }

        if state.entries.len() >= self.config.capacity {
            let remove_count = (state.entries.len() / CAPACITY_SWEEP_DIVISOR).max(1);
            let mut by_age: Vec<(Instant, u64, String)> = state
                .entries
                .iter()
                .map(|(k, entry)| (entry.created, entry.seq, k.clone()))
                .collect();
            by_age.sort();
            for (_, _, old_key) in by_age.into_iter().take(remove_count) {
                state.entries.remove(&old_key);
            }
            log::debug!("Cache at capacity, evicted {} oldest entries", remove_count);
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let entry = CacheEntry {
            value,
            created: now,
            seq,
        };
        state.entries.insert(key, entry);
    }

    /// Returns the cached value for `key`, or computes, stores and returns it.
    ///
    /// The lock is not held while `compute` runs, so two callers racing on
    /// the same key may both compute; the later store wins.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            log::debug!("Cache hit for {}", key);
            return Ok(value);
        }
        let value = compute().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        let removed = state.entries.len();
        state.entries.clear();
        log::info!("Cleared {} cache entries", removed);
    }

    /// Number of stored entries, live or expired.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        let now = Instant::now();
        let total = state.entries.len();
        let active = state
            .entries
            .values()
            .filter(|entry| !self.is_expired(entry, now))
            .count();

        CacheStats {
            total,
            active,
            expired: total - active,
            capacity: self.config.capacity,
            ttl_secs: self.config.ttl.as_secs(),
        }
    }
}
