//! TTL cache with LRU eviction.

use derive_getters::Getters;
use derive_setters::Setters;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Sizing and expiry policy for a [`TtlCache`].
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct TtlCacheConfig {
    /// TTL in seconds used when an insert does not name one
    default_ttl: u64,
    /// Maximum number of live entries
    max_size: usize,
}

impl Default for TtlCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: 3600,
            max_size: 1024,
        }
    }
}

/// A cached value with its bookkeeping.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the value was stored
    inserted_at: Instant,
    /// When the value stops being served; `None` when the TTL is too
    /// large to represent
    expires_at: Option<Instant>,
    /// Last time the value was read or written
    last_accessed: Instant,
    /// Number of reads served
    hits: u64,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            inserted_at: now,
            expires_at: now.checked_add(ttl),
            last_accessed: now,
            hits: 0,
        }
    }

    /// True once the entry's TTL has elapsed.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }

    /// Consume the entry, returning the value.
    pub fn into_value(self) -> V {
        self.value
    }
}

/// String-keyed cache bounded by size and age.
///
/// # Examples
///
/// ```
/// use toolbridge_cache::{TtlCache, TtlCacheConfig};
///
/// let mut cache = TtlCache::new(TtlCacheConfig::default().with_max_size(2));
/// cache.insert("a", 1, None);
/// cache.insert("b", 2, None);
/// assert_eq!(cache.get("a").map(|e| *e.value()), Some(1));
///
/// // "b" is now the least recently used entry
/// cache.insert("c", 3, None);
/// assert!(cache.get("b").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    config: TtlCacheConfig,
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> TtlCache<V> {
    /// Create an empty cache.
    pub fn new(config: TtlCacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    /// The cache's policy.
    pub fn config(&self) -> &TtlCacheConfig {
        &self.config
    }

    /// Store `value` under `key` for `ttl_secs` (or the default TTL).
    ///
    /// Replaces any existing entry for the key. When the cache is full,
    /// expired entries are dropped first, then the least recently used one.
    pub fn insert(&mut self, key: impl Into<String>, value: V, ttl_secs: Option<u64>) {
        let key = key.into();
        let ttl = Duration::from_secs(ttl_secs.unwrap_or(self.config.default_ttl));

        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_size {
            self.cleanup_expired();
            if self.entries.len() >= self.config.max_size {
                self.evict_lru();
            }
        }

        trace!(ttl_secs = ttl.as_secs(), "Caching entry");
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    /// Look up a live entry, refreshing its recency.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<&CacheEntry<V>> {
        if self.entries.get(key).is_some_and(CacheEntry::is_expired) {
            debug!("Dropping expired cache entry");
            self.entries.remove(key);
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.last_accessed = Instant::now();
        entry.hits += 1;
        Some(entry)
    }

    /// Remove an entry, returning its value if it was live.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries
            .remove(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::into_value)
    }

    /// Number of stored entries, including expired ones not yet collected.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop expired entries, returning how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "Removed expired cache entries");
        }
        removed
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            debug!(max_size = self.config.max_size, "Evicting least recently used entry");
            self.entries.remove(&key);
        }
    }
}
