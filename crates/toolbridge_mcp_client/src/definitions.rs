//! Per-identity cache of translated tool definitions.

use crate::{McpClientResult, RetryConfig, ToolServer, metrics, retry_with_backoff, to_function_spec};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use toolbridge_cache::{TtlCache, TtlCacheConfig};
use toolbridge_core::{CallerIdentity, FunctionSpec};
use tracing::{debug, info, instrument, warn};

/// Lifetime and capacity of cached tool lists.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCacheConfig {
    /// TTL of a successfully fetched list, in seconds
    ttl_secs: u64,
    /// TTL of an empty list stored after a failed fetch, in seconds
    empty_ttl_secs: u64,
    /// Maximum number of identities cached at once
    max_entries: usize,
}

impl Default for ToolCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            empty_ttl_secs: 60,
            max_entries: 1024,
        }
    }
}

impl ToolCacheConfig {
    /// Create a cache config.
    pub fn new(ttl_secs: u64, empty_ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            ttl_secs,
            empty_ttl_secs,
            max_entries,
        }
    }
}

type SpecList = Arc<Vec<FunctionSpec>>;

/// Cached lists plus invalidation generations, guarded together.
///
/// `epoch` moves on a full invalidation, `generations` on a per-key one.
/// Both draw from one counter. A fill stores its list only if the
/// generation of its key is unchanged since the fill began.
#[derive(Debug)]
struct Slots {
    cache: TtlCache<SpecList>,
    counter: u64,
    epoch: u64,
    generations: HashMap<String, u64>,
}

impl Slots {
    fn generation(&self, key: &str) -> u64 {
        self.generations
            .get(key)
            .copied()
            .unwrap_or(0)
            .max(self.epoch)
    }

    fn bump(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }
}

/// Caches the function specs of each caller, keyed by token fingerprint.
///
/// At most one fill per identity is in flight; concurrent callers for the
/// same identity wait for it and share the result. A failed fetch is
/// cached as an empty list for `empty_ttl_secs`. A fill that overlaps an
/// [`invalidate`](Self::invalidate) of its key still answers its caller
/// but is not stored.
pub struct ToolDefinitionCache {
    server: Arc<dyn ToolServer>,
    config: ToolCacheConfig,
    retry: RetryConfig,
    slots: Mutex<Slots>,
    fills: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl std::fmt::Debug for ToolDefinitionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinitionCache")
            .field("config", &self.config)
            .field("entries", &self.len())
            .finish()
    }
}

impl ToolDefinitionCache {
    /// Create an empty cache in front of `server`.
    pub fn new(server: Arc<dyn ToolServer>, config: ToolCacheConfig) -> Self {
        let ttl = TtlCacheConfig::default()
            .with_default_ttl(config.ttl_secs)
            .with_max_size(config.max_entries);
        Self {
            server,
            retry: RetryConfig::default(),
            slots: Mutex::new(Slots {
                cache: TtlCache::new(ttl),
                counter: 0,
                epoch: 0,
                generations: HashMap::new(),
            }),
            fills: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Use `retry` around `list_tools` fills.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Cache settings.
    pub fn config(&self) -> &ToolCacheConfig {
        &self.config
    }

    /// Number of cached identities, including not yet evicted expired ones.
    pub fn len(&self) -> usize {
        self.lock_slots().cache.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock_slots().cache.is_empty()
    }

    /// Whether an unexpired entry exists for `identity`.
    pub fn contains(&self, identity: &CallerIdentity) -> bool {
        self.lookup(identity.fingerprint()).is_some()
    }

    /// Function specs for `identity`, fetching them on a miss.
    ///
    /// Never fails: a fetch error degrades to an empty list.
    #[instrument(skip(self), fields(caller = %identity.short()))]
    pub async fn get(&self, identity: &CallerIdentity) -> SpecList {
        let key = identity.fingerprint();

        if let Some(specs) = self.lookup(key) {
            metrics::record_cache_lookup(true);
            debug!(count = specs.len(), "Tool definition cache hit");
            return specs;
        }

        let fill = {
            let mut fills = self.fills.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(fills.entry(key.to_string()).or_default())
        };
        let _guard = fill.lock().await;

        if let Some(specs) = self.lookup(key) {
            metrics::record_cache_lookup(true);
            return specs;
        }
        metrics::record_cache_lookup(false);
        let generation = self.lock_slots().generation(key);

        let (specs, ttl_secs) = match self.fetch(identity).await {
            Ok(specs) if !specs.is_empty() => (specs, self.config.ttl_secs),
            Ok(specs) => (specs, self.config.empty_ttl_secs),
            Err(e) => {
                warn!(error = %e, "Tool discovery failed, caching an empty tool list");
                (Vec::new(), self.config.empty_ttl_secs)
            }
        };

        let specs = Arc::new(specs);
        let stored = {
            let mut slots = self.lock_slots();
            if slots.generation(key) == generation {
                slots.cache.insert(key, Arc::clone(&specs), Some(ttl_secs));
                slots.generations.remove(key);
                true
            } else {
                false
            }
        };
        self.fills
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        if stored {
            info!(count = specs.len(), ttl_secs, "Cached tool definitions");
        } else {
            debug!(count = specs.len(), "Invalidated during fill, not caching");
        }
        specs
    }

    /// Drop the entry for `identity`, or every entry when `None`.
    pub fn invalidate(&self, identity: Option<&CallerIdentity>) {
        let mut slots = self.lock_slots();
        let generation = slots.bump();
        match identity {
            Some(identity) => {
                let key = identity.fingerprint();
                slots.cache.remove(key);
                slots.generations.insert(key.to_string(), generation);
                debug!(caller = %identity.short(), "Invalidated tool definitions");
            }
            None => {
                slots.cache.clear();
                slots.generations.clear();
                slots.epoch = generation;
                debug!("Invalidated all tool definitions");
            }
        }
    }

    async fn fetch(&self, identity: &CallerIdentity) -> McpClientResult<Vec<FunctionSpec>> {
        let tools = retry_with_backoff(&self.retry, || self.server.list_tools(identity)).await?;
        Ok(tools.iter().map(to_function_spec).collect())
    }

    fn lookup(&self, key: &str) -> Option<SpecList> {
        self.lock_slots()
            .cache
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
