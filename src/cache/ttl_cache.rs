//! TTL Cache Module
//!
//! Thread-safe cache front: one lock around the [`CacheStore`] plus the
//! background sweep that purges expired entries.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{CacheStats, CacheStore, EvictionPolicy};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::storage::Capacity;
use crate::tasks::spawn_sweep_task;

/// TTL used by [`TtlCache::compute_if_absent`] unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

// == TTL Cache ==
/// A cache that sweeps expired keys every `sweep_interval`. Keys are evicted
/// by the configured policy when storage is bounded.
///
/// Every operation, reads included, takes the same exclusive lock since a
/// read updates recency.
///
/// Construction spawns the sweep task on the current Tokio runtime. Call
/// [`TtlCache::shutdown`] to stop and join it; dropping the cache stops it
/// without waiting.
pub struct TtlCache {
    store: Arc<Mutex<CacheStore>>,
    default_ttl: Duration,
    shutdown_tx: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl TtlCache {
    // == Constructors ==
    /// Creates a bounded cache, see [`crate::storage::BoundedStorage`] for
    /// the memory layout.
    ///
    /// # Arguments
    /// * `classes` - `(max value size, slot count)` pairs
    /// * `sweep_interval` - time between background sweeps
    /// * `make_policy` - builds the eviction policy from the storage capacity
    pub fn bounded<F>(
        classes: impl IntoIterator<Item = (usize, usize)>,
        sweep_interval: Duration,
        make_policy: F,
    ) -> Result<Self>
    where
        F: FnOnce(usize) -> Box<dyn EvictionPolicy<String>>,
    {
        let store = CacheStore::bounded(classes, make_policy)?;
        Self::start(store, sweep_interval, DEFAULT_TTL)
    }

    /// Creates an unbounded cache. No policy is used since nothing needs
    /// to be evicted.
    pub fn unbounded(sweep_interval: Duration) -> Result<Self> {
        Self::start(CacheStore::unbounded(), sweep_interval, DEFAULT_TTL)
    }

    /// Creates a cache from configuration. An empty size class list selects
    /// unbounded storage.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = if config.size_classes.is_empty() {
            CacheStore::unbounded()
        } else {
            let policy = config.policy;
            CacheStore::bounded(config.size_classes.iter().copied(), |capacity| {
                policy.build(capacity)
            })?
        };
        Self::start(store, config.sweep_interval, config.default_ttl)
    }

    /// Replaces the TTL used by `compute_if_absent`.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    fn start(store: CacheStore, sweep_interval: Duration, default_ttl: Duration) -> Result<Self> {
        if sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        let runtime = Handle::try_current().map_err(|e| CacheError::Runtime(e.to_string()))?;

        info!(
            "Cache initialized: capacity={:?}, sweep_interval={:?}, default_ttl={:?}",
            store.capacity(),
            sweep_interval,
            default_ttl
        );

        let store = Arc::new(Mutex::new(store));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = spawn_sweep_task(&runtime, store.clone(), sweep_interval, shutdown_rx);

        Ok(Self {
            store,
            default_ttl,
            shutdown_tx,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`. Overwriting resets the TTL.
    ///
    /// # Errors
    /// `NoSpace` when bounded storage has no slot for the value.
    pub fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.store.lock().set(key, value, ttl, Instant::now())
    }

    // == Get ==
    /// Retrieves a live value, marking it as recently used.
    ///
    /// # Errors
    /// `NotFound` when the key is missing or expired.
    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.store.lock().get(key, Instant::now())
    }

    /// Checks whether `key` is live. Does not affect recency.
    pub fn has(&self, key: &str) -> bool {
        self.store.lock().has(key, Instant::now())
    }

    // == Compute If Absent ==
    /// Returns the value for `key`, computing and storing it on a miss.
    ///
    /// Computed values are stored with the default TTL. Concurrent misses on
    /// the same key each run `supplier` and write; the last write wins.
    pub fn compute_if_absent<F>(&self, key: &str, supplier: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Vec<u8>,
    {
        if let Ok(value) = self.get(key) {
            return Ok(value);
        }

        // Lock is released while the supplier runs
        let value = supplier();
        self.set(key, &value, self.default_ttl)?;
        Ok(value)
    }

    /// Removes `key`. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) {
        self.store.lock().delete(key);
    }

    /// Returns how long `key` has left to live.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.store.lock().ttl_remaining(key, Instant::now())
    }

    /// Runs one sweep pass immediately. Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.store.lock().cleanup_expired(Instant::now())
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Capacity {
        self.store.lock().capacity()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Renders the storage layout and occupancy.
    pub fn debug_string(&self) -> String {
        self.store.lock().to_string()
    }

    // == Shutdown ==
    /// Stops the sweep task and waits for it to finish. Safe to call twice.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);

        let sweeper = self.sweeper.lock().take();
        if let Some(handle) = sweeper {
            if let Err(e) = handle.await {
                warn!("TTL sweep task ended abnormally: {}", e);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &Arc<Mutex<CacheStore>> {
        &self.store
    }
}

impl fmt::Display for TtlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self.store.lock())
    }
}

impl fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("store", &*self.store.lock())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
