//! Cache Store Module
//!
//! Main cache engine combining storage, eviction policy and TTL tracking.
//! Callers provide the clock so every decision is made against one instant.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheStats, EvictionPolicy, ExpirationMap, NoPolicy};
use crate::error::{CacheError, Result};
use crate::storage::{BoundedStorage, Capacity, Storage, UnboundedStorage};

/// Longest TTL honoured; larger values are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Store ==
/// Storage, policy and expiration map mutated together as one unit.
///
/// A key is live when it is present in storage, tracked by the policy and
/// has a deadline that has not passed.
pub struct CacheStore {
    storage: Box<dyn Storage>,
    policy: Box<dyn EvictionPolicy<String>>,
    expirations: ExpirationMap,
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(storage: Box<dyn Storage>, policy: Box<dyn EvictionPolicy<String>>) -> Self {
        let stats = CacheStats::new(storage.capacity());
        Self {
            storage,
            policy,
            expirations: ExpirationMap::new(),
            stats,
        }
    }

    /// Creates a store over [`BoundedStorage`].
    ///
    /// # Arguments
    /// * `classes` - `(max value size, slot count)` pairs
    /// * `make_policy` - builds the eviction policy from the storage capacity
    pub fn bounded<F>(classes: impl IntoIterator<Item = (usize, usize)>, make_policy: F) -> Result<Self>
    where
        F: FnOnce(usize) -> Box<dyn EvictionPolicy<String>>,
    {
        let storage = BoundedStorage::new(classes)?;
        let policy = match storage.capacity() {
            Capacity::Bounded(capacity) => make_policy(capacity),
            Capacity::Unbounded => Box::new(NoPolicy),
        };
        Ok(Self::new(Box::new(storage), policy))
    }

    /// Creates a store over [`UnboundedStorage`]; nothing is ever evicted.
    pub fn unbounded() -> Self {
        Self::new(Box::new(UnboundedStorage::new()), Box::new(NoPolicy))
    }

    // == Set ==
    /// Stores a value that expires `ttl` after `now`.
    ///
    /// If the policy picks a victim it is removed before the write. When
    /// storage has no room the error is returned unchanged and the key's
    /// previous state is restored.
    pub fn set(&mut self, key: &str, value: &[u8], ttl: Duration, now: Instant) -> Result<()> {
        let owned = key.to_string();

        if let Some(victim) = self.policy.record_access(&owned) {
            debug!("Evicting key ({}) to make room for ({})", victim, key);
            self.storage.remove(&victim);
            self.expirations.remove(&victim);
            self.stats.record_eviction();
        }

        let previous = self.expirations.insert(key, now + ttl.min(MAX_TTL));

        if let Err(err) = self.storage.put(key, value) {
            match previous {
                Some(deadline) => {
                    self.expirations.insert(key, deadline);
                }
                None => {
                    self.expirations.remove(key);
                    self.policy.remove(&owned);
                }
            }
            self.stats.set_total_entries(self.storage.size());
            return Err(err);
        }

        self.stats.set_total_entries(self.storage.size());
        Ok(())
    }

    // == Get ==
    /// Retrieves a live value and marks it as recently used.
    ///
    /// Missing and expired keys both yield `NotFound`. Expired entries are
    /// left for the sweep.
    pub fn get(&mut self, key: &str, now: Instant) -> Result<Vec<u8>> {
        let value = self
            .storage
            .get(key)
            .filter(|_| !self.expirations.is_expired(key, now))
            .map(<[u8]>::to_vec);

        match value {
            Some(value) => {
                // A hit only refreshes recency
                let _ = self.policy.record_access(&key.to_string());
                self.stats.record_hit();
                Ok(value)
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Has ==
    /// Checks whether `key` is live without touching recency.
    pub fn has(&self, key: &str, now: Instant) -> bool {
        self.storage.get(key).is_some() && !self.expirations.is_expired(key, now)
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key is a no-op.
    pub fn delete(&mut self, key: &str) {
        self.expirations.remove(key);
        self.storage.remove(key);
        self.policy.remove(&key.to_string());
        self.stats.set_total_entries(self.storage.size());
    }

    // == TTL Remaining ==
    /// Returns how long `key` has left, or `None` if it is not live.
    pub fn ttl_remaining(&self, key: &str, now: Instant) -> Option<Duration> {
        if !self.has(key, now) {
            return None;
        }
        self.expirations.ttl_remaining(key, now)
    }

    // == Cleanup Expired ==
    /// Removes all entries whose deadline passed before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, now: Instant) -> usize {
        let expired = self.expirations.drain_expired(now);
        for key in &expired {
            self.storage.remove(key);
            self.policy.remove(key);
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.storage.size());
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.storage.size());
        stats
    }

    /// Returns the number of entries in storage, expired ones included.
    pub fn len(&self) -> usize {
        self.storage.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Capacity {
        self.storage.capacity()
    }

    /// Sizes of storage, policy and expiration map, which always agree.
    #[cfg(test)]
    pub(crate) fn tracked_counts(&self) -> (usize, usize, usize) {
        (self.storage.size(), self.policy.len(), self.expirations.len())
    }

    #[cfg(test)]
    pub(crate) fn has_deadline(&self, key: &str) -> bool {
        self.expirations.contains(key)
    }
}

impl fmt::Display for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage)
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("storage", &self.storage.to_string())
            .field("tracked", &self.policy.len())
            .field("deadlines", &self.expirations.len())
            .field("stats", &self.stats)
            .finish()
    }
}
