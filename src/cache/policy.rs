//! Eviction Policy Module
//!
//! Pluggable strategies deciding which key to discard when a bounded cache
//! is at capacity.

use std::str::FromStr;

use crate::cache::LruPolicy;
use crate::error::CacheError;

// == Eviction Policy Trait ==
/// Decides which key, if any, should be evicted when recording accesses.
///
/// Implementations are not synchronized; the cache serializes calls.
pub trait EvictionPolicy<K>: Send {
    /// Records an access to `key`.
    ///
    /// Returns the key that must be evicted to make room, if any.
    fn record_access(&mut self, key: &K) -> Option<K>;

    /// Stops tracking `key`. No-op if it is not tracked.
    fn remove(&mut self, key: &K);

    /// Number of tracked keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == No Policy ==
/// Policy that never evicts. Used with unbounded storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPolicy;

impl<K> EvictionPolicy<K> for NoPolicy {
    fn record_access(&mut self, _key: &K) -> Option<K> {
        None
    }

    fn remove(&mut self, _key: &K) {}

    fn len(&self) -> usize {
        0
    }
}

// == Policy Kind ==
/// Policy selection used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Lru,
    None,
}

impl PolicyKind {
    /// Builds a policy for a storage holding `capacity` entries.
    pub fn build(self, capacity: usize) -> Box<dyn EvictionPolicy<String>> {
        match self {
            PolicyKind::Lru => Box::new(LruPolicy::new(capacity)),
            PolicyKind::None => Box::new(NoPolicy),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "none" => Ok(PolicyKind::None),
            other => Err(CacheError::InvalidConfiguration(format!(
                "unknown eviction policy `{}`",
                other
            ))),
        }
    }
}
