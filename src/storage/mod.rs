//! Storage Module
//!
//! Value storage backends consumed by the cache.
//!
//! # Backends
//! - [`BoundedStorage`]: fixed slabs partitioned into size classes
//! - [`UnboundedStorage`]: plain map, no capacity limit

mod bounded;
mod slots;
mod unbounded;

use std::fmt;

use crate::error::Result;

pub use bounded::{BoundedStorage, BucketStats, LENGTH_HEADER};
pub use slots::SlotPool;
pub use unbounded::UnboundedStorage;

// == Capacity ==
/// How many entries a storage can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capacity {
    Bounded(usize),
    Unbounded,
}

// == Storage Trait ==
/// Key/value storage without any locking of its own.
///
/// Callers are expected to provide mutual exclusion.
pub trait Storage: fmt::Display + Send {
    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<&[u8]>;

    /// Removes `key`. Removing an absent key is a no-op.
    fn remove(&mut self, key: &str);

    /// Number of stored entries.
    fn size(&self) -> usize;

    /// Number of entries the storage can hold.
    fn capacity(&self) -> Capacity;
}
