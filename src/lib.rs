//! Slab Cache - An embeddable in-process key/value cache
//!
//! Stores byte values in fixed, size-classed slabs with LRU eviction and
//! TTL expiration swept in the background.

pub mod cache;
pub mod config;
pub mod error;
pub mod storage;
pub mod tasks;

pub use cache::{EvictionPolicy, LruPolicy, NoPolicy, TtlCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use storage::{BoundedStorage, Storage, UnboundedStorage};
