//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and pluggable eviction.

mod expiry;
mod lru;
mod policy;
mod stats;
mod store;
mod ttl_cache;


// Re-export public types
pub use expiry::ExpirationMap;
pub use lru::LruPolicy;
pub use policy::{EvictionPolicy, NoPolicy, PolicyKind};
pub use stats::CacheStats;
pub use store::{CacheStore, MAX_TTL};
pub use ttl_cache::{TtlCache, DEFAULT_TTL};
