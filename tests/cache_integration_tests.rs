//! Integration Tests for the Cache API
//!
//! Exercises the public surface end to end: bounded storage layout, LRU
//! eviction, TTL expiry and the background sweep.

use std::sync::Arc;
use std::time::Duration;

use slab_cache::cache::PolicyKind;
use slab_cache::storage::Capacity;
use slab_cache::{
    BoundedStorage, CacheError, Config, EvictionPolicy, LruPolicy, Storage, TtlCache,
};

// == Helper Functions ==

const LONG_TTL: Duration = Duration::from_secs(300);

fn lru(capacity: usize) -> Box<dyn EvictionPolicy<String>> {
    Box::new(LruPolicy::new(capacity))
}

fn test_cache(classes: &[(usize, usize)], sweep: Duration) -> TtlCache {
    TtlCache::bounded(classes.iter().copied(), sweep, lru).unwrap()
}

// == Storage Tests ==

#[test]
fn test_bounded_storage_round_trip() {
    let mut storage = BoundedStorage::new([(5, 3), (10, 2), (15, 1)]).unwrap();

    storage.put("foo", b"bar").unwrap();
    assert_eq!(storage.size(), 1);
    assert_eq!(storage.bucket_of("foo"), Some(9));
    assert_eq!(storage.get("foo"), Some(&b"bar"[..]));

    storage.remove("foo");
    assert_eq!(storage.size(), 0);
}

#[test]
fn test_bounded_storage_cross_class_rewrite() {
    let mut storage = BoundedStorage::new([(5, 3), (10, 2), (20, 1)]).unwrap();

    storage.put("k", b"bar").unwrap();
    storage.put("k", b"much-longer-value").unwrap();

    assert_eq!(storage.size(), 1);
    assert_eq!(storage.bucket_of("k"), Some(24));
    let occupied: usize = storage.bucket_stats().iter().map(|b| b.occupied).sum();
    assert_eq!(occupied, 1);
}

#[test]
fn test_bounded_storage_invalid_configuration() {
    let result = BoundedStorage::new([(0, 4), (16, 0)]);
    assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
}

// == Policy Tests ==

#[test]
fn test_lru_policy_capacity_two() {
    let mut policy = LruPolicy::new(2);
    let mut access = |k: &str| policy.record_access(&k.to_string());

    assert_eq!(access("a"), None);
    assert_eq!(access("b"), None);
    assert_eq!(access("c"), Some("a".to_string()));
    assert_eq!(access("d"), Some("b".to_string()));
    assert_eq!(access("e"), Some("c".to_string()));
    assert_eq!(access("d"), None);
    assert_eq!(access("e"), None);
}

// == Cache Tests ==

#[tokio::test]
async fn test_ttl_expiry_lazy_then_swept() {
    let cache = test_cache(&[(16, 8)], Duration::from_millis(40));

    cache.set("k", b"v", Duration::from_millis(10)).unwrap();
    tokio::time::sleep(Duration::from_millis(15)).await;

    // Expired before any sweep tick
    assert!(matches!(cache.get("k"), Err(CacheError::NotFound(_))));
    assert_eq!(cache.len(), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.stats().expirations, 1);

    cache.shutdown().await;
}

#[tokio::test]
async fn test_eviction_interplay() {
    let cache = test_cache(&[(16, 1)], Duration::from_secs(1));
    assert_eq!(cache.capacity(), Capacity::Bounded(1));

    cache.set("k1", b"first", LONG_TTL).unwrap();
    cache.set("k2", b"second", LONG_TTL).unwrap();

    assert!(!cache.has("k1"));
    assert!(cache.has("k2"));
    assert_eq!(cache.len(), 1);

    cache.shutdown().await;
}

#[tokio::test]
async fn test_read_refreshes_recency() {
    let cache = test_cache(&[(16, 2)], Duration::from_secs(1));

    cache.set("a", b"1", LONG_TTL).unwrap();
    cache.set("b", b"2", LONG_TTL).unwrap();
    cache.get("a").unwrap();
    cache.set("c", b"3", LONG_TTL).unwrap();

    assert!(cache.has("a"));
    assert!(!cache.has("b"));
    assert!(cache.has("c"));

    cache.shutdown().await;
}

#[tokio::test]
async fn test_delete_absent_key_is_noop() {
    let cache = test_cache(&[(16, 2)], Duration::from_secs(1));

    cache.delete("never-set");
    assert!(cache.is_empty());

    cache.shutdown().await;
}

#[tokio::test]
async fn test_full_class_reports_no_space() {
    let config = Config {
        size_classes: vec![(4, 2)],
        policy: PolicyKind::None,
        ..Config::default()
    };
    let cache = TtlCache::from_config(&config).unwrap();

    cache.set("a", b"1", LONG_TTL).unwrap();
    cache.set("b", b"2", LONG_TTL).unwrap();

    let result = cache.set("c", b"3", LONG_TTL);
    assert!(matches!(result, Err(CacheError::NoSpace { .. })));
    assert_eq!(cache.get("a").unwrap(), b"1");
    assert_eq!(cache.get("b").unwrap(), b"2");

    cache.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access() {
    let cache = Arc::new(test_cache(&[(16, 64), (64, 16)], Duration::from_millis(10)));

    let mut handles = Vec::new();
    for t in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            for i in 0..500 {
                let key = format!("key{}", (t * 7 + i) % 100);
                if i % 3 == 0 {
                    let _ = cache.set(&key, format!("v{}", i).as_bytes(), Duration::from_millis(5));
                } else if i % 3 == 1 {
                    let _ = cache.get(&key);
                } else {
                    let _ = cache.compute_if_absent(&key, || b"computed".to_vec());
                }
                if i % 50 == 0 {
                    cache.delete(&key);
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(cache.len() <= 80);
    cache.shutdown().await;
}
