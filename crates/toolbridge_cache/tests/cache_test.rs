//! Tests for the TtlCache implementation.

use serde_json::{Value, json};
use std::time::Duration;
use toolbridge_cache::{TtlCache, TtlCacheConfig};

#[test]
fn test_cache_insert_and_get() {
    let config = TtlCacheConfig::default()
        .with_default_ttl(10)
        .with_max_size(100);
    let mut cache: TtlCache<Value> = TtlCache::new(config);

    cache.insert("fingerprint-a", json!(["calculate"]), Some(10));

    let entry = cache.get("fingerprint-a");
    assert!(entry.is_some());
    assert_eq!(entry.unwrap().value(), &json!(["calculate"]));

    assert!(cache.get("fingerprint-b").is_none());
}

#[test]
fn test_cache_expiration() {
    let config = TtlCacheConfig::default().with_default_ttl(1);
    let mut cache = TtlCache::new(config);

    cache.insert("fingerprint-a", json!("tools"), None);
    assert!(cache.get("fingerprint-a").is_some());

    std::thread::sleep(Duration::from_millis(1100));

    assert!(cache.get("fingerprint-a").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_zero_ttl_is_never_served() {
    let mut cache = TtlCache::new(TtlCacheConfig::default());
    cache.insert("fingerprint-a", json!("tools"), Some(0));
    assert!(cache.get("fingerprint-a").is_none());
}

#[test]
fn test_cache_clear() {
    let mut cache = TtlCache::new(TtlCacheConfig::default());

    cache.insert("a", json!("result1"), None);
    cache.insert("b", json!("result2"), None);
    assert_eq!(cache.len(), 2);

    cache.clear();

    assert_eq!(cache.len(), 0);
    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_none());
}

#[test]
fn test_cache_remove_single_entry() {
    let mut cache = TtlCache::new(TtlCacheConfig::default());
    cache.insert("a", json!("result1"), None);
    cache.insert("b", json!("result2"), None);

    assert_eq!(cache.remove("a"), Some(json!("result1")));
    assert_eq!(cache.remove("a"), None);
    assert!(cache.get("b").is_some());
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_update_existing_key() {
    let mut cache = TtlCache::new(TtlCacheConfig::default().with_max_size(1));

    cache.insert("a", json!("result1"), None);
    cache.insert("a", json!("result2"), None);

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("a").unwrap().value(), &json!("result2"));
}

#[test]
fn test_cache_counts_hits() {
    let mut cache = TtlCache::new(TtlCacheConfig::default());
    cache.insert("a", json!(1), None);

    cache.get("a");
    cache.get("a");

    assert_eq!(*cache.get("a").unwrap().hits(), 3);
}

#[test]
fn test_cache_cleanup_expired_entries() {
    let config = TtlCacheConfig::default().with_default_ttl(1);
    let mut cache = TtlCache::new(config);

    cache.insert("a", json!("result1"), Some(1));
    cache.insert("b", json!("result2"), Some(1));
    cache.insert("c", json!("result3"), Some(60));
    assert_eq!(cache.len(), 3);

    std::thread::sleep(Duration::from_millis(1100));

    let removed = cache.cleanup_expired();
    assert_eq!(removed, 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_lru_eviction() {
    let config = TtlCacheConfig::default().with_max_size(2);
    let mut cache = TtlCache::new(config);

    cache.insert("a", json!("result1"), None);
    std::thread::sleep(Duration::from_millis(5));
    cache.insert("b", json!("result2"), None);
    assert_eq!(cache.len(), 2);

    // Evicts the least recently used entry (a)
    cache.insert("c", json!("result3"), None);

    assert_eq!(cache.len(), 2);
    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_some());
    assert!(cache.get("c").is_some());
}

#[test]
fn test_expired_entries_are_evicted_before_live_ones() {
    let config = TtlCacheConfig::default().with_max_size(2);
    let mut cache = TtlCache::new(config);

    cache.insert("stale", json!("old"), Some(0));
    cache.insert("live", json!("new"), None);
    cache.insert("fresh", json!("newer"), None);

    assert!(cache.get("live").is_some());
    assert!(cache.get("fresh").is_some());
}

#[test]
fn test_unrepresentable_ttl_never_expires() {
    let config = TtlCacheConfig::default().with_default_ttl(u64::MAX);
    let mut cache: TtlCache<u8> = TtlCache::new(config);
    cache.insert("explicit", 1, Some(u64::MAX));
    cache.insert("default", 2, None);

    let entry = cache.get("explicit").unwrap();
    assert!(entry.expires_at().is_none());
    assert!(!entry.is_expired());
    assert_eq!(cache.get("default").map(|e| *e.value()), Some(2));
    assert_eq!(cache.cleanup_expired(), 0);
}
