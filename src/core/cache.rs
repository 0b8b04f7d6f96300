//! TTL result cache for expensive read operations.
//!
//! Expiration is lazy: freshness is checked only at lookup, and a stale
//! entry is simply overwritten by the next miss for its key. Nothing sweeps
//! the map, so unused stale entries persist until `clear` — a known
//! scalability limit of the design.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A cached value with its insertion time and freshness window.
#[derive(Debug, Clone)]
pub struct CacheEntry<R> {
    value: R,
    inserted_at: Instant,
    ttl: Duration,
}

impl<R> CacheEntry<R> {
    /// Fresh iff `now - inserted_at < ttl`.
    #[must_use]
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) < self.ttl
    }
}

/// Key -> (value, insertion time) map with per-entry TTL.
#[derive(Debug)]
pub struct ResultCache<R> {
    entries: HashMap<String, CacheEntry<R>>,
}

impl<R> Default for ResultCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ResultCache<R> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Look up a key, returning the value only while the entry is fresh.
    /// Stale entries are left in place for the next insert to overwrite.
    #[must_use]
    pub fn get_fresh(&self, key: &str, now: Instant) -> Option<&R> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| &entry.value)
    }

    /// Insert or overwrite a value under `key` with the given TTL.
    pub fn insert(&mut self, key: String, value: R, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Number of stored entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all stored keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        tracing::debug!("result cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_hit_within_ttl() {
        let mut cache = ResultCache::new();
        cache.insert("k".into(), 42u32, Duration::from_millis(100));
        assert_eq!(cache.get_fresh("k", Instant::now()), Some(&42));
    }

    #[test]
    fn test_stale_after_ttl() {
        let mut cache = ResultCache::new();
        cache.insert("k".into(), 42u32, Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get_fresh("k", Instant::now()), None);
        // Entry remains until overwritten; only freshness is gone.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_refreshes() {
        let mut cache = ResultCache::new();
        cache.insert("k".into(), 1u32, Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get_fresh("k", Instant::now()).is_none());
        cache.insert("k".into(), 2, Duration::from_millis(100));
        assert_eq!(cache.get_fresh("k", Instant::now()), Some(&2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_and_keys() {
        let mut cache = ResultCache::new();
        cache.insert("a".into(), 1u32, Duration::from_secs(1));
        cache.insert("b".into(), 2, Duration::from_secs(1));
        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache: ResultCache<u32> = ResultCache::new();
        assert!(cache.get_fresh("missing", Instant::now()).is_none());
    }
}
