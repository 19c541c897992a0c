// persistence-rs/src/cache.rs
// Short-lived read cache in front of the rule and persona stores.
// Writers invalidate explicitly; the TTL only bounds staleness from other writers.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone())
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry whose key matches `predicate`.
    pub fn invalidate_where<F>(&self, predicate: F)
    where
        F: Fn(&str) -> bool,
    {
        self.entries.retain(|key, _| !predicate(key));
    }

    /// Drop every entry older than the TTL, read or not.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("generic:*", 1u8);
        assert_eq!(cache.get("generic:*"), Some(1));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("generic:*"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_drops_unread_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("old", 1u8);
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.insert("new", 2u8);

        tokio::time::advance(Duration::from_secs(31)).await;
        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("new"), Some(2));
    }

    #[test]
    fn test_invalidate_where_is_selective() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("finance:*", 1u8);
        cache.insert("finance:trading", 2u8);
        cache.insert("legal:*", 3u8);

        cache.invalidate_where(|key| key.starts_with("finance:"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("legal:*"), Some(3));

        cache.invalidate("legal:*");
        assert!(cache.is_empty());
    }
}
