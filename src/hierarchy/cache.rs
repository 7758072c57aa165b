//! Time-bounded parent cache
//!
//! Maps normalized resource ids to the parent pointer last seen for them.
//! Expired entries are never served. Concurrent misses for the same id may
//! both hit the store and both write; the last write wins.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::ParentPointer;
use crate::ids::ResourceId;

/// Default lifetime of a cached parent pointer
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// A cached parent pointer and when it stops being trusted
///
/// `expires_at` is `None` when the TTL runs past what `Instant` can
/// represent; such entries never expire.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: ParentPointer,
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// Parent cache owned by one resolver
#[derive(Debug)]
pub struct HierarchyCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl HierarchyCache {
    /// Create a cache with the given entry lifetime
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Entry lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live entry for `id`, if any
    pub async fn get(&self, id: &ResourceId) -> Option<ParentPointer> {
        let entries = self.entries.read().await;
        entries
            .get(id.key())
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Record the parent of `id`, expiring one TTL from now
    pub async fn put(&self, id: &ResourceId, value: ParentPointer) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now().checked_add(self.ttl),
        };
        self.entries.write().await.insert(id.key().to_string(), entry);
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        tracing::debug!("[HierarchyCache] Cleared {} entries", dropped);
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of stored entries, live or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for HierarchyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = HierarchyCache::default();
        let id = ResourceId::new("B-1");

        assert_eq!(cache.get(&id).await, None);
        cache.put(&id, Some(ResourceId::new("P1"))).await;

        // Lookup goes through the normalized key
        assert_eq!(
            cache.get(&ResourceId::new("b1")).await,
            Some(Some(ResourceId::new("P1")))
        );
    }

    #[tokio::test]
    async fn test_root_is_cached() {
        let cache = HierarchyCache::default();
        let id = ResourceId::new("P1");
        cache.put(&id, None).await;
        assert_eq!(cache.get(&id).await, Some(None));
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_served() {
        let cache = HierarchyCache::new(Duration::ZERO);
        let id = ResourceId::new("P1");
        cache.put(&id, Some(ResourceId::new("P0"))).await;

        assert_eq!(cache.get(&id).await, None);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_unbounded_ttl_never_expires() {
        let cache = HierarchyCache::new(Duration::MAX);
        let id = ResourceId::new("P2");
        cache.put(&id, Some(ResourceId::new("P1"))).await;

        assert_eq!(cache.get(&id).await, Some(Some(ResourceId::new("P1"))));
        assert_eq!(cache.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = HierarchyCache::default();
        cache.put(&ResourceId::new("A"), None).await;
        cache.put(&ResourceId::new("B"), None).await;
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
