//! Parent lookup and ancestry walks

use std::sync::Arc;
use std::time::Duration;

use super::cache::HierarchyCache;
use super::ParentPointer;
use crate::ids::ResourceId;
use crate::rules::ResourceKind;
use crate::store::ResourceStore;

/// Default bound on ancestry walks
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Kinds tried, in order, when the kind of an id is unknown
pub const PROBE_ORDER: [ResourceKind; 3] =
    [ResourceKind::Page, ResourceKind::Block, ResourceKind::Database];

/// Resolves parents through the store, caching every answer
pub struct HierarchyResolver {
    store: Arc<dyn ResourceStore>,
    cache: HierarchyCache,
}

impl HierarchyResolver {
    /// Create a resolver with its own cache
    pub fn new(store: Arc<dyn ResourceStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: HierarchyCache::new(cache_ttl),
        }
    }

    /// The resolver's cache
    pub fn cache(&self) -> &HierarchyCache {
        &self.cache
    }

    /// Immediate parent of `id`
    ///
    /// Served from the cache while the entry is live. Otherwise the id is
    /// probed as a page, then a block, then a database; the first kind the
    /// store retrieves decides the answer. When every probe fails the
    /// resource is treated as parentless, and that answer is cached too.
    pub async fn get_parent(&self, id: &ResourceId) -> ParentPointer {
        if let Some(cached) = self.cache.get(id).await {
            tracing::trace!("[HierarchyResolver] Cache hit for {}", id);
            return cached;
        }

        let resolved = self.probe(id).await;
        self.cache.put(id, resolved.clone()).await;
        resolved
    }

    async fn probe(&self, id: &ResourceId) -> ParentPointer {
        for kind in PROBE_ORDER {
            match self.store.fetch_parent(kind, id).await {
                Ok(parent) => {
                    let resolved = parent.into_resource_id();
                    tracing::debug!(
                        "[HierarchyResolver] {} resolved as {} with parent {:?}",
                        id,
                        kind,
                        resolved.as_ref().map(ResourceId::as_str)
                    );
                    return resolved;
                }
                Err(e) => {
                    tracing::debug!("[HierarchyResolver] {} is not a readable {}: {}", id, kind, e);
                }
            }
        }

        tracing::warn!(
            "[HierarchyResolver] No parent found for {} via '{}'; treating as root",
            id,
            self.store.name()
        );
        None
    }

    /// Whether `id` is `ancestor` or sits below it within `max_depth` hops
    ///
    /// Running out of hops answers `false`.
    pub async fn is_descendant_of(
        &self,
        id: &ResourceId,
        ancestor: &ResourceId,
        max_depth: usize,
    ) -> bool {
        if id == ancestor {
            return true;
        }

        let mut current = id.clone();
        for _ in 0..max_depth {
            match self.get_parent(&current).await {
                Some(parent) if parent == *ancestor => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }

        tracing::warn!(
            "[HierarchyResolver] Depth limit {} reached walking from {} towards {}",
            max_depth,
            id,
            ancestor
        );
        false
    }

    /// Discard every cached parent
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}
