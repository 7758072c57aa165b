//! In-memory resource store
//!
//! Holds a fixed tree of resources and counts every remote-style call, so
//! cache behaviour and probe order can be observed from tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Parent, PropertyValue, ResourceStore, StoreError};
use crate::ids::ResourceId;
use crate::rules::ResourceKind;

/// Resource tree held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    resources: HashMap<String, (ResourceKind, Parent)>,
    properties: HashMap<(String, String), PropertyValue>,
    unreachable: HashSet<String>,
    parent_calls: AtomicUsize,
    property_calls: AtomicUsize,
    probes: Mutex<Vec<(ResourceKind, String)>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource of any kind
    pub fn with_resource(
        mut self,
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        parent: Parent,
    ) -> Self {
        let id = id.into();
        self.resources.insert(id.key().to_string(), (kind, parent));
        self
    }

    /// Add a page
    pub fn with_page(self, id: impl Into<ResourceId>, parent: Parent) -> Self {
        self.with_resource(ResourceKind::Page, id, parent)
    }

    /// Add a block
    pub fn with_block(self, id: impl Into<ResourceId>, parent: Parent) -> Self {
        self.with_resource(ResourceKind::Block, id, parent)
    }

    /// Add a database
    pub fn with_database(self, id: impl Into<ResourceId>, parent: Parent) -> Self {
        self.with_resource(ResourceKind::Database, id, parent)
    }

    /// Set a property on a page
    pub fn with_property(
        mut self,
        page_id: impl Into<ResourceId>,
        name: impl Into<String>,
        value: PropertyValue,
    ) -> Self {
        let page_id = page_id.into();
        self.properties
            .insert((page_id.key().to_string(), name.into()), value);
        self
    }

    /// Make every call touching this id fail with an HTTP 502
    pub fn with_unreachable(mut self, id: impl Into<ResourceId>) -> Self {
        self.unreachable.insert(id.into().key().to_string());
        self
    }

    /// Number of `fetch_parent` calls so far
    pub fn parent_calls(&self) -> usize {
        self.parent_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_property` calls so far
    pub fn property_calls(&self) -> usize {
        self.property_calls.load(Ordering::SeqCst)
    }

    /// Every parent probe issued, in order
    pub async fn probes(&self) -> Vec<(ResourceKind, String)> {
        self.probes.lock().await.clone()
    }

    fn check_reachable(&self, id: &ResourceId) -> Result<(), StoreError> {
        if self.unreachable.contains(id.key()) {
            return Err(StoreError::Http {
                status: 502,
                body: format!("{id} unreachable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn fetch_parent(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Parent, StoreError> {
        self.parent_calls.fetch_add(1, Ordering::SeqCst);
        self.probes.lock().await.push((kind, id.key().to_string()));
        self.check_reachable(id)?;

        match self.resources.get(id.key()) {
            Some((stored_kind, parent)) if *stored_kind == kind => Ok(parent.clone()),
            _ => Err(StoreError::NotFound(format!("{kind} {id}"))),
        }
    }

    async fn fetch_property(
        &self,
        page_id: &ResourceId,
        property: &str,
    ) -> Result<Option<PropertyValue>, StoreError> {
        self.property_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable(page_id)?;

        match self.resources.get(page_id.key()) {
            Some((ResourceKind::Page, _)) => Ok(self
                .properties
                .get(&(page_id.key().to_string(), property.to_string()))
                .cloned()),
            _ => Err(StoreError::NotFound(format!("page {page_id}"))),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}
