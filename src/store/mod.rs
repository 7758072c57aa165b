//! Remote resource store
//!
//! The engine only ever asks the store two things: who is the parent of a
//! resource (given a guess at its kind), and what value a named property
//! has on a page. Everything else about the remote API lives behind this
//! trait.
//!
//! - `NotionStore`: the Notion REST API over `reqwest`
//! - `MemoryStore`: in-process tree with call counting, for tests and demos

mod error;
mod memory;
mod notion;
mod types;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use notion::{NotionStore, NotionStoreConfig};
pub use types::{Parent, PropertyValue};

use async_trait::async_trait;

use crate::ids::ResourceId;
use crate::rules::ResourceKind;

/// Source of parent pointers and page properties
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Retrieve `id` as a resource of `kind` and report its parent
    ///
    /// Any error means the probe failed; the resolver moves on to the next
    /// kind.
    async fn fetch_parent(&self, kind: ResourceKind, id: &ResourceId)
        -> Result<Parent, StoreError>;

    /// Read a property from a page
    ///
    /// `Ok(None)` means the page exists but has no property by that name.
    async fn fetch_property(
        &self,
        page_id: &ResourceId,
        property: &str,
    ) -> Result<Option<PropertyValue>, StoreError>;

    /// Store name for logging and debugging
    fn name(&self) -> &str;
}
