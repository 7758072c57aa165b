//! Remote hierarchy resolution
//!
//! - `HierarchyResolver`: parent lookup with kind probing, ancestry walks
//! - `HierarchyCache`: TTL cache of parent pointers owned by the resolver

mod cache;
mod resolver;

pub use cache::{CacheEntry, HierarchyCache, DEFAULT_CACHE_TTL};
pub use resolver::{HierarchyResolver, DEFAULT_MAX_DEPTH, PROBE_ORDER};

use crate::ids::ResourceId;

/// Immediate parent of a resource; `None` for a workspace root or a
/// resource that could not be retrieved
pub type ParentPointer = Option<ResourceId>;
