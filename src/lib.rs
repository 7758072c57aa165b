pub mod core;
pub mod ids;
pub mod rules;
pub mod store;

// Evaluation components
pub mod conditions;
pub mod hierarchy;
pub mod permissions;

// Optional components
pub mod logging;

pub use crate::core::{GuardError, GuardResult};
pub use ids::ResourceId;
pub use permissions::{EngineConfig, PermissionDecision, PermissionEngine};
pub use rules::{DefaultPolicy, Permission, Rule, RuleSet};
