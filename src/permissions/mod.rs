//! Permission decisions for remote resource operations
//!
//! `PermissionEngine` is the entry point for the command layer: it is built
//! from a `RuleSet` and a `ResourceStore`, and answers one question per
//! call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use notion_guard::permissions::PermissionEngine;
//! use notion_guard::rules::{Permission, RuleSet};
//! use notion_guard::store::NotionStore;
//! use std::sync::Arc;
//!
//! let rules = RuleSet::load(".notion-guard.json")?;
//! let engine = PermissionEngine::new(rules, Arc::new(NotionStore::from_env()?));
//!
//! let decision = engine.decide(&page_id, Permission::PageUpdate, None).await;
//! if !decision.allowed {
//!     eprintln!("{}", decision.reason);
//! }
//! ```

mod config;
mod engine;

pub use config::EngineConfig;
pub use engine::{DecisionCode, DecisionRequest, PermissionDecision, PermissionEngine};
