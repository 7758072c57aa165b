//! Access rules
//!
//! - `types`: rules, scopes, the operation vocabulary and conditions
//! - `source`: JSON rule file loading and validation
//! - `matcher`: first-match scope resolution against the remote hierarchy
//!
//! ## Example
//!
//! ```rust,ignore
//! use notion_guard::rules::{Permission, Rule, RuleSet, DefaultPolicy};
//!
//! let rules = RuleSet::new(
//!     vec![Rule::page("docs", "P1", [Permission::PageRead, Permission::BlockRead])],
//!     DefaultPolicy::Deny,
//! );
//! ```

mod matcher;
mod source;
mod types;

pub use matcher::RuleMatcher;
pub use types::{
    Condition, ConditionType, ConditionValue, DefaultPolicy, Permission, ResourceKind, Rule,
    RuleSet, Scope,
};
