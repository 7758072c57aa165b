//! First-match rule selection
//!
//! Rules are tried in declared order and the first one whose scope contains
//! the resource is returned. Rules are never merged.
//!
//! - Page scope: the page itself or any descendant within the depth bound
//! - Database scope: the database itself or a resource whose *immediate*
//!   parent is the database (one hop only)

use std::sync::Arc;

use super::types::{Rule, Scope};
use crate::hierarchy::HierarchyResolver;
use crate::ids::ResourceId;

/// Finds the rule governing a resource
pub struct RuleMatcher {
    resolver: Arc<HierarchyResolver>,
    max_depth: usize,
}

impl RuleMatcher {
    /// Create a matcher walking at most `max_depth` parents for page scopes
    pub fn new(resolver: Arc<HierarchyResolver>, max_depth: usize) -> Self {
        Self {
            resolver,
            max_depth,
        }
    }

    /// First rule in `rules` whose scope contains `id`
    pub async fn find_matching_rule<'r>(
        &self,
        id: &ResourceId,
        rules: &'r [Rule],
    ) -> Option<&'r Rule> {
        for rule in rules {
            if self.rule_matches(id, rule).await {
                tracing::debug!("[RuleMatcher] {} matched rule '{}'", id, rule.name);
                return Some(rule);
            }
        }

        tracing::debug!("[RuleMatcher] No rule matched {}", id);
        None
    }

    async fn rule_matches(&self, id: &ResourceId, rule: &Rule) -> bool {
        let Some(scope) = rule.scope() else {
            tracing::warn!(
                "[RuleMatcher] Skipping rule '{}': it must name exactly one page or database",
                rule.name
            );
            return false;
        };

        match scope {
            Scope::Page(page_id) => {
                self.resolver
                    .is_descendant_of(id, &page_id, self.max_depth)
                    .await
            }
            Scope::Database(database_id) => {
                if *id == database_id {
                    return true;
                }
                self.resolver.get_parent(id).await.as_ref() == Some(&database_id)
            }
        }
    }
}
