//! Permission decision engine
//!
//! Ties rule matching, permission lookup and condition checks together:
//!
//! 1. No rule matches: the default policy decides (reads only, at best)
//! 2. Matched rule lacks the operation: deny
//! 3. Write operation on a rule with a condition: the condition decides
//! 4. Otherwise: allow

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

use super::config::EngineConfig;
use crate::conditions::ConditionEvaluator;
use crate::core::{GuardError, GuardResult};
use crate::hierarchy::HierarchyResolver;
use crate::ids::ResourceId;
use crate::rules::{DefaultPolicy, Permission, Rule, RuleMatcher, RuleSet};
use crate::store::ResourceStore;

/// Machine-readable outcome of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCode {
    /// No rule matched; default policy allows reads
    DefaultRead,
    /// No rule matched; default policy denies
    DefaultDeny,
    /// Matched rule does not grant the operation
    NotGranted,
    /// Matched rule's condition does not hold
    ConditionUnmet,
    /// Matched rule grants the operation
    Granted,
}

/// Result of one permission check
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDecision {
    pub allowed: bool,
    pub matched_rule: Option<Rule>,
    pub code: DecisionCode,
    pub reason: String,
    pub decided_at: DateTime<Utc>,
}

impl PermissionDecision {
    fn new(allowed: bool, matched_rule: Option<&Rule>, code: DecisionCode, reason: String) -> Self {
        Self {
            allowed,
            matched_rule: matched_rule.cloned(),
            code,
            reason,
            decided_at: Utc::now(),
        }
    }

    /// Name of the matched rule, if any
    pub fn rule_name(&self) -> Option<&str> {
        self.matched_rule.as_ref().map(|r| r.name.as_str())
    }

    /// Turn a denial into `GuardError::PermissionDenied`
    pub fn into_result(self) -> GuardResult<Self> {
        if self.allowed {
            Ok(self)
        } else {
            Err(GuardError::PermissionDenied(self.reason))
        }
    }
}

/// One request for `decide_many`
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    pub resource_id: ResourceId,
    pub operation: Permission,
    pub condition_target: Option<ResourceId>,
}

impl DecisionRequest {
    /// Create a request without a separate condition target
    pub fn new(resource_id: impl Into<ResourceId>, operation: Permission) -> Self {
        Self {
            resource_id: resource_id.into(),
            operation,
            condition_target: None,
        }
    }

    /// Evaluate conditions against another resource
    pub fn with_condition_target(mut self, target: impl Into<ResourceId>) -> Self {
        self.condition_target = Some(target.into());
        self
    }
}

/// Decides whether operations on remote resources are allowed
///
/// The rule set is fixed for the engine's lifetime. The hierarchy cache
/// belongs to this engine alone, so separate engines never share state.
pub struct PermissionEngine {
    rules: RuleSet,
    resolver: Arc<HierarchyResolver>,
    matcher: RuleMatcher,
    conditions: ConditionEvaluator,
}

impl PermissionEngine {
    /// Create an engine with default configuration
    pub fn new(rules: RuleSet, store: Arc<dyn ResourceStore>) -> Self {
        Self::with_config(rules, store, EngineConfig::default())
    }

    /// Create an engine with explicit configuration
    pub fn with_config(
        rules: RuleSet,
        store: Arc<dyn ResourceStore>,
        config: EngineConfig,
    ) -> Self {
        tracing::info!(
            "[PermissionEngine] {} rules, default {:?}, cache TTL {}s, max depth {}, store '{}'",
            rules.len(),
            rules.default_policy,
            config.cache_ttl_secs,
            config.max_depth,
            store.name()
        );

        let resolver = Arc::new(HierarchyResolver::new(store.clone(), config.cache_ttl()));
        Self {
            rules,
            matcher: RuleMatcher::new(resolver.clone(), config.max_depth),
            conditions: ConditionEvaluator::new(store),
            resolver,
        }
    }

    /// The rule set in force
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The engine's hierarchy resolver
    pub fn resolver(&self) -> &HierarchyResolver {
        &self.resolver
    }

    /// Decide whether `operation` on `resource_id` is allowed
    ///
    /// Conditions are evaluated against `condition_target` when given, and
    /// against `resource_id` otherwise. For `page:create` and similar the
    /// caller decides which resource that is; the new resource does not
    /// exist yet, so the parent is usually the only meaningful target.
    pub async fn decide(
        &self,
        resource_id: &ResourceId,
        operation: Permission,
        condition_target: Option<&ResourceId>,
    ) -> PermissionDecision {
        let decision = self.evaluate(resource_id, operation, condition_target).await;

        tracing::info!(
            "[PermissionEngine] {} {} on {} (rule: {}, code: {:?}): {}",
            if decision.allowed { "ALLOW" } else { "DENY" },
            operation,
            resource_id,
            decision.rule_name().unwrap_or("-"),
            decision.code,
            decision.reason
        );

        decision
    }

    async fn evaluate(
        &self,
        resource_id: &ResourceId,
        operation: Permission,
        condition_target: Option<&ResourceId>,
    ) -> PermissionDecision {
        let Some(rule) = self
            .matcher
            .find_matching_rule(resource_id, &self.rules.rules)
            .await
        else {
            return self.default_decision(operation);
        };

        if !rule.grants(operation) {
            return PermissionDecision::new(
                false,
                Some(rule),
                DecisionCode::NotGranted,
                format!("rule '{}' does not grant {}", rule.name, operation),
            );
        }

        if operation.is_write() {
            if let Some(condition) = &rule.condition {
                let target = condition_target.unwrap_or(resource_id);
                if !self.conditions.evaluate(condition, target).await {
                    return PermissionDecision::new(
                        false,
                        Some(rule),
                        DecisionCode::ConditionUnmet,
                        format!(
                            "rule '{}' condition not met on {}: {} must be {}",
                            rule.name, target, condition.property, condition.expected
                        ),
                    );
                }
            }
        }

        PermissionDecision::new(
            true,
            Some(rule),
            DecisionCode::Granted,
            format!("allowed by rule '{}'", rule.name),
        )
    }

    fn default_decision(&self, operation: Permission) -> PermissionDecision {
        if self.rules.default_policy == DefaultPolicy::AllowRead && operation.is_read() {
            PermissionDecision::new(
                true,
                None,
                DecisionCode::DefaultRead,
                "default read".to_string(),
            )
        } else {
            PermissionDecision::new(
                false,
                None,
                DecisionCode::DefaultDeny,
                "no matching rule, default deny".to_string(),
            )
        }
    }

    /// Decide several independent requests concurrently
    ///
    /// Results come back in request order. All requests share this engine's
    /// cache.
    pub async fn decide_many(&self, requests: &[DecisionRequest]) -> Vec<PermissionDecision> {
        join_all(requests.iter().map(|request| {
            self.decide(
                &request.resource_id,
                request.operation,
                request.condition_target.as_ref(),
            )
        }))
        .await
    }

    /// Discard every cached parent pointer
    pub async fn clear_cache(&self) {
        tracing::info!("[PermissionEngine] Clearing hierarchy cache");
        self.resolver.clear_cache().await;
    }
}
