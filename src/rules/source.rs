//! Rule file loading
//!
//! Reads the JSON rule document and validates every rule before the
//! engine ever sees it:
//!
//! ```json
//! {
//!   "defaultPolicy": "allow_read",
//!   "rules": [
//!     { "name": "docs", "pageId": "...", "permissions": ["page:read"] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::types::{
    Condition, ConditionType, ConditionValue, DefaultPolicy, Permission, Rule, RuleSet,
};
use crate::core::{GuardError, GuardResult};
use crate::ids::ResourceId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRuleSet {
    #[serde(default)]
    default_policy: DefaultPolicy,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    #[serde(default)]
    name: String,
    page_id: Option<String>,
    database_id: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
    condition: Option<Condition>,
}

impl RawRule {
    fn validate(self, index: usize) -> GuardResult<Rule> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(GuardError::invalid_rule(index, "<unnamed>", "name is empty"));
        }

        let non_blank = |id: Option<String>| id.filter(|s| !s.trim().is_empty());
        let page_id = non_blank(self.page_id);
        let database_id = non_blank(self.database_id);
        if page_id.is_some() == database_id.is_some() {
            return Err(GuardError::invalid_rule(
                index,
                name,
                "exactly one of pageId or databaseId must be set",
            ));
        }

        if self.permissions.is_empty() {
            return Err(GuardError::invalid_rule(index, name, "no permissions granted"));
        }

        let mut permissions = Vec::with_capacity(self.permissions.len());
        for raw in &self.permissions {
            let permission: Permission = raw.parse().map_err(|_| {
                GuardError::invalid_rule(index, &name, format!("unknown permission '{raw}'"))
            })?;
            if !permissions.contains(&permission) {
                permissions.push(permission);
            }
        }

        if let Some(condition) = &self.condition {
            if condition.property.trim().is_empty() {
                return Err(GuardError::invalid_rule(index, name, "condition property is empty"));
            }
            check_condition_value(condition).map_err(|reason| {
                GuardError::invalid_rule(index, &name, reason)
            })?;
        }

        Ok(Rule {
            name,
            page_id: page_id.map(ResourceId::new),
            database_id: database_id.map(ResourceId::new),
            permissions,
            condition: self.condition,
        })
    }
}

/// Checkbox conditions need a boolean, every other type a non-empty string
fn check_condition_value(condition: &Condition) -> Result<(), String> {
    match (condition.condition_type, &condition.expected) {
        (ConditionType::Checkbox, ConditionValue::Bool(_)) => Ok(()),
        (ConditionType::Checkbox, ConditionValue::Text(_)) => {
            Err("checkbox condition value must be true or false".to_string())
        }
        (_, ConditionValue::Text(text)) if !text.trim().is_empty() => Ok(()),
        (other, _) => Err(format!("{other} condition value must be a non-empty string")),
    }
}

impl RuleSet {
    /// Parse and validate a JSON rule document
    pub fn from_json_str(json: &str) -> GuardResult<Self> {
        let raw: RawRuleSet = serde_json::from_str(json)?;

        let rules = raw
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| rule.validate(index))
            .collect::<GuardResult<Vec<_>>>()?;

        tracing::info!(
            "Loaded {} rules (default policy: {:?})",
            rules.len(),
            raw.default_policy
        );

        Ok(RuleSet::new(rules, raw.default_policy))
    }

    /// Load and validate a JSON rule file
    pub fn load(path: impl AsRef<Path>) -> GuardResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading rules from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
