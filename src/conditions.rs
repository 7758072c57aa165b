//! Property conditions on write operations
//!
//! A condition is checked against a live property value fetched from the
//! store. Anything that prevents a clean comparison (missing property,
//! wrong type, failed fetch) counts as the condition not holding.

use std::sync::Arc;

use crate::ids::{ids_equal, ResourceId};
use crate::rules::{Condition, ConditionValue};
use crate::store::{PropertyValue, ResourceStore};

/// Evaluates rule conditions against page properties
pub struct ConditionEvaluator {
    store: Arc<dyn ResourceStore>,
}

impl ConditionEvaluator {
    /// Create an evaluator reading from `store`
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Whether `condition` holds on `target`
    pub async fn evaluate(&self, condition: &Condition, target: &ResourceId) -> bool {
        let value = match self.store.fetch_property(target, &condition.property).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!(
                    "[ConditionEvaluator] {} has no property '{}'",
                    target,
                    condition.property
                );
                return false;
            }
            Err(e) => {
                tracing::warn!(
                    "[ConditionEvaluator] Could not read '{}' on {}: {}",
                    condition.property,
                    target,
                    e
                );
                return false;
            }
        };

        if !value.has_type(condition.condition_type) {
            tracing::debug!(
                "[ConditionEvaluator] '{}' on {} is {}, expected {}",
                condition.property,
                target,
                value.type_name(),
                condition.condition_type
            );
            return false;
        }

        matches_value(&value, &condition.expected)
    }
}

/// Compare a fetched value with the expected one; types already agree
fn matches_value(value: &PropertyValue, expected: &ConditionValue) -> bool {
    match (value, expected) {
        (PropertyValue::People(ids), ConditionValue::Text(user)) => {
            ids.iter().any(|id| ids_equal(id, user))
        }
        (PropertyValue::Select(name) | PropertyValue::Status(name), ConditionValue::Text(want)) => {
            name.as_deref() == Some(want.as_str())
        }
        (PropertyValue::MultiSelect(names), ConditionValue::Text(want)) => {
            names.iter().any(|name| name == want)
        }
        (PropertyValue::Checkbox(checked), ConditionValue::Bool(want)) => checked == want,
        _ => false,
    }
}
