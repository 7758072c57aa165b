//! Parent pointers and property values as the store reports them

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::StoreError;
use crate::ids::ResourceId;
use crate::rules::ConditionType;

/// Parent of a resource, tagged by the kind of parent
///
/// Pages, blocks and databases all report parentage in this shape; the
/// resolver collapses it to an optional id before comparing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parent {
    #[serde(rename = "page_id")]
    Page { page_id: ResourceId },
    #[serde(rename = "database_id")]
    Database { database_id: ResourceId },
    #[serde(rename = "data_source_id")]
    DataSource {
        data_source_id: ResourceId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database_id: Option<ResourceId>,
    },
    #[serde(rename = "block_id")]
    Block { block_id: ResourceId },
    #[serde(rename = "workspace")]
    Workspace {
        #[serde(default)]
        workspace: bool,
    },
    #[serde(other)]
    Unknown,
}

impl Parent {
    /// Parent page
    pub fn page(id: impl Into<ResourceId>) -> Self {
        Parent::Page { page_id: id.into() }
    }

    /// Parent database
    pub fn database(id: impl Into<ResourceId>) -> Self {
        Parent::Database {
            database_id: id.into(),
        }
    }

    /// Parent block
    pub fn block(id: impl Into<ResourceId>) -> Self {
        Parent::Block { block_id: id.into() }
    }

    /// Top of the tree
    pub fn workspace() -> Self {
        Parent::Workspace { workspace: true }
    }

    /// Collapse to the parent's id; `None` at the workspace root
    ///
    /// A data source counts as its owning database when the store reports
    /// one.
    pub fn into_resource_id(self) -> Option<ResourceId> {
        match self {
            Parent::Page { page_id } => Some(page_id),
            Parent::Database { database_id } => Some(database_id),
            Parent::DataSource {
                data_source_id,
                database_id,
            } => Some(database_id.unwrap_or(data_source_id)),
            Parent::Block { block_id } => Some(block_id),
            Parent::Workspace { .. } | Parent::Unknown => None,
        }
    }
}

/// Value of a page property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// User ids
    People(Vec<String>),
    /// Selected option name, if any
    Select(Option<String>),
    /// Selected option names
    MultiSelect(Vec<String>),
    /// Current status name, if any
    Status(Option<String>),
    Checkbox(bool),
    /// Any property type conditions cannot test
    Other(String),
}

impl PropertyValue {
    /// Whether the value has the type a condition expects
    pub fn has_type(&self, expected: ConditionType) -> bool {
        matches!(
            (self, expected),
            (PropertyValue::People(_), ConditionType::People)
                | (PropertyValue::Select(_), ConditionType::Select)
                | (PropertyValue::MultiSelect(_), ConditionType::MultiSelect)
                | (PropertyValue::Status(_), ConditionType::Status)
                | (PropertyValue::Checkbox(_), ConditionType::Checkbox)
        )
    }

    /// Type name as the store spells it
    pub fn type_name(&self) -> &str {
        match self {
            PropertyValue::People(_) => "people",
            PropertyValue::Select(_) => "select",
            PropertyValue::MultiSelect(_) => "multi_select",
            PropertyValue::Status(_) => "status",
            PropertyValue::Checkbox(_) => "checkbox",
            PropertyValue::Other(name) => name,
        }
    }

    /// Decode a Notion property object (`{"type": "...", "<type>": ...}`)
    pub fn from_notion(value: &Value) -> Result<Self, StoreError> {
        let property_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::decode("property has no type"))?;
        let body = value.get(property_type).unwrap_or(&Value::Null);

        let decoded = match property_type {
            "people" => PropertyValue::People(collect_field(body, "id", property_type)?),
            "select" => PropertyValue::Select(option_name(body, property_type)?),
            "multi_select" => {
                PropertyValue::MultiSelect(collect_field(body, "name", property_type)?)
            }
            "status" => PropertyValue::Status(option_name(body, property_type)?),
            "checkbox" => PropertyValue::Checkbox(
                body.as_bool()
                    .ok_or_else(|| StoreError::decode("checkbox value is not a boolean"))?,
            ),
            other => PropertyValue::Other(other.to_string()),
        };

        Ok(decoded)
    }
}

fn collect_field(
    body: &Value,
    field: &str,
    property_type: &str,
) -> Result<Vec<String>, StoreError> {
    let items = body
        .as_array()
        .ok_or_else(|| StoreError::decode(format!("{property_type} value is not an array")))?;

    Ok(items
        .iter()
        .filter_map(|item| item.get(field).and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

fn option_name(body: &Value, property_type: &str) -> Result<Option<String>, StoreError> {
    match body {
        Value::Null => Ok(None),
        Value::Object(_) => Ok(body.get("name").and_then(Value::as_str).map(str::to_string)),
        _ => Err(StoreError::decode(format!("{property_type} value is not an object"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parent_shapes_collapse() {
        let cases = [
            (json!({"type": "page_id", "page_id": "P1"}), Some("P1")),
            (json!({"type": "database_id", "database_id": "D1"}), Some("D1")),
            (json!({"type": "block_id", "block_id": "B1"}), Some("B1")),
            (
                json!({"type": "data_source_id", "data_source_id": "S1", "database_id": "D1"}),
                Some("D1"),
            ),
            (json!({"type": "workspace", "workspace": true}), None),
            (json!({"type": "teamspace_id", "teamspace_id": "T1"}), None),
        ];

        for (json, expected) in cases {
            let parent: Parent = serde_json::from_value(json).unwrap();
            assert_eq!(parent.into_resource_id(), expected.map(ResourceId::new));
        }
    }

    #[test]
    fn test_decode_people() {
        let value = json!({
            "id": "abc",
            "type": "people",
            "people": [{"object": "user", "id": "U1"}, {"object": "user", "id": "U2"}]
        });
        assert_eq!(
            PropertyValue::from_notion(&value).unwrap(),
            PropertyValue::People(vec!["U1".into(), "U2".into()])
        );
    }

    #[test]
    fn test_decode_options() {
        let select = json!({"type": "select", "select": {"id": "x", "name": "High"}});
        assert_eq!(
            PropertyValue::from_notion(&select).unwrap(),
            PropertyValue::Select(Some("High".into()))
        );

        let empty = json!({"type": "status", "status": null});
        assert_eq!(PropertyValue::from_notion(&empty).unwrap(), PropertyValue::Status(None));

        let multi = json!({"type": "multi_select", "multi_select": [{"name": "a"}, {"name": "b"}]});
        assert_eq!(
            PropertyValue::from_notion(&multi).unwrap(),
            PropertyValue::MultiSelect(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_decode_checkbox_and_other() {
        let checkbox = json!({"type": "checkbox", "checkbox": true});
        assert_eq!(PropertyValue::from_notion(&checkbox).unwrap(), PropertyValue::Checkbox(true));

        let title = json!({"type": "title", "title": []});
        let decoded = PropertyValue::from_notion(&title).unwrap();
        assert_eq!(decoded.type_name(), "title");
        assert!(!decoded.has_type(ConditionType::Select));

        let broken = json!({"type": "checkbox", "checkbox": "yes"});
        assert!(matches!(PropertyValue::from_notion(&broken), Err(StoreError::Decode(_))));
    }
}
