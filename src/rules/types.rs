//! Rule data model
//!
//! Rules are kept in the order they were configured: the first rule whose
//! scope contains a resource is the only one consulted for it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::GuardError;
use crate::ids::ResourceId;

/// Kind of remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Page,
    Database,
    Block,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Page => write!(f, "page"),
            ResourceKind::Database => write!(f, "database"),
            ResourceKind::Block => write!(f, "block"),
        }
    }
}

/// One operation in the `kind:action` vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "page:read")]
    PageRead,
    #[serde(rename = "page:update")]
    PageUpdate,
    #[serde(rename = "page:create")]
    PageCreate,
    #[serde(rename = "database:read")]
    DatabaseRead,
    #[serde(rename = "database:query")]
    DatabaseQuery,
    #[serde(rename = "database:create")]
    DatabaseCreate,
    #[serde(rename = "block:read")]
    BlockRead,
    #[serde(rename = "block:append")]
    BlockAppend,
    #[serde(rename = "block:delete")]
    BlockDelete,
}

impl Permission {
    /// Every operation the guard knows about
    pub const ALL: [Permission; 9] = [
        Permission::PageRead,
        Permission::PageUpdate,
        Permission::PageCreate,
        Permission::DatabaseRead,
        Permission::DatabaseQuery,
        Permission::DatabaseCreate,
        Permission::BlockRead,
        Permission::BlockAppend,
        Permission::BlockDelete,
    ];

    /// The `kind:action` spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::PageRead => "page:read",
            Permission::PageUpdate => "page:update",
            Permission::PageCreate => "page:create",
            Permission::DatabaseRead => "database:read",
            Permission::DatabaseQuery => "database:query",
            Permission::DatabaseCreate => "database:create",
            Permission::BlockRead => "block:read",
            Permission::BlockAppend => "block:append",
            Permission::BlockDelete => "block:delete",
        }
    }

    /// Operations without side effects
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Permission::PageRead
                | Permission::DatabaseRead
                | Permission::DatabaseQuery
                | Permission::BlockRead
        )
    }

    /// Operations with side effects; these are the ones conditions gate
    pub fn is_write(self) -> bool {
        !self.is_read()
    }

    /// Resource kind the operation acts on
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            Permission::PageRead | Permission::PageUpdate | Permission::PageCreate => {
                ResourceKind::Page
            }
            Permission::DatabaseRead | Permission::DatabaseQuery | Permission::DatabaseCreate => {
                ResourceKind::Database
            }
            Permission::BlockRead | Permission::BlockAppend | Permission::BlockDelete => {
                ResourceKind::Block
            }
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| GuardError::UnknownOperation(wanted.to_string()))
    }
}

/// Property types a condition can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    People,
    Select,
    MultiSelect,
    Status,
    Checkbox,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionType::People => "people",
            ConditionType::Select => "select",
            ConditionType::MultiSelect => "multi_select",
            ConditionType::Status => "status",
            ConditionType::Checkbox => "checkbox",
        };
        f.write_str(name)
    }
}

/// Expected value of a condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Text(String),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Bool(b) => write!(f, "{b}"),
            ConditionValue::Text(s) => f.write_str(s),
        }
    }
}

/// Property predicate gating write operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Property name on the target page
    pub property: String,
    /// Expected property type
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    /// Expected value
    #[serde(rename = "value")]
    pub expected: ConditionValue,
}

impl Condition {
    /// Condition on a `people` property containing the given user id
    pub fn people(property: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            condition_type: ConditionType::People,
            expected: ConditionValue::Text(user_id.into()),
        }
    }

    /// Condition on a text-valued property (`select`, `status`, `multi_select`)
    pub fn option(
        property: impl Into<String>,
        condition_type: ConditionType,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            condition_type,
            expected: ConditionValue::Text(expected.into()),
        }
    }

    /// Condition on a `checkbox` property
    pub fn checkbox(property: impl Into<String>, expected: bool) -> Self {
        Self {
            property: property.into(),
            condition_type: ConditionType::Checkbox,
            expected: ConditionValue::Bool(expected),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) = {}",
            self.property, self.condition_type, self.expected
        )
    }
}

/// Root resource a rule is anchored to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The page and every descendant within the depth bound
    Page(ResourceId),
    /// The database and pages filed directly in it
    Database(ResourceId),
}

/// A named scope with its granted operations
///
/// The scope ids are stored as configured so that a rule which slipped past
/// validation is still representable; `scope()` returns `None` for such a
/// rule and the matcher never selects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<ResourceId>,
    pub permissions: Vec<Permission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Rule {
    /// Create a page-scoped rule
    pub fn page(
        name: impl Into<String>,
        page_id: impl Into<ResourceId>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            name: name.into(),
            page_id: Some(page_id.into()),
            database_id: None,
            permissions: permissions.into_iter().collect(),
            condition: None,
        }
    }

    /// Create a database-scoped rule
    pub fn database(
        name: impl Into<String>,
        database_id: impl Into<ResourceId>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            name: name.into(),
            page_id: None,
            database_id: Some(database_id.into()),
            permissions: permissions.into_iter().collect(),
            condition: None,
        }
    }

    /// Attach a condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// The rule's scope, or `None` when not exactly one scope id is set
    pub fn scope(&self) -> Option<Scope> {
        match (&self.page_id, &self.database_id) {
            (Some(page), None) => Some(Scope::Page(page.clone())),
            (None, Some(db)) => Some(Scope::Database(db.clone())),
            _ => None,
        }
    }

    /// Whether the rule grants an operation
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Decision when no rule matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    #[default]
    Deny,
    AllowRead,
}

/// Ordered rules plus the default policy
///
/// Immutable once built; reloading means building a new engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default)]
    pub default_policy: DefaultPolicy,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set
    pub fn new(rules: Vec<Rule>, default_policy: DefaultPolicy) -> Self {
        Self {
            default_policy,
            rules,
        }
    }

    /// Empty rule set that denies everything
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// Number of configured rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_round_trip_strings() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
        assert!(matches!(
            "page:destroy".parse::<Permission>(),
            Err(GuardError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_read_write_split() {
        let reads: Vec<_> = Permission::ALL.into_iter().filter(|p| p.is_read()).collect();
        assert_eq!(
            reads,
            vec![
                Permission::PageRead,
                Permission::DatabaseRead,
                Permission::DatabaseQuery,
                Permission::BlockRead
            ]
        );
        assert!(Permission::BlockDelete.is_write());
        assert!(Permission::PageCreate.is_write());
        assert_eq!(Permission::DatabaseQuery.resource_kind(), ResourceKind::Database);
    }

    #[test]
    fn test_rule_scope() {
        let rule = Rule::page("docs", "P1", [Permission::PageRead]);
        assert_eq!(rule.scope(), Some(Scope::Page(ResourceId::new("P1"))));

        let rule = Rule::database("tasks", "D1", [Permission::DatabaseQuery]);
        assert_eq!(rule.scope(), Some(Scope::Database(ResourceId::new("D1"))));

        let mut broken = Rule::page("broken", "P1", []);
        broken.database_id = Some(ResourceId::new("D1"));
        assert_eq!(broken.scope(), None);

        broken.page_id = None;
        broken.database_id = None;
        assert_eq!(broken.scope(), None);
    }

    #[test]
    fn test_rule_json_shape() {
        let json = r#"{
            "name": "tasks",
            "databaseId": "D1",
            "permissions": ["database:query", "page:update"],
            "condition": { "property": "Done", "type": "checkbox", "value": false }
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.database_id, Some(ResourceId::new("D1")));
        assert!(rule.grants(Permission::PageUpdate));
        assert_eq!(rule.condition, Some(Condition::checkbox("Done", false)));
    }

    #[test]
    fn test_condition_display() {
        let condition = Condition::people("Assignee", "U1");
        assert_eq!(condition.to_string(), "Assignee (people) = U1");
    }
}
