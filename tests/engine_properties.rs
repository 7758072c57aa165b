//! End-to-end decision properties against an in-memory store

use std::sync::Arc;

use notion_guard::permissions::{DecisionCode, DecisionRequest, EngineConfig};
use notion_guard::rules::Condition;
use notion_guard::store::{MemoryStore, Parent, PropertyValue};
use notion_guard::{DefaultPolicy, Permission, PermissionEngine, ResourceId, Rule, RuleSet};

fn id(raw: &str) -> ResourceId {
    ResourceId::new(raw)
}

/// P1 (page, root)
/// ├── P2 (page)
/// │   └── B1 (block)
/// └── D1 (database)
///     └── R1 (page row)
///         └── RB1 (block)
fn workspace() -> MemoryStore {
    MemoryStore::new()
        .with_page("P1", Parent::workspace())
        .with_page("P2", Parent::page("P1"))
        .with_block("B1", Parent::page("P2"))
        .with_database("D1", Parent::page("P1"))
        .with_page("R1", Parent::database("D1"))
        .with_block("RB1", Parent::page("R1"))
}

#[tokio::test]
async fn docs_rule_scenario() {
    let rules = RuleSet::new(
        vec![Rule::page("docs", "P1", [Permission::PageRead, Permission::BlockRead])],
        DefaultPolicy::Deny,
    );
    let engine = PermissionEngine::new(rules, Arc::new(workspace()));

    let read = engine.decide(&id("B1"), Permission::PageRead, None).await;
    assert!(read.allowed);
    assert_eq!(read.rule_name(), Some("docs"));

    let delete = engine.decide(&id("B1"), Permission::BlockDelete, None).await;
    assert!(!delete.allowed);
    assert_eq!(delete.code, DecisionCode::NotGranted);
}

#[tokio::test]
async fn database_rule_is_shallow() {
    let rules = RuleSet::new(
        vec![Rule::database("rows", "D1", [Permission::PageRead, Permission::DatabaseQuery])],
        DefaultPolicy::Deny,
    );
    let engine = PermissionEngine::new(rules, Arc::new(workspace()));

    assert!(engine.decide(&id("D1"), Permission::DatabaseQuery, None).await.allowed);
    assert!(engine.decide(&id("R1"), Permission::PageRead, None).await.allowed);

    let nested = engine.decide(&id("RB1"), Permission::PageRead, None).await;
    assert!(!nested.allowed);
    assert_eq!(nested.code, DecisionCode::DefaultDeny);
}

#[tokio::test]
async fn deep_chain_is_denied_at_depth_bound() {
    let mut store = MemoryStore::new().with_page("TOP", Parent::workspace());
    for i in 1..=11 {
        let parent = if i == 1 {
            Parent::page("TOP")
        } else {
            Parent::block(format!("L{}", i - 1))
        };
        store = store.with_block(format!("L{i}"), parent);
    }
    let store = Arc::new(store);

    let rules = RuleSet::new(vec![Rule::page("top", "TOP", [Permission::BlockRead])], DefaultPolicy::Deny);
    let engine = PermissionEngine::new(rules, store.clone());

    assert!(engine.decide(&id("L10"), Permission::BlockRead, None).await.allowed);

    engine.clear_cache().await;
    let before = store.parent_calls();
    let deep = engine.decide(&id("L11"), Permission::BlockRead, None).await;
    assert!(!deep.allowed);
    // Ten hops, each resolved as a block after a failed page probe
    assert_eq!(store.parent_calls() - before, 20);
}

#[tokio::test]
async fn shorter_depth_bound_from_config() {
    let rules = RuleSet::new(vec![Rule::page("docs", "P1", [Permission::BlockRead])], DefaultPolicy::Deny);
    let engine = PermissionEngine::with_config(
        rules,
        Arc::new(workspace()),
        EngineConfig::new().with_max_depth(1),
    );

    assert!(engine.decide(&id("P2"), Permission::BlockRead, None).await.allowed);
    assert!(!engine.decide(&id("B1"), Permission::BlockRead, None).await.allowed);
}

#[tokio::test]
async fn condition_gating_on_assignee() {
    let store = workspace()
        .with_property("P2", "Assignee", PropertyValue::People(vec!["U".into()]))
        .with_property("R1", "Assignee", PropertyValue::People(vec!["someone-else".into()]));
    let rules = RuleSet::new(
        vec![Rule::page("assigned", "P1", [Permission::PageUpdate])
            .with_condition(Condition::people("Assignee", "U"))],
        DefaultPolicy::Deny,
    );
    let engine = PermissionEngine::new(rules, Arc::new(store));

    assert!(engine.decide(&id("P2"), Permission::PageUpdate, None).await.allowed);

    let other = engine.decide(&id("R1"), Permission::PageUpdate, None).await;
    assert!(!other.allowed);
    assert_eq!(other.code, DecisionCode::ConditionUnmet);

    // P1 has no Assignee property at all
    let absent = engine.decide(&id("P1"), Permission::PageUpdate, None).await;
    assert!(!absent.allowed);
    assert_eq!(absent.code, DecisionCode::ConditionUnmet);
}

#[tokio::test]
async fn cache_is_shared_across_decisions_until_cleared() {
    let store = Arc::new(workspace());
    let rules = RuleSet::new(vec![Rule::page("docs", "P1", [Permission::PageRead])], DefaultPolicy::Deny);
    let engine = PermissionEngine::new(rules, store.clone());

    engine.decide(&id("B1"), Permission::PageRead, None).await;
    let warm = store.parent_calls();
    assert!(warm > 0);

    engine.decide(&id("B1"), Permission::PageRead, None).await;
    assert_eq!(store.parent_calls(), warm);

    engine.clear_cache().await;
    engine.decide(&id("B1"), Permission::PageRead, None).await;
    assert_eq!(store.parent_calls(), warm * 2);
}

#[tokio::test]
async fn concurrent_decisions_agree_with_sequential_ones() {
    let rules = RuleSet::new(
        vec![
            Rule::database("rows", "D1", [Permission::PageRead]),
            Rule::page("docs", "P1", [Permission::BlockRead]),
        ],
        DefaultPolicy::AllowRead,
    );
    let engine = PermissionEngine::new(rules, Arc::new(workspace()));

    let requests: Vec<_> = ["P1", "P2", "B1", "D1", "R1", "RB1", "missing"]
        .into_iter()
        .flat_map(|r| {
            [
                DecisionRequest::new(r, Permission::PageRead),
                DecisionRequest::new(r, Permission::BlockRead),
            ]
        })
        .collect();

    let concurrent = engine.decide_many(&requests).await;

    engine.clear_cache().await;
    for (request, decision) in requests.iter().zip(&concurrent) {
        let sequential = engine
            .decide(&request.resource_id, request.operation, None)
            .await;
        assert_eq!(sequential.allowed, decision.allowed, "{:?}", request);
        assert_eq!(sequential.code, decision.code);
    }
}

#[tokio::test]
async fn rules_loaded_from_json_drive_decisions() {
    let json = r#"{
        "defaultPolicy": "allow_read",
        "rules": [
            {
                "name": "tasks",
                "databaseId": "D1",
                "permissions": ["page:read", "page:update"],
                "condition": { "property": "Done", "type": "checkbox", "value": false }
            }
        ]
    }"#;
    let store = workspace().with_property("R1", "Done", PropertyValue::Checkbox(false));
    let engine = PermissionEngine::new(RuleSet::from_json_str(json).unwrap(), Arc::new(store));

    assert!(engine.decide(&id("R1"), Permission::PageUpdate, None).await.allowed);
    assert!(engine.decide(&id("P2"), Permission::PageRead, None).await.allowed);
    assert!(!engine.decide(&id("P2"), Permission::PageUpdate, None).await.allowed);
}
