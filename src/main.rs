use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use notion_guard::logging::{self, LoggingConfig};
use notion_guard::store::NotionStore;
use notion_guard::{Permission, PermissionEngine, ResourceId, RuleSet};

const DEFAULT_RULES_PATH: &str = ".notion-guard.json";

/// Exit code for a denied operation
const EXIT_DENIED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _log_guard = logging::init_logging(&LoggingConfig::from_env())?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: notion-guard <resource-id-or-url> <operation> [condition-target]");
    }

    let resource = ResourceId::parse(&args[0])?;
    let operation: Permission = args[1].parse()?;
    let condition_target = args.get(2).map(|s| ResourceId::parse(s)).transpose()?;

    let rules_path =
        env::var("NOTION_GUARD_RULES").unwrap_or_else(|_| DEFAULT_RULES_PATH.to_string());
    let rules = RuleSet::load(&rules_path)
        .with_context(|| format!("Failed to load rules from {rules_path}"))?;

    let store = NotionStore::from_env().context("Failed to configure Notion store")?;
    let engine = PermissionEngine::new(rules, Arc::new(store));

    let decision = engine
        .decide(&resource, operation, condition_target.as_ref())
        .await;

    println!("{}", serde_json::to_string_pretty(&decision)?);

    Ok(if decision.allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_DENIED)
    })
}
