//! Notion API store
//!
//! Direct HTTP client for the Notion REST API. Parent probes retrieve the
//! resource as a page, block or database; properties are read off the
//! retrieved page object.
//!
//! # Configuration
//!
//! ```ignore
//! // From environment variables
//! let store = NotionStore::from_env()?;
//!
//! // With explicit settings
//! let store = NotionStore::new(NotionStoreConfig::new("secret_..."))?;
//! ```

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Parent, PropertyValue, ResourceStore, StoreError};
use crate::core::{GuardError, GuardResult};
use crate::ids::ResourceId;
use crate::rules::ResourceKind;

const DEFAULT_API_BASE: &str = "https://api.notion.com/v1";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Connection settings for the Notion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionStoreConfig {
    /// Integration token, sent as a bearer token
    pub token: String,

    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Value of the `Notion-Version` header
    #[serde(default = "default_notion_version")]
    pub notion_version: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_notion_version() -> String {
    DEFAULT_NOTION_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl NotionStoreConfig {
    /// Create a configuration with default endpoint settings
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: default_api_base(),
            notion_version: default_notion_version(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Read configuration from environment variables
    ///
    /// Reads from:
    /// - `NOTION_TOKEN` (required)
    /// - `NOTION_API_BASE` (optional)
    /// - `NOTION_VERSION` (optional)
    /// - `NOTION_TIMEOUT_SECS` (optional, defaults to 30)
    pub fn from_env() -> GuardResult<Self> {
        let token = env::var("NOTION_TOKEN").map_err(|_| {
            GuardError::InvalidConfig("NOTION_TOKEN environment variable not set".into())
        })?;

        let mut config = Self::new(token);
        if let Ok(base) = env::var("NOTION_API_BASE") {
            config.api_base = base;
        }
        if let Ok(version) = env::var("NOTION_VERSION") {
            config.notion_version = version;
        }
        if let Ok(raw) = env::var("NOTION_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|_| {
                GuardError::InvalidConfig(format!("NOTION_TIMEOUT_SECS is not a number: {raw}"))
            })?;
        }

        Ok(config)
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resource store backed by the Notion REST API
pub struct NotionStore {
    client: Client,
    config: NotionStoreConfig,
}

impl NotionStore {
    /// Create a store from explicit configuration
    pub fn new(config: NotionStoreConfig) -> GuardResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        tracing::info!("[NotionStore] Using API base {}", config.api_base);
        Ok(Self { client, config })
    }

    /// Create a store from environment variables
    pub fn from_env() -> GuardResult<Self> {
        Self::new(NotionStoreConfig::from_env()?)
    }

    fn url(&self, collection: &str, id: &ResourceId) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            collection,
            id.api_form()
        )
    }

    /// GET a resource object, mapping error statuses to store errors
    async fn get_object(&self, collection: &str, id: &ResourceId) -> Result<Value, StoreError> {
        let url = self.url(collection, id);
        tracing::debug!("[NotionStore] GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.notion_version)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("[NotionStore] Response status: {}", status);

        match status {
            s if s.is_success() => serde_json::from_str(&body)
                .map_err(|e| StoreError::decode(format!("invalid JSON from {collection}: {e}"))),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(format!("{collection}/{id}"))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StoreError::Unauthorized(format!("{collection}/{id}")))
            }
            _ => Err(StoreError::Http {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

fn collection_for(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Page => "pages",
        ResourceKind::Block => "blocks",
        ResourceKind::Database => "databases",
    }
}

/// Pull the `parent` object out of a retrieved resource
fn decode_parent(object: Value) -> Result<Parent, StoreError> {
    let parent = object
        .get("parent")
        .cloned()
        .ok_or_else(|| StoreError::decode("object has no parent"))?;
    serde_json::from_value(parent).map_err(|e| StoreError::decode(format!("bad parent: {e}")))
}

/// Pull a named property out of a retrieved page
fn decode_property(page: &Value, property: &str) -> Result<Option<PropertyValue>, StoreError> {
    let properties = page
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| StoreError::decode("page has no properties"))?;

    properties
        .get(property)
        .map(PropertyValue::from_notion)
        .transpose()
}

#[async_trait]
impl ResourceStore for NotionStore {
    async fn fetch_parent(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
    ) -> Result<Parent, StoreError> {
        let object = self.get_object(collection_for(kind), id).await?;
        decode_parent(object)
    }

    async fn fetch_property(
        &self,
        page_id: &ResourceId,
        property: &str,
    ) -> Result<Option<PropertyValue>, StoreError> {
        let page = self.get_object("pages", page_id).await?;
        decode_property(&page, property)
    }

    fn name(&self) -> &str {
        "notion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config: NotionStoreConfig = serde_json::from_str(r#"{ "token": "secret" }"#).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.notion_version, DEFAULT_NOTION_VERSION);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_url_uses_hyphenated_id() {
        let store = NotionStore::new(
            NotionStoreConfig::new("secret").with_api_base("http://localhost:1234/v1/"),
        )
        .unwrap();
        let id = ResourceId::new("1A2B3C4D5E6F7A8B9C0D1E2F3A4B5C6D");
        assert_eq!(
            store.url("blocks", &id),
            "http://localhost:1234/v1/blocks/1a2b3c4d-5e6f-7a8b-9c0d-1e2f3a4b5c6d"
        );
    }

    #[test]
    fn test_decode_parent() {
        let page = json!({"object": "page", "id": "P2", "parent": {"type": "page_id", "page_id": "P1"}});
        assert_eq!(decode_parent(page).unwrap(), Parent::page("P1"));

        let orphan = json!({"object": "page", "id": "P2"});
        assert!(matches!(decode_parent(orphan), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_decode_property() {
        let page = json!({
            "object": "page",
            "properties": {
                "Assignee": {"id": "a", "type": "people", "people": [{"id": "U1"}]}
            }
        });
        assert_eq!(
            decode_property(&page, "Assignee").unwrap(),
            Some(PropertyValue::People(vec!["U1".into()]))
        );
        assert_eq!(decode_property(&page, "Status").unwrap(), None);
    }
}
