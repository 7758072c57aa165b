//! Resource identifiers
//!
//! Notion hands out the same id in several spellings: hyphenated UUIDs,
//! bare 32-hex strings, upper or lower case, or embedded at the end of a
//! page URL. `ResourceId` keeps the caller's spelling for display and
//! compares, hashes and caches on the normalized form only.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::core::{GuardError, GuardResult};

/// Canonical form of an identifier: separators removed, lower-cased
pub fn normalize(id: &str) -> String {
    id.trim()
        .chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two identifier strings under normalization
pub fn ids_equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn url_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Trailing 32-hex or hyphenated UUID, before any query or fragment
        Regex::new(
            r"([0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12})(?:[?#].*)?$",
        )
        .ok()
    })
    .as_ref()
}

/// A page, database or block identifier
#[derive(Clone)]
pub struct ResourceId {
    raw: String,
    key: String,
}

impl ResourceId {
    /// Wrap an identifier string as given
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let key = normalize(&raw);
        Self { raw, key }
    }

    /// Parse user input, accepting bare ids and Notion page URLs
    pub fn parse(input: &str) -> GuardResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(GuardError::InvalidResourceId("empty identifier".to_string()));
        }

        if !trimmed.contains('/') {
            return Ok(Self::new(trimmed));
        }

        let pattern = url_id_pattern().ok_or_else(|| {
            GuardError::InvalidResourceId(format!("cannot parse URL {trimmed}"))
        })?;
        pattern
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| Self::new(m.as_str()))
            .ok_or_else(|| GuardError::InvalidResourceId(trimmed.to_string()))
    }

    /// The identifier as the caller spelled it
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Normalized form used for equality and cache keys
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Hyphenated UUID form for REST paths, or the raw id if it is not a UUID
    pub fn api_form(&self) -> String {
        match Uuid::parse_str(&self.key) {
            Ok(uuid) => uuid.hyphenated().to_string(),
            Err(_) => self.raw.clone(),
        }
    }

    /// Compare against a raw identifier string
    pub fn matches(&self, other: &str) -> bool {
        self.key == normalize(other)
    }
}

impl PartialEq for ResourceId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ResourceId {}

impl Hash for ResourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.raw)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for ResourceId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ResourceId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
