//! Adapter configuration.
//!
//! [`AdapterConfig`] is built once, validated with [`AdapterConfig::validate`],
//! and then shared immutably with every builder and mapper call.
//!
//! # Example
//!
//! ```
//! use helios_solr::config::AdapterConfig;
//!
//! let config: AdapterConfig = serde_json::from_value(serde_json::json!({
//!     "core": "products",
//!     "paginate": { "default": 20, "max": 100 },
//!     "commit_strategy": { "commit_within": "10s" },
//!     "schema": { "title": "text_general", "price": { "type": "pfloat", "stored": true } }
//! }))
//! .unwrap();
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.id_field, "id");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::schema::SchemaDefinition;

/// Configuration for one adapter instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Engine base URL (default: `http://localhost:8983/solr`).
    #[serde(default = "default_host")]
    pub host: String,

    /// Core or collection name (default: `gettingstarted`).
    #[serde(default = "default_core")]
    pub core: String,

    /// Name of the unique key field (default: `id`).
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// When and how writes become visible.
    #[serde(default)]
    pub commit_strategy: CommitStrategy,

    /// Page size defaults and caps.
    #[serde(default)]
    pub paginate: PaginationConfig,

    /// Desired field definitions, reconciled against the engine at startup.
    #[serde(default)]
    pub schema: SchemaDefinition,

    /// Schema migration policy (default: `safe`).
    #[serde(default)]
    pub migrate: MigrationPolicy,

    /// Whether the engine exposes a managed (mutable) schema (default: true).
    #[serde(default = "default_true")]
    pub managed_schema: bool,
}

fn default_host() -> String {
    "http://localhost:8983/solr".to_string()
}

fn default_core() -> String {
    "gettingstarted".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_true() -> bool {
    true
}

fn default_commit_within() -> Option<Duration> {
    Some(Duration::from_millis(50_000))
}

fn default_page_size() -> usize {
    10
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            core: default_core(),
            id_field: default_id_field(),
            commit_strategy: CommitStrategy::default(),
            paginate: PaginationConfig::default(),
            schema: SchemaDefinition::default(),
            migrate: MigrationPolicy::default(),
            managed_schema: true,
        }
    }
}

impl AdapterConfig {
    /// Returns the core name without any leading or trailing slash.
    pub fn core_name(&self) -> &str {
        self.core.trim_matches('/')
    }

    /// Returns the full URL of the configured core.
    pub fn core_url(&self) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), self.core_name())
    }

    /// Validates configuration invariants.
    pub fn validate(&self) -> ValidationResult<()> {
        let host = self.host.trim().to_ascii_lowercase();
        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(invalid_config("host must start with http:// or https://"));
        }

        if self.core_name().trim().is_empty() {
            return Err(invalid_config("core must not be empty"));
        }

        if self.id_field.is_empty() || self.id_field.chars().any(char::is_whitespace) {
            return Err(invalid_config(
                "id_field must be a non-empty field name without whitespace",
            ));
        }

        if self.paginate.default == 0 {
            return Err(invalid_config("paginate.default must be > 0"));
        }

        if let Some(max) = self.paginate.max {
            if max == 0 {
                return Err(invalid_config("paginate.max must be > 0"));
            }
            if self.paginate.default > max {
                return Err(invalid_config("paginate.default cannot exceed paginate.max"));
            }
        }

        self.schema.validate()
    }
}

fn invalid_config(message: &str) -> ValidationError {
    ValidationError::InvalidConfig {
        message: message.to_string(),
    }
}

/// Commit behaviour attached to every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStrategy {
    /// Issue a soft commit with each write (default: true).
    #[serde(default = "default_true")]
    pub soft_commit: bool,

    /// Ask the engine to commit within this duration (default: 50s).
    ///
    /// Accepts integer milliseconds or a humantime string such as `"50s"`.
    #[serde(default = "default_commit_within", with = "duration_millis")]
    pub commit_within: Option<Duration>,

    /// Replace documents that share a unique key (default: true).
    #[serde(default = "default_true")]
    pub overwrite: bool,
}

impl Default for CommitStrategy {
    fn default() -> Self {
        Self {
            soft_commit: true,
            commit_within: default_commit_within(),
            overwrite: true,
        }
    }
}

impl CommitStrategy {
    /// Renders the strategy as engine request parameters.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("softCommit", self.soft_commit.to_string())];
        if let Some(within) = self.commit_within {
            params.push(("commitWithin", within.as_millis().to_string()));
        }
        params.push(("overwrite", self.overwrite.to_string()));
        params
    }
}

/// Page size defaults applied when a query has no `$limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Limit used when the query does not specify one.
    #[serde(default = "default_page_size")]
    pub default: usize,

    /// Upper bound applied to any requested limit.
    #[serde(default)]
    pub max: Option<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default: default_page_size(),
            max: None,
        }
    }
}

/// How schema reconciliation may change the engine's field definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationPolicy {
    /// Only add missing fields; never delete or retype existing ones.
    #[default]
    Safe,
}

impl std::fmt::Display for MigrationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationPolicy::Safe => write!(f, "safe"),
        }
    }
}

/// Serde support for `Option<Duration>` as milliseconds or humantime text.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Millis(u64),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_u64(duration.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawDuration>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawDuration::Millis(ms)) => Ok(Some(Duration::from_millis(ms))),
            Some(RawDuration::Text(text)) => humantime::parse_duration(&text)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
