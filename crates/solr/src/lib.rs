//! Helios Solr Adapter
//!
//! This crate translates generic, engine-neutral resource queries into the
//! native JSON query, update and schema documents of a Solr core, and maps the
//! engine's responses back into generic result envelopes.
//!
//! # Architecture
//!
//! - [`types`] - The generic query, patch intents, delete targets and result pages
//! - [`translate`] - Pure builders (query, suggest, delete, patch) and response mappers
//! - [`schema`] - Managed schema introspection and safe reconciliation
//! - [`core`] - The [`SolrApi`](core::SolrApi) transport trait
//! - [`service`] - The resource-adapter facade and the startup chain
//! - [`config`] - Adapter configuration
//! - [`error`] - Error types for all operations
//!
//! # Translating a query
//!
//! ```
//! use helios_solr::config::AdapterConfig;
//! use helios_solr::translate::build_query;
//! use helios_solr::types::GenericQuery;
//! use serde_json::json;
//!
//! let query = GenericQuery::from_value(&json!({
//!     "query": { "status": "active", "age": { "$gte": 21 } },
//!     "$limit": 5,
//!     "$sort": { "age": -1 }
//! }))
//! .unwrap();
//!
//! let native = build_query(&query, &AdapterConfig::default()).unwrap();
//!
//! assert_eq!(native.filter, vec!["status:active", "age:[21 TO *]"]);
//! assert_eq!(native.limit, 5);
//! assert_eq!(native.sort.as_deref(), Some("age desc"));
//! ```
//!
//! # Deleting and patching
//!
//! ```
//! use helios_solr::translate::{build_delete, build_patch};
//! use helios_solr::types::PatchSpec;
//! use serde_json::json;
//!
//! let delete = build_delete(None, Some(&json!({ "*": "*" }))).unwrap();
//! assert_eq!(delete.to_value(), json!({ "delete": { "query": "*:*" } }));
//!
//! let spec = PatchSpec::from_value(&json!({ "set": { "status": "inactive" } })).unwrap();
//! let update = build_patch(&spec, "id").unwrap();
//! assert_eq!(
//!     update.for_id("id", &json!("a")),
//!     json!({ "id": "a", "status": { "set": "inactive" } })
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod core;
pub mod error;
pub mod schema;
pub mod service;
pub mod translate;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{AdapterConfig, CommitStrategy, MigrationPolicy, PaginationConfig};
pub use core::{SolrApi, SolrClientError};
pub use error::{AdapterError, AdapterResult, ResourceError, UpstreamError, ValidationError};
pub use service::{SolrService, StageOutcome, StartupReport};
pub use types::{FindPage, FindResult, GenericQuery, PatchSpec};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
