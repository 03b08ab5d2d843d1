use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::CommitStrategy;
use crate::schema::SchemaCommands;
use crate::translate::{DeleteRequest, NativeQuery, NativeSuggest};

/// Failures reported by a transport implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolrClientError {
    /// The engine could not be reached.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The request did not complete in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The engine answered with a non-success HTTP status.
    #[error("http status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body as received.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Any other transport failure.
    #[error("internal transport error: {0}")]
    Internal(String),
}

/// Operations the adapter consumes from the engine.
///
/// Responses are returned as the engine's own JSON. Write operations receive
/// the configured [`CommitStrategy`] so the transport can attach
/// `softCommit`, `commitWithin` and `overwrite` to the request.
#[async_trait]
pub trait SolrApi: Send + Sync {
    /// Executes a JSON request API query.
    async fn json(&self, query: &NativeQuery) -> Result<Value, SolrClientError>;

    /// Executes an autosuggest request.
    async fn suggest(&self, request: &NativeSuggest) -> Result<Value, SolrClientError>;

    /// Adds, replaces or atomically updates documents.
    async fn update(
        &self,
        documents: &[Value],
        commit: &CommitStrategy,
    ) -> Result<Value, SolrClientError>;

    /// Deletes documents by id or by query.
    async fn delete(
        &self,
        request: &DeleteRequest,
        commit: &CommitStrategy,
    ) -> Result<Value, SolrClientError>;

    /// Returns the core admin status of the configured core.
    async fn core_status(&self) -> Result<Value, SolrClientError>;

    /// Returns the managed schema field listing.
    async fn schema_fields(&self) -> Result<Value, SolrClientError>;

    /// Applies a batch of schema commands.
    async fn update_schema(&self, commands: &SchemaCommands) -> Result<Value, SolrClientError>;
}
