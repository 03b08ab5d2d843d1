//! Error types for the Solr adapter.
//!
//! Errors are grouped the same way callers react to them: malformed input
//! ([`ValidationError`]), missing records ([`ResourceError`]), and anything the
//! engine or its transport reported ([`UpstreamError`]). Every transport
//! failure is wrapped into [`UpstreamError`] so callers see one error surface
//! regardless of the underlying fault.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::core::SolrClientError;

/// The primary error type for all adapter operations.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Malformed generic input or configuration.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Record state errors.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Engine or transport errors.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl AdapterError {
    /// Returns true if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::Resource(ResourceError::NotFound { .. }))
    }

    /// Returns true if the caller supplied invalid input.
    pub fn is_validation(&self) -> bool {
        matches!(self, AdapterError::Validation(_))
    }
}

/// Errors raised while reading caller input or configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A constraint used an operator the translator does not know.
    #[error("unknown operator '{operator}' on field '{field}'")]
    UnknownOperator { field: String, operator: String },

    /// An operator received an operand of the wrong shape.
    #[error("invalid operand for '{operator}' on field '{field}': {message}")]
    InvalidOperand {
        field: String,
        operator: String,
        message: String,
    },

    /// A reserved modifier (`$limit`, `$sort`, ...) had an invalid value.
    #[error("invalid value for modifier '{modifier}': {message}")]
    InvalidModifier { modifier: String, message: String },

    /// The generic query itself was not a usable mapping.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// `update` was called without an id or with several documents.
    #[error("You can not replace multiple instances. Did you mean 'patch'?")]
    MultipleReplace,

    /// A multi-document patch was requested without a filter.
    #[error("missing params: a patch without an id requires a query")]
    MissingPatchParams,

    /// A delete request named nothing to delete.
    #[error("delete requires an id, a list of ids or a non-empty filter")]
    EmptyDeleteTarget,

    /// A patch used an atomic-update operation the engine does not support.
    #[error("unknown patch operation '{operation}'")]
    UnknownPatchOperation { operation: String },

    /// A patch operation received an unusable value.
    #[error("invalid value for '{operation}' on field '{field}': {message}")]
    InvalidPatchValue {
        field: String,
        operation: String,
        message: String,
    },

    /// The adapter configuration is not usable.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Errors related to record state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// No record matched the requested id.
    #[error("No record found for id '{id}'")]
    NotFound { id: String },
}

/// Errors originating from the engine or the transport in front of it.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The transport failed before a response was received.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: SolrClientError,
    },

    /// The engine answered with a non-zero status.
    #[error("{operation} returned status {status}: {body}")]
    BadStatus {
        operation: String,
        status: i64,
        body: String,
    },

    /// The engine answered with a document the adapter could not read.
    #[error("malformed {operation} response: {message}")]
    MalformedResponse { operation: String, message: String },
}

impl UpstreamError {
    /// Wraps a transport failure for the named operation.
    pub fn transport(operation: &str, source: SolrClientError) -> Self {
        UpstreamError::Transport {
            operation: operation.to_string(),
            source,
        }
    }

    /// Builds a malformed-response error for the named operation.
    pub fn malformed(operation: &str, message: impl Into<String>) -> Self {
        UpstreamError::MalformedResponse {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type alias for the pure translation functions.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::InvalidQuery {
            message: err.to_string(),
        }
    }
}
