//! Delete request builder.
//!
//! All accepted call shapes normalize to a [`DeleteTarget`]:
//!
//! | id | filter | target |
//! |---|---|---|
//! | `"*"` or `"*:*"` | ignored | by query `*:*` |
//! | single id | ignored | by ids `[id]` |
//! | list of ids | ignored | by ids, order preserved |
//! | `None` | `{"*": "*"}` | by query `*:*` |
//! | `None` | constraints | by query, constraints ANDed |

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::error::{ValidationError, ValidationResult};
use crate::types::{DeleteTarget, GenericQuery};

use super::clauses;

/// A native delete request.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    /// What to delete.
    pub target: DeleteTarget,
}

impl DeleteRequest {
    /// Returns the native body: `{"delete": [ids]}` or
    /// `{"delete": {"query": clause}}`.
    pub fn to_value(&self) -> Value {
        match &self.target {
            DeleteTarget::ByIds(ids) => json!({ "delete": ids }),
            DeleteTarget::ByQuery(clause) => json!({ "delete": { "query": clause } }),
        }
    }
}

impl Serialize for DeleteRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

/// Builds a delete request. A non-null `id` takes precedence over `filter`.
pub fn build_delete(id: Option<&Value>, filter: Option<&Value>) -> ValidationResult<DeleteRequest> {
    let target = match id {
        Some(id) if !id.is_null() => target_for_id(id)?,
        _ => target_for_filter(filter)?,
    };
    Ok(DeleteRequest { target })
}

fn target_for_id(id: &Value) -> ValidationResult<DeleteTarget> {
    match id {
        Value::String(s) if s == "*" || s == DeleteTarget::MATCH_ALL => Ok(DeleteTarget::all()),
        Value::String(s) if s.is_empty() => Err(ValidationError::EmptyDeleteTarget),
        Value::String(_) | Value::Number(_) => Ok(DeleteTarget::ByIds(vec![id.clone()])),
        Value::Array(ids) => {
            if ids.is_empty() {
                return Err(ValidationError::EmptyDeleteTarget);
            }
            if let Some(bad) = ids.iter().find(|v| !(v.is_string() || v.is_number())) {
                return Err(ValidationError::InvalidQuery {
                    message: format!("ids must be strings or numbers, got {bad}"),
                });
            }
            Ok(DeleteTarget::ByIds(ids.clone()))
        }
        other => Err(ValidationError::InvalidQuery {
            message: format!("id must be a string, number or list, got {other}"),
        }),
    }
}

fn target_for_filter(filter: Option<&Value>) -> ValidationResult<DeleteTarget> {
    let query = match filter {
        None | Some(Value::Null) => return Err(ValidationError::EmptyDeleteTarget),
        Some(filter) if filter.get("query").is_some_and(Value::is_object) => {
            GenericQuery::from_value(filter)?
        }
        Some(constraints) => GenericQuery::from_value(&json!({ "query": constraints }))?,
    };

    clauses::compile_single(&query.filters)
        .map(DeleteTarget::ByQuery)
        .ok_or(ValidationError::EmptyDeleteTarget)
}
