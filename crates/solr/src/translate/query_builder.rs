//! JSON request API query builder.
//!
//! Translates a [`GenericQuery`] into the engine's JSON request body.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{AdapterConfig, PaginationConfig};
use crate::error::{ValidationError, ValidationResult};
use crate::types::{GenericQuery, SortDirective};

use super::clauses;

/// The effective page of a request.
///
/// Resolved once per request and shared by the builder and the response
/// mapper, so the page echoed to the caller is the page that was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// Page size after defaults and caps.
    pub limit: usize,
    /// Offset.
    pub skip: usize,
}

impl Paging {
    /// Applies the pagination defaults and cap to a query.
    pub fn resolve(query: &GenericQuery, paginate: &PaginationConfig) -> Self {
        let requested = query.limit.unwrap_or(paginate.default);
        let limit = match paginate.max {
            Some(max) => requested.min(max),
            None => requested,
        };
        Self {
            limit,
            skip: query.skip.unwrap_or(0),
        }
    }
}

/// A native JSON request API query body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeQuery {
    /// Scored query; `*:*` when nothing is searched.
    pub query: String,
    /// Filter queries, ANDed by the engine.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<String>,
    /// Page size.
    pub limit: usize,
    /// Offset.
    pub offset: usize,
    /// Sort spec, e.g. `age desc,name asc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Fields to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// JSON facet block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<Value>,
    /// Raw request parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl NativeQuery {
    /// Clause matching every document.
    pub const MATCH_ALL: &'static str = "*:*";

    /// Returns the body as JSON.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Builds a native query from a generic one.
///
/// `$suggest` requests are a different request type and are rejected here;
/// see [`build_suggest`](super::build_suggest).
pub fn build_query(query: &GenericQuery, config: &AdapterConfig) -> ValidationResult<NativeQuery> {
    if query.is_suggest() {
        return Err(ValidationError::InvalidQuery {
            message: "suggest requests must be built with build_suggest".to_string(),
        });
    }

    let paging = Paging::resolve(query, &config.paginate);
    let compiled = clauses::compile_filters(&query.filters);

    let scored = if compiled.scored.is_empty() {
        NativeQuery::MATCH_ALL.to_string()
    } else {
        compiled.scored.join(" AND ")
    };

    Ok(NativeQuery {
        query: scored,
        filter: compiled.filters,
        limit: paging.limit,
        offset: paging.skip,
        sort: build_sort(&query.sort)?,
        fields: query.select.clone(),
        facet: query.facet.clone(),
        params: query.params.clone(),
    })
}

/// Renders sort directives, primary key first.
fn build_sort(sort: &[SortDirective]) -> ValidationResult<Option<String>> {
    if sort.is_empty() {
        return Ok(None);
    }

    let mut parts = Vec::with_capacity(sort.len());
    for directive in sort {
        if directive.field.trim().is_empty() {
            return Err(ValidationError::InvalidModifier {
                modifier: "$sort".to_string(),
                message: "sort field names must not be empty".to_string(),
            });
        }
        parts.push(format!("{} {}", directive.field, directive.direction.as_str()));
    }
    Ok(Some(parts.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Comparison, SuggestTerm};
    use serde_json::json;

    fn config() -> AdapterConfig {
        AdapterConfig::default()
    }

    #[test]
    fn test_end_to_end_example() {
        let query = GenericQuery::from_value(&json!({
            "query": { "status": "active", "age": { "$gte": 21 } },
            "$limit": 5,
            "$sort": { "age": -1 }
        }))
        .unwrap();

        let native = build_query(&query, &config()).unwrap();

        assert_eq!(
            native.to_value(),
            json!({
                "query": "*:*",
                "filter": ["status:active", "age:[21 TO *]"],
                "limit": 5,
                "offset": 0,
                "sort": "age desc"
            })
        );
    }

    #[test]
    fn test_empty_query_uses_defaults() {
        let native = build_query(&GenericQuery::new(), &config()).unwrap();
        assert_eq!(
            native.to_value(),
            json!({ "query": "*:*", "limit": 10, "offset": 0 })
        );
    }

    #[test]
    fn test_limit_is_capped() {
        let mut config = config();
        config.paginate.max = Some(50);

        let native = build_query(&GenericQuery::new().with_limit(500), &config).unwrap();
        assert_eq!(native.limit, 50);

        let native = build_query(&GenericQuery::new().with_limit(0), &config).unwrap();
        assert_eq!(native.limit, 0);
    }

    #[test]
    fn test_sort_select_facet_params() {
        let query = GenericQuery::from_value(&json!({
            "query": { "title": { "$search": "fox" } },
            "$sort": { "name": 1, "age": -1 },
            "$select": ["id", "name"],
            "$skip": 20,
            "$facet": { "categories": { "type": "terms", "field": "cat" } },
            "$params": { "defType": "edismax" }
        }))
        .unwrap();

        let native = build_query(&query, &config()).unwrap();

        assert_eq!(
            native.to_value(),
            json!({
                "query": "title:(fox)",
                "limit": 10,
                "offset": 20,
                "sort": "name asc,age desc",
                "fields": ["id", "name"],
                "facet": { "categories": { "type": "terms", "field": "cat" } },
                "params": { "defType": "edismax" }
            })
        );
    }

    #[test]
    fn test_builder_api_matches_parsed_query() {
        let built = GenericQuery::new()
            .with_eq("status", json!("active"))
            .with_comparison("age", Comparison::Gte(json!(21)))
            .with_comparison("age", Comparison::Lt(json!(65)));

        let native = build_query(&built, &config()).unwrap();
        assert_eq!(native.filter, vec!["status:active", "age:[21 TO 65}"]);
    }

    #[test]
    fn test_suggest_rejected() {
        let query = GenericQuery::new().with_suggest(SuggestTerm::new("nin"));
        assert!(build_query(&query, &config()).is_err());
    }

    #[test]
    fn test_paging_resolution() {
        let paginate = PaginationConfig {
            default: 25,
            max: Some(100),
        };
        assert_eq!(
            Paging::resolve(&GenericQuery::new().with_skip(5), &paginate),
            Paging { limit: 25, skip: 5 }
        );
        assert_eq!(
            Paging::resolve(&GenericQuery::new().with_limit(1000), &paginate),
            Paging { limit: 100, skip: 0 }
        );
    }
}
