//! Native response mappers.

use serde_json::Value;

use crate::config::AdapterConfig;
use crate::error::UpstreamError;
use crate::types::{FindPage, GenericQuery};

use super::query_builder::Paging;

/// Fails when a native response reports a non-zero status or an error block.
///
/// Responses without a `responseHeader` are accepted.
pub fn ensure_success(operation: &str, body: &Value) -> Result<(), UpstreamError> {
    let status = body
        .pointer("/responseHeader/status")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    let error_code = body.get("error").map(|error| {
        error
            .get("code")
            .and_then(Value::as_i64)
            .filter(|code| *code != 0)
            .unwrap_or(-1)
    });

    match (status, error_code) {
        (0, None) => Ok(()),
        (0, Some(code)) | (code, _) => Err(UpstreamError::BadStatus {
            operation: operation.to_string(),
            status: code,
            body: body.to_string(),
        }),
    }
}

fn documents<'a>(operation: &str, body: &'a Value) -> Result<&'a Vec<Value>, UpstreamError> {
    body.pointer("/response/docs")
        .and_then(Value::as_array)
        .ok_or_else(|| UpstreamError::malformed(operation, "missing response.docs"))
}

/// Maps a query response to a page.
///
/// `limit` and `skip` are those the request was built with.
pub fn response_find(
    query: &GenericQuery,
    config: &AdapterConfig,
    body: &Value,
) -> Result<FindPage, UpstreamError> {
    ensure_success("find", body)?;

    let data = documents("find", body)?.clone();
    let total = body
        .pointer("/response/numFound")
        .and_then(Value::as_u64)
        .unwrap_or(data.len() as u64);
    let paging = Paging::resolve(query, &config.paginate);

    Ok(FindPage {
        data,
        total,
        limit: paging.limit,
        skip: paging.skip,
        facets: body.get("facets").cloned(),
    })
}

/// Returns the first matched document, or `None` when nothing matched.
pub fn response_get(body: &Value) -> Result<Option<Value>, UpstreamError> {
    ensure_success("get", body)?;
    Ok(documents("get", body)?.first().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn native(docs: Value, num_found: u64) -> Value {
        json!({
            "responseHeader": { "status": 0, "QTime": 1 },
            "response": { "numFound": num_found, "start": 40, "docs": docs }
        })
    }

    #[test]
    fn test_find_echoes_requested_paging() {
        let query = GenericQuery::new().with_limit(5);
        let body = native(json!([{ "id": "1" }, { "id": "2" }]), 12);

        let page = response_find(&query, &AdapterConfig::default(), &body).unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.limit, 5);
        assert_eq!(page.skip, 0);
        assert_eq!(page.data.len(), 2);
        assert!(page.facets.is_none());
    }

    #[test]
    fn test_find_uses_default_limit_and_facets() {
        let mut body = native(json!([]), 0);
        body["facets"] = json!({ "count": 0 });

        let page = response_find(&GenericQuery::new(), &AdapterConfig::default(), &body).unwrap();

        assert_eq!(page.limit, 10);
        assert_eq!(page.facets, Some(json!({ "count": 0 })));
    }

    #[test]
    fn test_find_rejects_missing_docs() {
        let body = json!({ "responseHeader": { "status": 0 } });
        assert!(matches!(
            response_find(&GenericQuery::new(), &AdapterConfig::default(), &body),
            Err(UpstreamError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_get_first_or_none() {
        let body = native(json!([{ "id": "a" }, { "id": "b" }]), 2);
        assert_eq!(response_get(&body).unwrap(), Some(json!({ "id": "a" })));

        let body = native(json!([]), 0);
        assert_eq!(response_get(&body).unwrap(), None);
    }

    #[test]
    fn test_ensure_success() {
        assert!(ensure_success("create", &json!({ "responseHeader": { "status": 0 } })).is_ok());
        assert!(ensure_success("create", &json!({})).is_ok());

        let err = ensure_success("create", &json!({ "responseHeader": { "status": 400 } }))
            .unwrap_err();
        assert!(matches!(err, UpstreamError::BadStatus { status: 400, .. }));

        let err = ensure_success("delete", &json!({ "error": { "msg": "boom", "code": 500 } }))
            .unwrap_err();
        assert!(matches!(err, UpstreamError::BadStatus { status: 500, .. }));
    }
}
