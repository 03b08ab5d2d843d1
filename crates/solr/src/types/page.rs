//! Generic result envelopes.

use serde::Serialize;
use serde_json::Value;

/// A page of matched records.
///
/// `limit` and `skip` echo what the request was built with, not what the
/// engine reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindPage {
    /// Matched records.
    pub data: Vec<Value>,
    /// Total number of matches reported by the engine.
    pub total: u64,
    /// Page size the request was built with.
    pub limit: usize,
    /// Offset the request was built with.
    pub skip: usize,
    /// Facet results, when the query asked for facets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Value>,
}

impl FindPage {
    /// Returns the number of records on this page.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the page holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if more matches exist past this page.
    pub fn has_more(&self) -> bool {
        ((self.skip + self.data.len()) as u64) < self.total
    }
}

/// Result of `find`: a page, or raw suggestions for `$suggest` requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FindResult {
    /// A page of records.
    Page(FindPage),
    /// The engine's suggest response, returned as-is.
    Suggestions(Value),
}

impl FindResult {
    /// Returns the page, if this is one.
    pub fn into_page(self) -> Option<FindPage> {
        match self {
            FindResult::Page(page) => Some(page),
            FindResult::Suggestions(_) => None,
        }
    }
}
