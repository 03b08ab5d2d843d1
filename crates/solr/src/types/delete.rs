use serde_json::Value;

/// What a delete removes, normalized from the caller's id or filter.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    /// Delete these ids, in the order given.
    ByIds(Vec<Value>),
    /// Delete everything matching this engine query clause.
    ByQuery(String),
}

impl DeleteTarget {
    /// Clause matching every document.
    pub const MATCH_ALL: &'static str = "*:*";

    /// Deletes every document.
    pub fn all() -> Self {
        DeleteTarget::ByQuery(Self::MATCH_ALL.to_string())
    }

    /// Returns true if this target removes the whole index.
    pub fn is_match_all(&self) -> bool {
        matches!(self, DeleteTarget::ByQuery(clause) if clause == Self::MATCH_ALL)
    }
}
