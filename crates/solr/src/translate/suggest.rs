use serde::Serialize;

use crate::config::AdapterConfig;
use crate::error::{ValidationError, ValidationResult};
use crate::types::GenericQuery;

/// A native suggest request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeSuggest {
    /// Always `true`.
    pub suggest: bool,
    /// Text to complete.
    #[serde(rename = "suggest.q")]
    pub q: String,
    /// Suggester dictionary.
    #[serde(rename = "suggest.dictionary", skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<String>,
    /// Rebuild the suggester first.
    #[serde(rename = "suggest.build")]
    pub build: bool,
    /// Maximum number of suggestions.
    #[serde(rename = "suggest.count", skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Builds a suggest request from the `$suggest` payload.
///
/// Field constraints in the query are ignored. The suggestion count is
/// capped by `paginate.max`.
pub fn build_suggest(query: &GenericQuery, config: &AdapterConfig) -> ValidationResult<NativeSuggest> {
    let suggest = query.suggest.as_ref().ok_or_else(|| ValidationError::InvalidQuery {
        message: "missing $suggest".to_string(),
    })?;

    let term = suggest.term.trim();
    if term.is_empty() {
        return Err(ValidationError::InvalidModifier {
            modifier: "$suggest".to_string(),
            message: "suggest term must not be empty".to_string(),
        });
    }

    let count = match (suggest.count, config.paginate.max) {
        (Some(count), Some(max)) => Some(count.min(max)),
        (count, _) => count,
    };

    Ok(NativeSuggest {
        suggest: true,
        q: term.to_string(),
        dictionary: suggest.dictionary.clone(),
        build: suggest.build,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SuggestTerm;
    use serde_json::json;

    #[test]
    fn test_plain_term() {
        let query = GenericQuery::from_value(&json!({
            "query": { "$suggest": "nin", "status": "active" }
        }))
        .unwrap();

        let native = build_suggest(&query, &AdapterConfig::default()).unwrap();

        assert_eq!(
            serde_json::to_value(&native).unwrap(),
            json!({ "suggest": true, "suggest.q": "nin", "suggest.build": false })
        );
    }

    #[test]
    fn test_dictionary_and_count_cap() {
        let mut config = AdapterConfig::default();
        config.paginate.max = Some(5);

        let mut term = SuggestTerm::new("nin").with_dictionary("titles");
        term.count = Some(20);
        term.build = true;

        let native = build_suggest(&GenericQuery::new().with_suggest(term), &config).unwrap();

        assert_eq!(
            serde_json::to_value(&native).unwrap(),
            json!({
                "suggest": true,
                "suggest.q": "nin",
                "suggest.dictionary": "titles",
                "suggest.build": true,
                "suggest.count": 5
            })
        );
    }

    #[test]
    fn test_missing_or_blank_term() {
        let config = AdapterConfig::default();
        assert!(build_suggest(&GenericQuery::new(), &config).is_err());
        assert!(
            build_suggest(&GenericQuery::new().with_suggest(SuggestTerm::new("  ")), &config)
                .is_err()
        );
    }
}
