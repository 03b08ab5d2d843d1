//! Lucene clause compilation for field constraints.
//!
//! Every constraint compiles to one or more clauses. Negated clauses are
//! kept apart from their body so that a conjunction made only of negations
//! can be anchored on `*:*`, which the engine needs to match anything.

use serde_json::Value;

use crate::types::{Comparison, Condition, FieldConstraint, Filter};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    body: String,
    negated: bool,
}

impl Clause {
    fn positive(body: String) -> Self {
        Self {
            body,
            negated: false,
        }
    }

    fn negative(body: String) -> Self {
        Self {
            body,
            negated: true,
        }
    }

    fn render(&self) -> String {
        if self.negated {
            format!("-{}", self.body)
        } else {
            self.body.clone()
        }
    }
}

/// Clauses for one native query, split by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFilters {
    /// Scored full-text clauses for the native `query`.
    pub scored: Vec<String>,
    /// Non-scoring filter clauses, ANDed by the engine.
    pub filters: Vec<String>,
}

/// Compiles top-level filters for a search request.
///
/// Top-level `$search` comparisons become scored clauses; everything else,
/// including `$search` nested in `$or`/`$and`, becomes a filter.
pub fn compile_filters(filters: &[Filter]) -> CompiledFilters {
    let mut compiled = CompiledFilters::default();

    for filter in filters {
        match filter {
            Filter::Field(constraint) => {
                let (searches, rest) = split_search(constraint);
                let scored = searches
                    .iter()
                    .filter_map(|text| search_clause(&field_name(&constraint.field), text));
                compiled.scored.extend(scored);
                let clauses = compile_condition(&constraint.field, &rest);
                if let Some(clause) = conjunction(&clauses, true) {
                    compiled.filters.push(clause);
                }
            }
            other => {
                if let Some(clause) = conjunction(&compile_filter(other), true) {
                    compiled.filters.push(clause);
                }
            }
        }
    }

    compiled
}

/// Compiles filters into a single clause, or `None` when they constrain
/// nothing.
pub fn compile_single(filters: &[Filter]) -> Option<String> {
    let clauses: Vec<Clause> = filters.iter().flat_map(compile_filter).collect();
    conjunction(&clauses, true)
}

fn split_search(constraint: &FieldConstraint) -> (Vec<String>, Condition) {
    match &constraint.condition {
        Condition::Compare(comparisons) => {
            let (searches, rest): (Vec<_>, Vec<_>) = comparisons
                .iter()
                .cloned()
                .partition(|c| matches!(c, Comparison::Search(_)));
            let texts = searches
                .into_iter()
                .filter_map(|c| match c {
                    Comparison::Search(text) => Some(text),
                    _ => None,
                })
                .collect();
            (texts, Condition::Compare(rest))
        }
        equals => (Vec::new(), equals.clone()),
    }
}

fn compile_filter(filter: &Filter) -> Vec<Clause> {
    match filter {
        Filter::Field(constraint) => compile_condition(&constraint.field, &constraint.condition),
        Filter::Or(branches) => vec![combine(branches, " OR ")],
        Filter::And(branches) => vec![combine(branches, " AND ")],
    }
}

fn combine(branches: &[Vec<Filter>], operator: &str) -> Clause {
    let mut parts: Vec<String> = branches
        .iter()
        .map(|branch| {
            let clauses: Vec<Clause> = branch.iter().flat_map(compile_filter).collect();
            conjunction(&clauses, false).unwrap_or_else(|| "*:*".to_string())
        })
        .collect();

    if parts.len() == 1 {
        Clause::positive(parts.remove(0))
    } else {
        Clause::positive(format!("({})", parts.join(operator)))
    }
}

/// ANDs clauses together.
///
/// A lone clause at the top level is rendered bare; anywhere else a
/// conjunction made only of negations is anchored on `*:*`.
fn conjunction(clauses: &[Clause], top_level: bool) -> Option<String> {
    match clauses {
        [] => None,
        [single] if top_level || !single.negated => Some(single.render()),
        _ => {
            let mut parts = Vec::with_capacity(clauses.len() + 1);
            if clauses.iter().all(|c| c.negated) {
                parts.push("*:*".to_string());
            }
            parts.extend(clauses.iter().map(Clause::render));
            Some(format!("({})", parts.join(" AND ")))
        }
    }
}

fn compile_condition(field: &str, condition: &Condition) -> Vec<Clause> {
    let field = &field_name(field);
    match condition {
        Condition::Equals(Value::Null) => vec![Clause::negative(format!("{field}:[* TO *]"))],
        Condition::Equals(Value::String(s)) if s == "*" => {
            vec![Clause::positive(format!("{field}:*"))]
        }
        Condition::Equals(value) | Condition::Term(value) => {
            vec![Clause::positive(format!("{field}:{}", literal(value)))]
        }
        Condition::Compare(comparisons) => compile_comparisons(field, comparisons),
    }
}

fn compile_comparisons(field: &str, comparisons: &[Comparison]) -> Vec<Clause> {
    let mut clauses = Vec::new();

    let lower: Vec<(&Value, bool)> = comparisons
        .iter()
        .filter_map(|c| match c {
            Comparison::Gt(v) => Some((v, false)),
            Comparison::Gte(v) => Some((v, true)),
            _ => None,
        })
        .collect();
    let upper: Vec<(&Value, bool)> = comparisons
        .iter()
        .filter_map(|c| match c {
            Comparison::Lt(v) => Some((v, false)),
            Comparison::Lte(v) => Some((v, true)),
            _ => None,
        })
        .collect();

    if lower.len() <= 1 && upper.len() <= 1 {
        if !lower.is_empty() || !upper.is_empty() {
            clauses.push(Clause::positive(range(
                field,
                lower.first().copied(),
                upper.first().copied(),
            )));
        }
    } else {
        clauses.extend(lower.iter().map(|b| Clause::positive(range(field, Some(*b), None))));
        clauses.extend(upper.iter().map(|b| Clause::positive(range(field, None, Some(*b)))));
    }

    for comparison in comparisons {
        match comparison {
            Comparison::Lt(_) | Comparison::Lte(_) | Comparison::Gt(_) | Comparison::Gte(_) => {}
            Comparison::Ne(Value::Null) => clauses.push(Clause::positive(format!("{field}:[* TO *]"))),
            Comparison::Ne(value) => {
                clauses.push(Clause::negative(format!("{field}:{}", literal(value))))
            }
            Comparison::In(values) if values.is_empty() => {
                clauses.push(Clause::negative("*:*".to_string()))
            }
            Comparison::In(values) => clauses.push(Clause::positive(set(field, values))),
            Comparison::Nin(values) if values.is_empty() => {}
            Comparison::Nin(values) => clauses.push(Clause::negative(set(field, values))),
            Comparison::Search(text) => {
                if let Some(clause) = search_clause(field, text) {
                    clauses.push(Clause::positive(clause));
                }
            }
        }
    }

    clauses
}

fn range(field: &str, lower: Option<(&Value, bool)>, upper: Option<(&Value, bool)>) -> String {
    let inclusive = |bound: Option<(&Value, bool)>, other: Option<(&Value, bool)>| {
        bound.or(other).is_some_and(|(_, inclusive)| inclusive)
    };
    let open = if inclusive(lower, upper) { '[' } else { '{' };
    let close = if inclusive(upper, lower) { ']' } else { '}' };
    let from = lower.map_or_else(|| "*".to_string(), |(v, _)| bound(v));
    let to = upper.map_or_else(|| "*".to_string(), |(v, _)| bound(v));
    format!("{field}:{open}{from} TO {to}{close}")
}

fn set(field: &str, values: &[Value]) -> String {
    let terms: Vec<String> = values.iter().map(literal).collect();
    format!("{field}:({})", terms.join(" OR "))
}

fn search_clause(field: &str, text: &str) -> Option<String> {
    let terms: Vec<String> = text.split_whitespace().map(escape_term).collect();
    if terms.is_empty() {
        None
    } else {
        Some(format!("{field}:({})", terms.join(" ")))
    }
}

/// Renders a literal as a Lucene term.
///
/// Numbers are escaped too, since a leading `-` would otherwise read as a
/// prohibit operator.
pub fn literal(value: &Value) -> String {
    match value {
        Value::String(s) if s.is_empty() => "\"\"".to_string(),
        Value::String(s) => escape_term(s),
        other => escape_term(&other.to_string()),
    }
}

// Range endpoints are not parsed as terms, so numbers stay verbatim.
fn bound(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => literal(other),
    }
}

fn field_name(field: &str) -> String {
    if field == "*" {
        field.to_string()
    } else {
        escape_term(field)
    }
}

/// Backslash-escapes Lucene query syntax characters and whitespace.
pub fn escape_term(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(
            c,
            '\\' | '+'
                | '-'
                | '!'
                | '('
                | ')'
                | ':'
                | '^'
                | '['
                | ']'
                | '"'
                | '{'
                | '}'
                | '~'
                | '*'
                | '?'
                | '|'
                | '&'
                | '/'
        ) || c.is_whitespace()
        {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
