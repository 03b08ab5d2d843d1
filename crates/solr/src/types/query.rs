//! The generic, engine-neutral query.
//!
//! A generic query is a mapping with a `query` sub-mapping of field
//! constraints plus reserved modifiers (`$limit`, `$skip`, `$sort`,
//! `$select`, `$suggest`, `$facet`, `$params`). Modifiers may sit at the top
//! level or inside `query`; [`QueryEntry::classify`] separates them from
//! constraints before anything is translated.
//!
//! # Example
//!
//! ```
//! use helios_solr::types::{Comparison, GenericQuery, SortDirective};
//! use serde_json::json;
//!
//! let parsed = GenericQuery::from_value(&json!({
//!     "query": { "status": "active", "age": { "$gte": 21 } },
//!     "$limit": 5,
//!     "$sort": { "age": -1 }
//! }))
//! .unwrap();
//!
//! let built = GenericQuery::new()
//!     .with_eq("status", json!("active"))
//!     .with_comparison("age", Comparison::Gte(json!(21)))
//!     .with_limit(5)
//!     .with_sort(SortDirective::desc("age"));
//!
//! assert_eq!(parsed, built);
//! ```

use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult};

/// A comparison operator with its operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// `$lt`
    Lt(Value),
    /// `$lte`
    Lte(Value),
    /// `$gt`
    Gt(Value),
    /// `$gte`
    Gte(Value),
    /// `$ne`
    Ne(Value),
    /// `$in`
    In(Vec<Value>),
    /// `$nin`
    Nin(Vec<Value>),
    /// `$search`: full-text match on the field.
    Search(String),
}

impl Comparison {
    /// Parses one `operator: operand` pair of a field constraint.
    pub fn parse(field: &str, operator: &str, operand: &Value) -> ValidationResult<Self> {
        let invalid = |message: &str| ValidationError::InvalidOperand {
            field: field.to_string(),
            operator: operator.to_string(),
            message: message.to_string(),
        };

        match operator {
            "$lt" | "$lte" | "$gt" | "$gte" => {
                if !matches!(operand, Value::String(_) | Value::Number(_)) {
                    return Err(invalid("expected a string or number"));
                }
                let operand = operand.clone();
                Ok(match operator {
                    "$lt" => Comparison::Lt(operand),
                    "$lte" => Comparison::Lte(operand),
                    "$gt" => Comparison::Gt(operand),
                    _ => Comparison::Gte(operand),
                })
            }
            "$ne" => {
                if !is_literal(operand) {
                    return Err(invalid("expected a scalar value or null"));
                }
                Ok(Comparison::Ne(operand.clone()))
            }
            "$in" | "$nin" => {
                let values = operand
                    .as_array()
                    .ok_or_else(|| invalid("expected a list of values"))?;
                if values.iter().any(|v| !is_literal(v) || v.is_null()) {
                    return Err(invalid("list entries must be scalar values"));
                }
                if operator == "$in" {
                    Ok(Comparison::In(values.clone()))
                } else {
                    Ok(Comparison::Nin(values.clone()))
                }
            }
            "$search" => operand
                .as_str()
                .map(|text| Comparison::Search(text.to_string()))
                .ok_or_else(|| invalid("expected search text")),
            _ => Err(ValidationError::UnknownOperator {
                field: field.to_string(),
                operator: operator.to_string(),
            }),
        }
    }

    /// Returns the operator name.
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::Lt(_) => "$lt",
            Comparison::Lte(_) => "$lte",
            Comparison::Gt(_) => "$gt",
            Comparison::Gte(_) => "$gte",
            Comparison::Ne(_) => "$ne",
            Comparison::In(_) => "$in",
            Comparison::Nin(_) => "$nin",
            Comparison::Search(_) => "$search",
        }
    }
}

fn is_literal(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null
    )
}

/// What a field must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact match against a literal; `null` means the field is absent.
    Equals(Value),
    /// Exact term match; `"*"` and `null` are plain values here.
    Term(Value),
    /// One or more operator comparisons, all of which must hold.
    Compare(Vec<Comparison>),
}

/// A constraint on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConstraint {
    /// Field name, matched against the engine schema as-is.
    pub field: String,
    /// The condition the field must satisfy.
    pub condition: Condition,
}

impl FieldConstraint {
    /// Parses `field: constraint`.
    pub fn parse(field: &str, value: &Value) -> ValidationResult<Self> {
        let condition = match value {
            Value::Object(operators) => {
                if operators.is_empty() {
                    return Err(ValidationError::InvalidOperand {
                        field: field.to_string(),
                        operator: "$eq".to_string(),
                        message: "empty constraint".to_string(),
                    });
                }
                let comparisons = operators
                    .iter()
                    .map(|(operator, operand)| Comparison::parse(field, operator, operand))
                    .collect::<ValidationResult<Vec<_>>>()?;
                Condition::Compare(comparisons)
            }
            literal if is_literal(literal) => Condition::Equals(literal.clone()),
            _ => {
                return Err(ValidationError::InvalidOperand {
                    field: field.to_string(),
                    operator: "$eq".to_string(),
                    message: "expected a scalar value or an operator mapping".to_string(),
                });
            }
        };

        Ok(Self {
            field: field.to_string(),
            condition,
        })
    }
}

/// A filter tree node: a field constraint or a logical combination.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A single field constraint.
    Field(FieldConstraint),
    /// `$or`: at least one branch must match; each branch is ANDed.
    Or(Vec<Vec<Filter>>),
    /// `$and`: every branch must match.
    And(Vec<Vec<Filter>>),
}

impl Filter {
    fn parse_branches(key: &str, value: &Value) -> ValidationResult<Vec<Vec<Filter>>> {
        let invalid = |message: &str| ValidationError::InvalidModifier {
            modifier: key.to_string(),
            message: message.to_string(),
        };

        let branches = value
            .as_array()
            .ok_or_else(|| invalid("expected a list of constraint mappings"))?;
        if branches.is_empty() {
            return Err(invalid("expected at least one branch"));
        }

        branches
            .iter()
            .map(|branch| -> ValidationResult<Vec<Filter>> {
                let entries = branch
                    .as_object()
                    .ok_or_else(|| invalid("each branch must be a constraint mapping"))?;
                entries
                    .iter()
                    .map(|(k, v)| match QueryEntry::classify(k, v)? {
                        QueryEntry::Filter(filter) => Ok(filter),
                        QueryEntry::Modifier(_) => {
                            Err(invalid("modifiers are not allowed inside a branch"))
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// `1`
    Ascending,
    /// `-1`
    Descending,
}

impl SortDirection {
    fn parse(field: &str, value: &Value) -> ValidationResult<Self> {
        let direction = match value {
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(SortDirection::Ascending),
                Some(-1) => Some(SortDirection::Descending),
                _ => None,
            },
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "1" | "asc" => Some(SortDirection::Ascending),
                "-1" | "desc" => Some(SortDirection::Descending),
                _ => None,
            },
            _ => None,
        };

        direction.ok_or_else(|| ValidationError::InvalidModifier {
            modifier: "$sort".to_string(),
            message: format!("direction for '{field}' must be 1 or -1, got {value}"),
        })
    }

    /// Returns the engine keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// One sort key; the first directive is the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    /// Field to sort on.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortDirective {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// The `$suggest` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestTerm {
    /// Free text to complete.
    pub term: String,
    /// Suggester dictionary to use; the engine default when absent.
    pub dictionary: Option<String>,
    /// Rebuild the suggester before answering.
    pub build: bool,
    /// Maximum suggestions to return.
    pub count: Option<usize>,
}

impl SuggestTerm {
    /// A plain term against the default dictionary.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            dictionary: None,
            build: false,
            count: None,
        }
    }

    /// Selects a dictionary.
    pub fn with_dictionary(mut self, dictionary: impl Into<String>) -> Self {
        self.dictionary = Some(dictionary.into());
        self
    }

    fn parse(value: &Value) -> ValidationResult<Self> {
        let invalid = |message: &str| ValidationError::InvalidModifier {
            modifier: "$suggest".to_string(),
            message: message.to_string(),
        };

        match value {
            Value::String(term) => Ok(Self::new(term.clone())),
            Value::Object(map) => {
                let term = map
                    .get("q")
                    .or_else(|| map.get("term"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("missing 'q' or 'term'"))?;
                let dictionary = match map.get("dictionary") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(d)) => Some(d.clone()),
                    Some(_) => return Err(invalid("'dictionary' must be a string")),
                };
                let build = match map.get("build") {
                    None | Some(Value::Null) => false,
                    Some(Value::Bool(b)) => *b,
                    Some(_) => return Err(invalid("'build' must be a boolean")),
                };
                let count = match map.get("count") {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(parse_count("$suggest", v)?),
                };
                Ok(Self {
                    term: term.to_string(),
                    dictionary,
                    build,
                    count,
                })
            }
            _ => Err(invalid("expected a term or a suggest mapping")),
        }
    }
}

/// A reserved top-level modifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    /// `$limit`
    Limit(usize),
    /// `$skip`
    Skip(usize),
    /// `$sort`
    Sort(Vec<SortDirective>),
    /// `$select`
    Select(Vec<String>),
    /// `$suggest`
    Suggest(SuggestTerm),
    /// `$facet`: JSON facet block passed through verbatim.
    Facet(Value),
    /// `$params`: raw engine parameters passed through verbatim.
    Params(Map<String, Value>),
}

/// One entry of a generic query mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEntry {
    /// A reserved modifier.
    Modifier(Modifier),
    /// A field constraint or logical combinator.
    Filter(Filter),
}

impl QueryEntry {
    /// Classifies one `key: value` pair.
    pub fn classify(key: &str, value: &Value) -> ValidationResult<Self> {
        let invalid = |message: &str| ValidationError::InvalidModifier {
            modifier: key.to_string(),
            message: message.to_string(),
        };

        let modifier = match key {
            "$limit" => Modifier::Limit(parse_count(key, value)?),
            "$skip" => Modifier::Skip(parse_count(key, value)?),
            "$sort" => {
                let keys = value
                    .as_object()
                    .ok_or_else(|| invalid("expected a field-to-direction mapping"))?;
                let directives = keys
                    .iter()
                    .map(|(field, direction)| {
                        Ok(SortDirective {
                            field: field.clone(),
                            direction: SortDirection::parse(field, direction)?,
                        })
                    })
                    .collect::<ValidationResult<Vec<_>>>()?;
                Modifier::Sort(directives)
            }
            "$select" => {
                let fields = value
                    .as_array()
                    .ok_or_else(|| invalid("expected a list of field names"))?;
                let fields = fields
                    .iter()
                    .map(|f| {
                        f.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| invalid("field names must be strings"))
                    })
                    .collect::<ValidationResult<Vec<_>>>()?;
                Modifier::Select(fields)
            }
            "$suggest" => Modifier::Suggest(SuggestTerm::parse(value)?),
            "$facet" => {
                if !value.is_object() {
                    return Err(invalid("expected a facet mapping"));
                }
                Modifier::Facet(value.clone())
            }
            "$params" => Modifier::Params(
                value
                    .as_object()
                    .cloned()
                    .ok_or_else(|| invalid("expected a parameter mapping"))?,
            ),
            "$or" => {
                let branches = Filter::parse_branches(key, value)?;
                return Ok(QueryEntry::Filter(Filter::Or(branches)));
            }
            "$and" => {
                let branches = Filter::parse_branches(key, value)?;
                return Ok(QueryEntry::Filter(Filter::And(branches)));
            }
            _ if key.starts_with('$') => return Err(invalid("unknown modifier")),
            field => {
                let constraint = FieldConstraint::parse(field, value)?;
                return Ok(QueryEntry::Filter(Filter::Field(constraint)));
            }
        };

        Ok(QueryEntry::Modifier(modifier))
    }
}

/// Parses a non-negative count given as a number or numeric string.
fn parse_count(modifier: &str, value: &Value) -> ValidationResult<usize> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ValidationError::InvalidModifier {
        modifier: modifier.to_string(),
        message: format!("expected a non-negative integer, got {value}"),
    })
}

/// A generic query, with modifiers already separated from filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericQuery {
    /// Filters, all of which must hold, in the order given.
    pub filters: Vec<Filter>,
    /// Requested page size.
    pub limit: Option<usize>,
    /// Requested offset.
    pub skip: Option<usize>,
    /// Sort keys, primary first.
    pub sort: Vec<SortDirective>,
    /// Fields to return; all fields when `None`.
    pub select: Option<Vec<String>>,
    /// Autosuggest request, if any.
    pub suggest: Option<SuggestTerm>,
    /// JSON facet block.
    pub facet: Option<Value>,
    /// Raw engine parameters.
    pub params: Option<Map<String, Value>>,
}

impl GenericQuery {
    /// Creates an empty query (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a generic query document.
    ///
    /// Top-level keys other than `query` and `$`-prefixed modifiers belong to
    /// the calling framework and are ignored.
    pub fn from_value(value: &Value) -> ValidationResult<Self> {
        let root = value.as_object().ok_or_else(|| ValidationError::InvalidQuery {
            message: "expected a mapping".to_string(),
        })?;

        let mut query = Self::new();
        for (key, entry) in root {
            if key == "query" {
                match entry {
                    Value::Null => {}
                    Value::Object(constraints) => {
                        for (k, v) in constraints {
                            query.apply(QueryEntry::classify(k, v)?);
                        }
                    }
                    _ => {
                        return Err(ValidationError::InvalidQuery {
                            message: "'query' must be a mapping".to_string(),
                        });
                    }
                }
            } else if key.starts_with('$') {
                query.apply(QueryEntry::classify(key, entry)?);
            }
        }
        Ok(query)
    }

    /// Folds one classified entry into the query.
    pub fn apply(&mut self, entry: QueryEntry) {
        match entry {
            QueryEntry::Filter(filter) => self.filters.push(filter),
            QueryEntry::Modifier(Modifier::Limit(limit)) => self.limit = Some(limit),
            QueryEntry::Modifier(Modifier::Skip(skip)) => self.skip = Some(skip),
            QueryEntry::Modifier(Modifier::Sort(sort)) => self.sort = sort,
            QueryEntry::Modifier(Modifier::Select(select)) => self.select = Some(select),
            QueryEntry::Modifier(Modifier::Suggest(suggest)) => self.suggest = Some(suggest),
            QueryEntry::Modifier(Modifier::Facet(facet)) => self.facet = Some(facet),
            QueryEntry::Modifier(Modifier::Params(params)) => self.params = Some(params),
        }
    }

    /// Adds an equality constraint.
    pub fn with_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push(Filter::Field(FieldConstraint {
            field: field.into(),
            condition: Condition::Equals(value),
        }));
        self
    }

    /// Adds an exact term constraint, used for unique key lookups.
    pub fn with_term(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.push(Filter::Field(FieldConstraint {
            field: field.into(),
            condition: Condition::Term(value),
        }));
        self
    }

    /// Adds a comparison, merging it into an existing comparison constraint on
    /// the same field.
    pub fn with_comparison(mut self, field: impl Into<String>, comparison: Comparison) -> Self {
        let field = field.into();
        let existing = self.filters.iter_mut().find_map(|filter| match filter {
            Filter::Field(FieldConstraint {
                field: f,
                condition: Condition::Compare(comparisons),
            }) if *f == field => Some(comparisons),
            _ => None,
        });

        match existing {
            Some(comparisons) => comparisons.push(comparison),
            None => self.filters.push(Filter::Field(FieldConstraint {
                field,
                condition: Condition::Compare(vec![comparison]),
            })),
        }
        self
    }

    /// Adds an arbitrary filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Appends a sort key.
    pub fn with_sort(mut self, directive: SortDirective) -> Self {
        self.sort.push(directive);
        self
    }

    /// Restricts the returned fields.
    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Turns the query into an autosuggest request.
    pub fn with_suggest(mut self, suggest: SuggestTerm) -> Self {
        self.suggest = Some(suggest);
        self
    }

    /// Attaches a JSON facet block.
    pub fn with_facet(mut self, facet: Value) -> Self {
        self.facet = Some(facet);
        self
    }

    /// Returns true if this is an autosuggest request.
    pub fn is_suggest(&self) -> bool {
        self.suggest.is_some()
    }
}
