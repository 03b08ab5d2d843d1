//! Field-update intents for atomic updates.
//!
//! Supported operations follow the engine's atomic-update semantics:
//!
//! - `set` – set or replace a value, or remove it when the new value is `null`
//! - `add` – add a value to a multivalued field
//! - `remove` – remove a value (or a list of values) from a multivalued field
//! - `removeregex` – remove values matching a regular expression
//! - `inc` – increment a numeric field (a negative amount decrements)

use serde_json::{Number, Value};

use crate::error::{ValidationError, ValidationResult};

/// One atomic-update operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    /// Replace the value; `Value::Null` clears the field.
    Set(Value),
    /// Append to a multivalued field.
    Add(Value),
    /// Remove matching values from a multivalued field.
    Remove(Value),
    /// Remove values matching one or more regular expressions.
    RemoveRegex(Value),
    /// Increment by a signed amount.
    Inc(Number),
}

impl PatchOperation {
    /// Names accepted by [`PatchOperation::parse`].
    pub const NAMES: [&'static str; 5] = ["set", "add", "remove", "removeregex", "inc"];

    /// Parses `operation: value` for `field`.
    pub fn parse(field: &str, operation: &str, value: &Value) -> ValidationResult<Self> {
        let invalid = |message: &str| ValidationError::InvalidPatchValue {
            field: field.to_string(),
            operation: operation.to_string(),
            message: message.to_string(),
        };

        match operation {
            "set" => Ok(PatchOperation::Set(value.clone())),
            "add" | "remove" => {
                if value.is_null() {
                    return Err(invalid("value must not be null"));
                }
                if operation == "add" {
                    Ok(PatchOperation::Add(value.clone()))
                } else {
                    Ok(PatchOperation::Remove(value.clone()))
                }
            }
            "removeregex" => {
                let valid = match value {
                    Value::String(_) => true,
                    Value::Array(patterns) => !patterns.is_empty() && patterns.iter().all(Value::is_string),
                    _ => false,
                };
                if !valid {
                    return Err(invalid("expected a pattern or a list of patterns"));
                }
                Ok(PatchOperation::RemoveRegex(value.clone()))
            }
            "inc" => match value {
                Value::Number(n) => Ok(PatchOperation::Inc(n.clone())),
                _ => Err(invalid("expected a number")),
            },
            _ => Err(ValidationError::UnknownPatchOperation {
                operation: operation.to_string(),
            }),
        }
    }

    /// Returns the engine's name for this operation.
    pub fn name(&self) -> &'static str {
        match self {
            PatchOperation::Set(_) => "set",
            PatchOperation::Add(_) => "add",
            PatchOperation::Remove(_) => "remove",
            PatchOperation::RemoveRegex(_) => "removeregex",
            PatchOperation::Inc(_) => "inc",
        }
    }

    /// Returns the operand.
    pub fn value(&self) -> Value {
        match self {
            PatchOperation::Set(v)
            | PatchOperation::Add(v)
            | PatchOperation::Remove(v)
            | PatchOperation::RemoveRegex(v) => v.clone(),
            PatchOperation::Inc(n) => Value::Number(n.clone()),
        }
    }
}

/// All operations targeting one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPatch {
    /// Field name.
    pub field: String,
    /// Operations, in the order given.
    pub operations: Vec<PatchOperation>,
}

/// A set of field-update intents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchSpec {
    fields: Vec<FieldPatch>,
}

impl PatchSpec {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses patch data.
    ///
    /// Accepts the operation-keyed form (`{"set": {"status": "inactive"}}`)
    /// and the field-keyed form (`{"status": {"set": "inactive"}}`). A plain
    /// value in the field-keyed form means `set`.
    pub fn from_value(value: &Value) -> ValidationResult<Self> {
        let entries = value
            .as_object()
            .ok_or_else(|| ValidationError::InvalidQuery {
                message: "patch data must be a mapping".to_string(),
            })?;

        let mut spec = Self::new();
        for (key, entry) in entries {
            match entry {
                Value::Object(targets) if PatchOperation::NAMES.contains(&key.as_str()) => {
                    for (field, operand) in targets {
                        spec.push(field, PatchOperation::parse(field, key, operand)?);
                    }
                }
                Value::Object(operations) => {
                    if operations.is_empty() {
                        return Err(ValidationError::InvalidPatchValue {
                            field: key.clone(),
                            operation: "set".to_string(),
                            message: "empty operation mapping".to_string(),
                        });
                    }
                    for (operation, operand) in operations {
                        spec.push(key, PatchOperation::parse(key, operation, operand)?);
                    }
                }
                plain => spec.push(key, PatchOperation::Set(plain.clone())),
            }
        }
        Ok(spec)
    }

    fn push(&mut self, field: &str, operation: PatchOperation) {
        match self.fields.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.operations.push(operation),
            None => self.fields.push(FieldPatch {
                field: field.to_string(),
                operations: vec![operation],
            }),
        }
    }

    /// Adds an operation to `field`.
    pub fn with(mut self, field: &str, operation: PatchOperation) -> Self {
        self.push(field, operation);
        self
    }

    /// `set` a value.
    pub fn set(self, field: &str, value: Value) -> Self {
        self.with(field, PatchOperation::Set(value))
    }

    /// Clear a field.
    pub fn unset(self, field: &str) -> Self {
        self.with(field, PatchOperation::Set(Value::Null))
    }

    /// `add` a value.
    pub fn add(self, field: &str, value: Value) -> Self {
        self.with(field, PatchOperation::Add(value))
    }

    /// `remove` a value.
    pub fn remove(self, field: &str, value: Value) -> Self {
        self.with(field, PatchOperation::Remove(value))
    }

    /// `removeregex` a pattern.
    pub fn remove_regex(self, field: &str, pattern: &str) -> Self {
        self.with(field, PatchOperation::RemoveRegex(Value::String(pattern.to_string())))
    }

    /// `inc` by an amount.
    pub fn inc(self, field: &str, amount: impl Into<Number>) -> Self {
        self.with(field, PatchOperation::Inc(amount.into()))
    }

    /// Returns the per-field operations in the order given.
    pub fn fields(&self) -> &[FieldPatch] {
        &self.fields
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_keyed_form() {
        let spec = PatchSpec::from_value(&json!({
            "set": { "status": "inactive" },
            "inc": { "views": -1 }
        }))
        .unwrap();

        assert_eq!(
            spec,
            PatchSpec::new()
                .set("status", json!("inactive"))
                .inc("views", -1)
        );
    }

    #[test]
    fn test_field_keyed_form_and_plain_values() {
        let spec = PatchSpec::from_value(&json!({
            "tags": { "add": "new", "remove": "old" },
            "title": "Renamed",
            "note": null
        }))
        .unwrap();

        let fields = spec.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(
            fields[0].operations,
            vec![
                PatchOperation::Add(json!("new")),
                PatchOperation::Remove(json!("old")),
            ]
        );
        assert_eq!(fields[1].operations, vec![PatchOperation::Set(json!("Renamed"))]);
        assert_eq!(fields[2].operations, vec![PatchOperation::Set(Value::Null)]);
    }

    #[test]
    fn test_operations_on_same_field_merge() {
        let spec = PatchSpec::from_value(&json!({
            "add": { "tags": "a" },
            "remove": { "tags": "b" }
        }))
        .unwrap();
        assert_eq!(spec.fields().len(), 1);
        assert_eq!(spec.fields()[0].operations.len(), 2);
    }

    #[test]
    fn test_invalid_operands() {
        assert!(PatchSpec::from_value(&json!({ "inc": { "views": "1" } })).is_err());
        assert!(PatchSpec::from_value(&json!({ "add": { "tags": null } })).is_err());
        assert!(PatchSpec::from_value(&json!({ "removeregex": { "tags": 4 } })).is_err());
        assert!(PatchSpec::from_value(&json!({ "removeregex": { "tags": [] } })).is_err());
        assert!(PatchSpec::from_value(&json!({ "tags": {} })).is_err());
        assert!(PatchSpec::from_value(&json!([1])).is_err());
    }

    #[test]
    fn test_unknown_operation() {
        let err = PatchSpec::from_value(&json!({ "tags": { "append": "x" } })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownPatchOperation {
                operation: "append".to_string()
            }
        );
    }

    #[test]
    fn test_remove_regex_accepts_pattern_list() {
        let spec = PatchSpec::from_value(&json!({ "removeregex": { "tags": ["^a", "b$"] } }))
            .unwrap();
        assert_eq!(spec.fields()[0].operations[0].name(), "removeregex");
    }
}
