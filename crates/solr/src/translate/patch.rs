//! Atomic-update document builder.

use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult};
use crate::types::PatchSpec;

/// The shared, id-less part of an atomic-update document.
///
/// Each field maps to its operator wrapper, e.g.
/// `{"status": {"set": "inactive"}, "tags": {"add": "x", "remove": "y"}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicUpdate {
    fields: Map<String, Value>,
}

impl AtomicUpdate {
    /// Returns the operator-wrapped fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Builds the document for one id. The id field comes first.
    pub fn for_id(&self, id_field: &str, id: &Value) -> Value {
        let mut document = Map::with_capacity(self.fields.len() + 1);
        document.insert(id_field.to_string(), id.clone());
        for (field, operations) in &self.fields {
            document.insert(field.clone(), operations.clone());
        }
        Value::Object(document)
    }

    /// Builds one document per id, in id order.
    pub fn fan_out(&self, id_field: &str, ids: &[Value]) -> Vec<Value> {
        ids.iter().map(|id| self.for_id(id_field, id)).collect()
    }
}

/// Builds the atomic-update wrapper for a patch.
///
/// The unique key itself cannot be patched, and one operation may appear
/// only once per field.
pub fn build_patch(spec: &PatchSpec, id_field: &str) -> ValidationResult<AtomicUpdate> {
    if spec.is_empty() {
        return Err(ValidationError::InvalidQuery {
            message: "patch data changes nothing".to_string(),
        });
    }

    let mut fields = Map::new();
    for patch in spec.fields() {
        let mut operations = Map::new();
        for operation in &patch.operations {
            if patch.field == id_field {
                return Err(ValidationError::InvalidPatchValue {
                    field: patch.field.clone(),
                    operation: operation.name().to_string(),
                    message: "the unique key field cannot be patched".to_string(),
                });
            }
            if operations
                .insert(operation.name().to_string(), operation.value())
                .is_some()
            {
                return Err(ValidationError::InvalidPatchValue {
                    field: patch.field.clone(),
                    operation: operation.name().to_string(),
                    message: "operation given more than once".to_string(),
                });
            }
        }
        fields.insert(patch.field.clone(), Value::Object(operations));
    }

    Ok(AtomicUpdate { fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_id_document() {
        let spec = PatchSpec::from_value(&json!({
            "set": { "status": "inactive" },
            "inc": { "views": 1 },
            "tags": { "add": "new", "remove": "old" }
        }))
        .unwrap();

        let update = build_patch(&spec, "id").unwrap();

        assert_eq!(
            update.for_id("id", &json!("doc-1")),
            json!({
                "id": "doc-1",
                "status": { "set": "inactive" },
                "views": { "inc": 1 },
                "tags": { "add": "new", "remove": "old" }
            })
        );
    }

    #[test]
    fn test_set_null_clears_field() {
        let spec = PatchSpec::new().unset("note");
        let update = build_patch(&spec, "id").unwrap();
        assert_eq!(update.fields()["note"], json!({ "set": null }));
    }

    #[test]
    fn test_fan_out_preserves_id_order() {
        let spec = PatchSpec::new().set("status", json!("inactive"));
        let update = build_patch(&spec, "key").unwrap();

        let documents = update.fan_out("key", &[json!("b"), json!("a")]);
        assert_eq!(
            documents,
            vec![
                json!({ "key": "b", "status": { "set": "inactive" } }),
                json!({ "key": "a", "status": { "set": "inactive" } }),
            ]
        );
        assert!(update.fan_out("key", &[]).is_empty());
    }

    #[test]
    fn test_id_field_cannot_be_patched() {
        let spec = PatchSpec::new().set("id", json!("other"));
        assert!(matches!(
            build_patch(&spec, "id"),
            Err(ValidationError::InvalidPatchValue { .. })
        ));
    }

    #[test]
    fn test_duplicate_operation_rejected() {
        let spec = PatchSpec::from_value(&json!({
            "add": { "tags": "a" },
            "tags": { "add": "b" }
        }))
        .unwrap();
        assert!(build_patch(&spec, "id").is_err());
    }

    #[test]
    fn test_empty_patch_rejected() {
        assert!(build_patch(&PatchSpec::new(), "id").is_err());
    }
}
