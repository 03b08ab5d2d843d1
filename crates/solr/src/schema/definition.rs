//! Field definitions, desired and observed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{UpstreamError, ValidationError, ValidationResult};

/// A desired field as written in configuration.
///
/// Either a bare type name (`"text_general"`) or a full definition with
/// engine properties (`{"type": "pint", "stored": true}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    /// Only the field type; engine defaults apply to every property.
    Type(String),
    /// Field type plus explicit properties.
    Definition(FieldDefinition),
}

/// A field type with explicit engine properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Engine field type (`string`, `pint`, `text_general`, ...).
    #[serde(rename = "type")]
    pub field_type: String,

    /// Engine properties such as `indexed`, `stored`, `multiValued`.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// A resolved field definition: name, type and properties.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Field name.
    pub name: String,
    /// Engine field type.
    pub field_type: String,
    /// Engine properties.
    pub properties: Map<String, Value>,
}

impl SchemaField {
    /// Creates a field with no explicit properties.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            properties: Map::new(),
        }
    }

    /// Adds a property.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Resolves a configured spec into a field.
    pub fn from_spec(name: &str, spec: &FieldSpec) -> Self {
        match spec {
            FieldSpec::Type(field_type) => Self::new(name, field_type.clone()),
            FieldSpec::Definition(def) => Self {
                name: name.to_string(),
                field_type: def.field_type.clone(),
                properties: def.properties.clone(),
            },
        }
    }

    /// Returns true if `observed` satisfies this desired definition.
    ///
    /// Types must be equal. A desired property is compared only when the
    /// engine reports it; the field listing omits properties left at the
    /// field type's default.
    pub fn matches(&self, observed: &SchemaField) -> bool {
        self.field_type == observed.field_type
            && self.properties.iter().all(|(key, value)| {
                observed
                    .properties
                    .get(key)
                    .is_none_or(|observed_value| observed_value == value)
            })
    }

    /// Renders the field as an engine `add-field` payload.
    pub fn to_native(&self) -> Value {
        let mut native = Map::new();
        native.insert("name".to_string(), json!(self.name));
        native.insert("type".to_string(), json!(self.field_type));
        for (key, value) in &self.properties {
            native.insert(key.clone(), value.clone());
        }
        Value::Object(native)
    }

    /// Reads one entry of the engine's field listing.
    fn from_native(entry: &Value) -> Option<Self> {
        let object = entry.as_object()?;
        let name = object.get("name")?.as_str()?;
        let field_type = object.get("type")?.as_str()?;
        let properties = object
            .iter()
            .filter(|(key, _)| key.as_str() != "name" && key.as_str() != "type")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            properties,
        })
    }
}

/// The desired schema: field name to definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDefinition {
    fields: BTreeMap<String, FieldSpec>,
}

impl SchemaDefinition {
    /// Creates an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Merges `other` into this definition; fields in `other` win.
    pub fn merge(&mut self, other: SchemaDefinition) {
        self.fields.extend(other.fields);
    }

    /// Returns the number of desired fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are desired.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the resolved desired fields in name order.
    pub fn fields(&self) -> Vec<SchemaField> {
        self.fields
            .iter()
            .map(|(name, spec)| SchemaField::from_spec(name, spec))
            .collect()
    }

    /// Checks that every field has a name and a type.
    pub fn validate(&self) -> ValidationResult<()> {
        for field in self.fields() {
            if field.name.trim().is_empty() {
                return Err(ValidationError::InvalidConfig {
                    message: "schema field names must not be empty".to_string(),
                });
            }
            if field.field_type.trim().is_empty() {
                return Err(ValidationError::InvalidConfig {
                    message: format!("schema field '{}' has no type", field.name),
                });
            }
        }
        Ok(())
    }
}

/// The schema currently reported by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedSchema {
    fields: BTreeMap<String, SchemaField>,
}

impl ObservedSchema {
    /// Builds an observed schema from resolved fields.
    pub fn from_fields(fields: impl IntoIterator<Item = SchemaField>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|field| (field.name.clone(), field))
                .collect(),
        }
    }

    /// Parses the engine's field listing (`{"fields": [...]}`).
    pub fn from_response(body: &Value) -> Result<Self, UpstreamError> {
        let entries = body
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::malformed("describe", "missing 'fields' list"))?;

        let mut fields = Vec::with_capacity(entries.len());
        for entry in entries {
            let field = SchemaField::from_native(entry).ok_or_else(|| {
                UpstreamError::malformed("describe", format!("unreadable field entry: {entry}"))
            })?;
            fields.push(field);
        }
        Ok(Self::from_fields(fields))
    }

    /// Returns the observed field with this name.
    pub fn get(&self, name: &str) -> Option<&SchemaField> {
        self.fields.get(name)
    }

    /// Returns the number of observed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the engine reported no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the observed field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
