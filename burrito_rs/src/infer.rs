//! Structural type inference over sampled JSON.
//!
//! Objects become named [`TypeRecord`]s registered in a run-wide
//! [`TypeRegistry`]; scalars map straight to a [`TypeKind`]; arrays are typed
//! from their first element. Recursion depth is bounded by `serde_json`'s own
//! nesting limit on the parsed sample.

use crate::diagnostics::Diagnostics;
use crate::error::InferenceError;
use serde_json::{Map, Value};

/// The inferred type of a field or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Boolean,
    Integer,
    Float,
    String,
    /// RFC 3339 timestamp.
    DateTime,
    /// Base64 `data:` URI.
    Bytes,
    /// Hyphenated UUID.
    Uuid,
    List(Box<TypeKind>),
    /// Reference to a record in the registry, by name.
    Record(String),
    /// Placeholder for values with no structure to infer from (empty arrays, nulls).
    Empty,
}

impl TypeKind {
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Innermost non-list kind.
    #[must_use]
    pub fn element(&self) -> &Self {
        match self {
            Self::List(inner) => inner.element(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// The JSON key, verbatim.
    pub name: String,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRecord {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

/// Every record inferred during one run, in registration order.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    records: Vec<TypeRecord>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// `requested` with `_` appended until no registered record has that name.
    #[must_use]
    pub fn unique_name(&self, requested: &str) -> String {
        let mut name: String = requested.to_string();
        while self.contains(&name) {
            name.push('_');
        }
        name
    }

    /// Registers `record`, renaming it first if its name is taken. Returns the final name.
    pub fn register(&mut self, mut record: TypeRecord) -> String {
        record.name = self.unique_name(&record.name);
        let name: String = record.name.clone();
        tracing::debug!(record = %name, fields = record.fields.len(), "Registered data type.");
        self.records.push(record);
        name
    }

    #[must_use]
    pub fn records(&self) -> &[TypeRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<TypeRecord> {
        self.records
    }
}

/// Name for a record nested under `root_name` at key `field_name`.
/// Characters that cannot appear in an identifier become `_`.
fn nested_record_name(root_name: &str, field_name: &str) -> String {
    let segment: String = field_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{root_name}_{segment}")
}

/// Picks the most specific string kind the literal satisfies.
fn classify_string(s: &str) -> TypeKind {
    if chrono::DateTime::parse_from_rfc3339(s).is_ok() {
        TypeKind::DateTime
    } else if s.len() == 36 && uuid::Uuid::parse_str(s).is_ok() {
        TypeKind::Uuid
    } else if s.starts_with("data:") && s.contains(";base64,") {
        TypeKind::Bytes
    } else {
        TypeKind::String
    }
}

/// Walks JSON samples, registering every object it meets.
pub struct Inferrer<'a> {
    registry: &'a mut TypeRegistry,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Inferrer<'a> {
    #[must_use]
    pub fn new(registry: &'a mut TypeRegistry, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            registry,
            diagnostics,
        }
    }

    /// The sink this inferrer reports to.
    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        self.diagnostics
    }

    /// Builds and registers a record named `name` from `object`. Nested records are
    /// registered before their parent. Returns the record's final name.
    pub fn infer_object(&mut self, name: &str, object: &Map<String, Value>) -> String {
        let mut fields: Vec<FieldSpec> = Vec::with_capacity(object.len());
        for (key, value) in object {
            if let Some(field) = self.infer_field(name, key, value) {
                fields.push(field);
            }
        }
        self.registry.register(TypeRecord {
            name: name.to_string(),
            fields,
        })
    }

    /// Infers the field `field_name` of record `root_name`. Returns `None` (with a
    /// warning) when the value has no representable type; the rest of the record is
    /// unaffected.
    pub fn infer_field(
        &mut self,
        root_name: &str,
        field_name: &str,
        value: &Value,
    ) -> Option<FieldSpec> {
        let record_name: String = nested_record_name(root_name, field_name);
        let kind: TypeKind = self.infer_kind(&record_name, field_name, value)?;
        Some(FieldSpec {
            name: field_name.to_string(),
            kind,
        })
    }

    /// `record_name` is used if `value` (or, for arrays, its first element) is an object.
    fn infer_kind(&mut self, record_name: &str, label: &str, value: &Value) -> Option<TypeKind> {
        match value {
            Value::Array(items) => {
                let Some(first) = items.first() else {
                    self.diagnostics.warning(format!(
                        "Cannot generate a type from an empty array for '{label}'. Leaving an empty list type here."
                    ));
                    return Some(TypeKind::List(Box::new(TypeKind::Empty)));
                };
                let element: TypeKind = self.infer_kind(record_name, label, first)?;
                Some(TypeKind::List(Box::new(element)))
            }
            Value::Object(object) => Some(TypeKind::Record(self.infer_object(record_name, object))),
            Value::Bool(_) => Some(TypeKind::Boolean),
            Value::Number(number) => {
                if number.is_i64() {
                    Some(TypeKind::Integer)
                } else if number.is_u64() {
                    self.diagnostics.warning(format!(
                        "Unsupported integer {number} for '{label}' in '{record_name}', out of range. Skipped property."
                    ));
                    None
                } else {
                    Some(TypeKind::Float)
                }
            }
            Value::String(s) => Some(classify_string(s)),
            Value::Null => {
                self.diagnostics.warning(format!(
                    "Null value for '{label}', no type information available. Leaving an unknown object type here."
                ));
                Some(TypeKind::Empty)
            }
        }
    }

    /// Types a probe response body: a JSON object is a single record named
    /// `type_name`; a JSON array is a list typed from its first element.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::InvalidResponse` if the body is neither, or if the
    /// first element of an array has no representable type.
    pub fn infer_response(
        &mut self,
        type_name: &str,
        url: &str,
        body: &str,
    ) -> Result<TypeKind, InferenceError> {
        if let Ok(object) = serde_json::from_str::<Map<String, Value>>(body) {
            return Ok(TypeKind::Record(self.infer_object(type_name, &object)));
        }
        let Ok(items) = serde_json::from_str::<Vec<Value>>(body) else {
            return Err(InferenceError::InvalidResponse {
                url: url.to_string(),
            });
        };
        let Some(first) = items.first() else {
            self.diagnostics.warning(format!(
                "Route '{url}' returned an empty array, cannot derive '{type_name}'. Leaving an empty list type here."
            ));
            return Ok(TypeKind::List(Box::new(TypeKind::Empty)));
        };
        let element: TypeKind = self
            .infer_kind(type_name, type_name, first)
            .ok_or_else(|| InferenceError::InvalidResponse {
                url: url.to_string(),
            })?;
        Ok(TypeKind::List(Box::new(element)))
    }

    /// Builds the sent-data record for a POST route from its example payload.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::UnsupportedPayload` if the payload is not a JSON object.
    pub fn infer_example(
        &mut self,
        type_name: &str,
        payload: &Value,
    ) -> Result<String, InferenceError> {
        let Value::Object(object) = payload else {
            return Err(InferenceError::UnsupportedPayload {
                type_name: type_name.to_string(),
            });
        };
        Ok(self.infer_object(type_name, object))
    }
}
