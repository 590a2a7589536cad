//! Field schemas
//!
//! A [`FieldSchema`] maps every allowed field of an entity to a [`FieldSpec`]
//! describing whether it is required, the JSON type it must carry and the
//! default injected when it is absent.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// The primitive JSON types a field may be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
    Integer,
    Float,
    Array,
    Object,
}

impl FieldType {
    /// Name used in validation messages
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    /// Exact match: an integer is not a float and a boolean is not an integer
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Float, Value::Number(n)) => n.is_f64(),
            (FieldType::Array, Value::Array(_)) => true,
            (FieldType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Zero value used as the default of required fields
    pub fn zero_value(&self) -> Value {
        match self {
            FieldType::String => Value::String(String::new()),
            FieldType::Boolean => Value::Bool(false),
            FieldType::Integer => Value::from(0),
            FieldType::Float => Value::from(0.0),
            FieldType::Array => Value::Array(Vec::new()),
            FieldType::Object => Value::Object(serde_json::Map::new()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime type name of a JSON value, as reported in type mismatches
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Descriptor of a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub required: bool,
    pub field_type: FieldType,
    pub default: Value,
}

impl FieldSpec {
    /// A required field; its default is the zero value of its type
    pub fn required(field_type: FieldType) -> Self {
        Self {
            required: true,
            field_type,
            default: field_type.zero_value(),
        }
    }

    /// An optional field back-filled with `default` when absent
    pub fn optional(field_type: FieldType, default: impl Into<Value>) -> Self {
        Self {
            required: false,
            field_type,
            default: default.into(),
        }
    }
}

/// Immutable mapping from field name to descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    fields: IndexMap<String, FieldSpec>,
}

impl FieldSchema {
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldSpec)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate over fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of the required fields, in declaration order
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name)
    }
}
