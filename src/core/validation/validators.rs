//! Schema checks applied to every record before it is written or hydrated
//!
//! The checks run in a fixed order and stop at the first violated category:
//! disallowed fields, then missing required fields, then wrong types.

use crate::core::error::{TypeMismatch, ValidationError};
use crate::core::field::{FieldSchema, value_type_name};
use crate::core::store::Record;

/// Keys of `record` that the schema does not declare, sorted
pub fn disallowed_fields(record: &Record, schema: &FieldSchema) -> Vec<String> {
    let mut disallowed: Vec<String> = record
        .keys()
        .filter(|key| !schema.contains(key))
        .cloned()
        .collect();
    disallowed.sort();
    disallowed
}

/// Required schema fields absent from `record`, sorted
pub fn missing_fields(record: &Record, schema: &FieldSchema) -> Vec<String> {
    let mut missing: Vec<String> = schema
        .required_fields()
        .filter(|name| !record.contains_key(*name))
        .map(str::to_string)
        .collect();
    missing.sort();
    missing
}

/// Declared fields whose value does not carry the declared type, sorted by field
pub fn type_mismatches(record: &Record, schema: &FieldSchema) -> Vec<TypeMismatch> {
    let mut mismatches: Vec<TypeMismatch> = record
        .iter()
        .filter_map(|(key, value)| {
            let spec = schema.get(key)?;
            if spec.field_type.matches(value) {
                None
            } else {
                Some(TypeMismatch {
                    field: key.clone(),
                    actual: value_type_name(value).to_string(),
                    expected: spec.field_type.name().to_string(),
                })
            }
        })
        .collect();
    mismatches.sort();
    mismatches
}

/// Validate `record` against `schema`
pub fn validate(record: &Record, schema: &FieldSchema) -> Result<(), ValidationError> {
    let disallowed = disallowed_fields(record, schema);
    if !disallowed.is_empty() {
        return Err(ValidationError::NotAllowed { fields: disallowed });
    }

    let missing = missing_fields(record, schema);
    if !missing.is_empty() {
        return Err(ValidationError::Missing { fields: missing });
    }

    let mismatches = type_mismatches(record, schema);
    if !mismatches.is_empty() {
        return Err(ValidationError::Type { mismatches });
    }

    Ok(())
}

/// Insert the declared default for every schema field absent from `record`
///
/// Present values are never replaced, including explicit nulls.
pub fn apply_defaults(mut record: Record, schema: &FieldSchema) -> Record {
    for (name, spec) in schema.iter() {
        if !record.contains_key(name) {
            record.insert(name.to_string(), spec.default.clone());
        }
    }
    record
}
