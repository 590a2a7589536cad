//! Entity trait defining the core abstraction for all domain objects
//!
//! An entity is a schema-validated, identified record stored in one
//! collection. Entities carry no persistence logic of their own: the
//! generic [`EntityService`](crate::core::service::EntityService) does the
//! CRUD work for any type implementing [`Entity`].

use crate::core::error::{ApiError, ValidationError};
use crate::core::field::FieldSchema;
use crate::core::store::Record;
use crate::core::validation::{apply_defaults, validate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Base trait for all domain objects.
///
/// Two entities are equal iff their serialized field sets are equal, which
/// the derived `PartialEq` of a plain serde struct provides.
///
/// Use [`impl_entity!`](crate::impl_entity) rather than implementing this by hand.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static
{
    /// Name of the collection holding this entity
    const COLLECTION: &'static str;

    /// Declared fields of this entity, including `id`
    fn schema() -> &'static FieldSchema;

    /// Validate a raw record, fill in defaults and build the entity
    fn from_record(record: Record) -> Result<Self, ApiError> {
        let schema = Self::schema();
        validate(&record, schema)?;
        let record = apply_defaults(record, schema);
        hydrate(record)
    }

    /// Serialize back to a raw record
    fn to_record(&self) -> Result<Record, ApiError> {
        match serde_json::to_value(self).map_err(anyhow::Error::from)? {
            Value::Object(record) => Ok(record),
            other => Err(anyhow::anyhow!(
                "{} serialized to a non-object value: {}",
                Self::COLLECTION,
                other
            )
            .into()),
        }
    }
}

/// Build an entity from a record that already satisfies its schema
pub fn hydrate<T: DeserializeOwned>(record: Record) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        ValidationError::InvalidBody {
            message: e.to_string(),
        }
        .into()
    })
}

/// Source of fresh entity ids
///
/// Id assignment happens in exactly one place, the entity service's
/// `create`, which asks its generator for a new id.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random 128-bit ids rendered as lowercase, unpadded base32
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        create_uid()
    }
}

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Fresh random id: 16 bytes of a v4 UUID, base32-encoded (26 characters)
pub fn create_uid() -> String {
    base32_lower(uuid::Uuid::new_v4().as_bytes())
}

/// RFC 4648 base32 without padding, lowercase
fn base32_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base32_known_vectors() {
        assert_eq!(base32_lower(b""), "");
        assert_eq!(base32_lower(b"f"), "my");
        assert_eq!(base32_lower(b"fo"), "mzxq");
        assert_eq!(base32_lower(b"foo"), "mzxw6");
        assert_eq!(base32_lower(b"foobar"), "mzxw6ytboi");
    }

    #[test]
    fn test_create_uid_shape() {
        let id = create_uid();
        assert_eq!(id.len(), 26);
        assert!(id.bytes().all(|b| BASE32_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_create_uid_is_fresh() {
        assert_ne!(create_uid(), create_uid());
    }
}
