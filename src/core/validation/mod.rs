//! Validation engine
//!
//! Pure functions that check a candidate record against a [`FieldSchema`]
//! and back-fill declared defaults, plus the extractor that turns request
//! bodies into records.
//!
//! [`FieldSchema`]: crate::core::field::FieldSchema

pub mod extractor;
pub mod validators;

pub use extractor::JsonRecord;
pub use validators::{apply_defaults, validate};
