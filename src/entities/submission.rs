//! Submissions sent in by the public

use crate::core::field::{FieldSpec, FieldType};
use crate::impl_entity;
use serde::{Deserialize, Serialize};

/// A message left by a visitor, moderated before it is shared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub name: String,
    pub message: String,
    pub location: String,

    #[serde(rename = "allowSharing")]
    pub allow_sharing: bool,

    #[serde(rename = "allowSNS")]
    pub allow_sns: bool,

    #[serde(rename = "isApproved")]
    pub is_approved: bool,
}

impl_entity!(Submission, "submissions", {
    "id" => FieldSpec::required(FieldType::String),
    "name" => FieldSpec::required(FieldType::String),
    "message" => FieldSpec::required(FieldType::String),
    "location" => FieldSpec::required(FieldType::String),
    "allowSharing" => FieldSpec::optional(FieldType::Boolean, false),
    "allowSNS" => FieldSpec::optional(FieldType::Boolean, false),
    "isApproved" => FieldSpec::optional(FieldType::Boolean, false),
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Entity;
    use crate::core::error::{ApiError, ValidationError};
    use serde_json::{Value, json};

    fn record(value: Value) -> crate::core::store::Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_from_record_fills_flags() {
        let submission = Submission::from_record(record(json!({
            "id": "abc", "name": "a", "message": "b", "location": "c"
        })))
        .unwrap();
        assert_eq!(submission.id, "abc");
        assert!(!submission.allow_sharing);
        assert!(!submission.allow_sns);
        assert!(!submission.is_approved);
    }

    #[test]
    fn test_round_trip_through_record() {
        let submission = Submission {
            id: "abc".into(),
            name: "a".into(),
            message: "b".into(),
            location: "c".into(),
            allow_sharing: true,
            allow_sns: false,
            is_approved: true,
        };
        let record = submission.to_record().unwrap();
        assert_eq!(record["allowSNS"], json!(false));
        assert_eq!(Submission::from_record(record).unwrap(), submission);
    }

    #[test]
    fn test_from_record_rejects_bad_flag_type() {
        let err = Submission::from_record(record(json!({
            "id": "abc", "name": "a", "message": "b", "location": "c", "isApproved": "yes"
        })))
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::Type { .. })
        ));
    }
}
