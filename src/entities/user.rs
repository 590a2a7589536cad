//! Known users of the admin interface

use crate::core::field::{FieldSpec, FieldType};
use crate::impl_entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub token: String,

    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl_entity!(User, "users", {
    "id" => FieldSpec::required(FieldType::String),
    "email" => FieldSpec::required(FieldType::String),
    "isAdmin" => FieldSpec::required(FieldType::Boolean),
    "token" => FieldSpec::optional(FieldType::String, ""),
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Entity;
    use serde_json::{Value, json};

    #[test]
    fn test_missing_is_admin_is_reported() {
        let Value::Object(record) = json!({"id": "pqr", "email": "dot@com", "token": "357"}) else {
            unreachable!()
        };
        let err = User::from_record(record).unwrap_err();
        assert_eq!(err.to_string(), "Missing: isAdmin");
    }

    #[test]
    fn test_token_defaults_to_empty() {
        let Value::Object(record) = json!({"id": "pqr", "email": "dot@com", "isAdmin": false}) else {
            unreachable!()
        };
        let user = User::from_record(record).unwrap();
        assert_eq!(user.token, "");
        assert!(!user.is_admin);
    }
}
