//! Issued admin tokens
//!
//! The set of `token` values in this collection is the admin bearer-token
//! allow-list. Tokens never expire; a token is valid while it is stored.

use crate::core::field::{FieldSpec, FieldType};
use crate::impl_entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub token: String,
}

impl_entity!(Token, "tokens", {
    "id" => FieldSpec::required(FieldType::String),
    "token" => FieldSpec::required(FieldType::String),
});
