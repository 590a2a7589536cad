//! `scheme://base64(json)` encoding for structured environment values

use crate::core::error::ApiError;
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use serde_json::Value;

const NOT_BASE64: &str = "The config URI provided is not base64 encoded.";
const NOT_JSON: &str = "The config URI provided is not valid JSON.";

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Encode a JSON value as `scheme://<url-safe base64 of its JSON text>`
pub fn encode_json_uri(scheme: &str, value: &Value) -> String {
    format!("{}://{}", scheme, URL_SAFE.encode(value.to_string()))
}

/// Decode a `scheme://payload` URI into its scheme and JSON value
///
/// Both the standard and the URL-safe alphabets are accepted, with or
/// without padding.
pub fn decode_json_uri(uri: &str) -> Result<(String, Value), ApiError> {
    let (scheme, payload) = uri.split_once("://").unwrap_or(("", uri));

    let bytes = STANDARD_LENIENT
        .decode(payload)
        .or_else(|_| URL_SAFE_LENIENT.decode(payload))
        .map_err(|_| ApiError::InvalidJsonUri {
            message: NOT_BASE64.to_string(),
        })?;

    let value = serde_json::from_slice(&bytes).map_err(|_| ApiError::InvalidJsonUri {
        message: NOT_JSON.to_string(),
    })?;

    Ok((scheme.to_string(), value))
}
