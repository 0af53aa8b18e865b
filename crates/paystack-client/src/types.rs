//! Paystack response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard Paystack response: `{status, message, data, meta?}`.
///
/// `meta` carries pagination (`perPage`, `page`, `pageCount`, `total`, ...)
/// on list endpoints and `nextStep` hints on errors; it is kept as raw JSON
/// because Paystack is not consistent about its field types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaystackResponse {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl PaystackResponse {
    /// Interpret any JSON document as a response envelope.
    ///
    /// Bodies that do not follow the envelope are wrapped whole into `data`,
    /// with `status` taken from the HTTP status.
    pub fn from_json(value: Value, http_success: bool) -> Self {
        match serde_json::from_value::<PaystackResponse>(value.clone()) {
            Ok(response) => response,
            Err(_) => Self {
                status: http_success,
                message: String::new(),
                data: value,
                meta: None,
            },
        }
    }

    /// Page metadata value, if present
    pub fn meta_field(&self, key: &str) -> Option<&Value> {
        self.meta.as_ref().and_then(|meta| meta.get(key))
    }
}
