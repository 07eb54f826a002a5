//! Transport-agnostic request handlers.
//!
//! # Responsibility
//! - Read string request parameters and map them to service calls.
//! - Wrap every outcome in one `ApiResponse` envelope.
//!
//! # Invariants
//! - Handlers never panic; failures become `code = -1` responses.
//! - Response data never carries password hashes.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

mod content_api;
mod user_api;

pub use content_api::{show, KNOWN_COLLECTIONS};
pub use user_api::{register, sign_in};

pub const CODE_SUCCESS: i32 = 0;
pub const CODE_FAILURE: i32 = -1;

/// Response envelope returned by every handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// `0` on success, `-1` on failure.
    pub code: i32,
    /// Human-readable outcome.
    pub message: String,
    pub data: Value,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            code: CODE_SUCCESS,
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            code: CODE_FAILURE,
            message: message.into(),
            data: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }

    /// Serialized JSON form of the envelope.
    pub fn to_json(&self) -> String {
        // Serializing a `Value`-only struct cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Query-string style request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    values: BTreeMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `insert`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Trimmed value of `name`; blank values read as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn get_owned(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    /// Comma-separated list value of `name`, blank items skipped.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiResponse, RequestParams};
    use serde_json::json;

    #[test]
    fn params_treat_blank_values_as_absent() {
        let params: RequestParams = [("name", "  "), ("city", " 黑木崖 ")].into_iter().collect();
        assert_eq!(params.get("name"), None);
        assert_eq!(params.get("city"), Some("黑木崖"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn params_split_list_values() {
        let params = RequestParams::new().with("tag", "东方教主, ,千秋万代");
        assert_eq!(params.list("tag"), vec!["东方教主", "千秋万代"]);
        assert!(params.list("other").is_empty());
    }

    #[test]
    fn response_serializes_envelope() {
        let response = ApiResponse::success("ok", json!({"id": "x"}));
        let value: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(value, json!({"code": 0, "message": "ok", "data": {"id": "x"}}));

        let failure = ApiResponse::failure("nope");
        assert!(!failure.is_success());
        assert_eq!(failure.data, serde_json::Value::Null);
    }
}
