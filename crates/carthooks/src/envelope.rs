//! Decoding of the JSON response envelope shared by all endpoints.
//!
//! ```text
//! {"data": ..., "error": {"message": "...", "code": "..."}, "trace_id": "...", "meta": {...}}
//! ```
//!
//! The HTTP status code is not consulted: the `error` member alone decides
//! whether a call failed. A body that is not an envelope object becomes a
//! failed response carrying the raw body as its message.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::response::ApiResponse;
use crate::transport::RawResponse;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<EnvelopeError>,
    #[serde(default)]
    trace_id: Option<String>,
    #[serde(default)]
    meta: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    message: String,
    #[serde(default, deserialize_with = "code_as_string")]
    code: Option<String>,
}

// Codes are documented as strings, but numeric codes are accepted.
fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decodes a raw HTTP response into an [`ApiResponse`].
#[must_use]
pub fn parse(raw: &RawResponse) -> ApiResponse {
    parse_body(&raw.body)
}

/// Decodes a response body into an [`ApiResponse`].
#[must_use]
pub fn parse_body(body: &str) -> ApiResponse {
    let envelope = match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value::<Envelope>(value).ok(),
        _ => None,
    };

    let Some(envelope) = envelope else {
        return ApiResponse::failure(body);
    };

    let response = match envelope.error {
        Some(error) => ApiResponse::failure(error.message).with_error_code(error.code),
        None => ApiResponse::success(envelope.data),
    };

    response
        .with_trace_id(envelope.trace_id)
        .with_meta(envelope.meta)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let response = parse_body(
            r#"{"data":{"id":1,"title":"X","created_at":0,"updated_at":0,"creator":1,"fields":{}}}"#,
        );
        assert!(response.is_success());
        assert!(!response.has_error());
        assert_eq!(response.data().unwrap()["title"], json!("X"));
    }

    #[test]
    fn test_error_envelope() {
        let response = parse_body(
            r#"{"error":{"message":"Item not found","code":"NOT_FOUND"},"trace_id":"abc123"}"#,
        );
        assert!(!response.is_success());
        assert_eq!(response.error_message(), Some("Item not found"));
        assert_eq!(response.error_code(), Some("NOT_FOUND"));
        assert_eq!(response.trace_id(), Some("abc123"));
        assert!(response.data().is_none());
    }

    #[test]
    fn test_numeric_error_code() {
        let response = parse_body(r#"{"error":{"message":"nope","code":403}}"#);
        assert_eq!(response.error_code(), Some("403"));
    }

    #[test]
    fn test_malformed_body_is_raw_error() {
        let body = "<html>502 Bad Gateway</html>";
        let response = parse_body(body);
        assert!(!response.is_success());
        assert_eq!(response.error_message(), Some(body));
    }

    #[test]
    fn test_non_object_json_is_raw_error() {
        for body in ["[1,2,3]", "\"text\"", "null", "42", ""] {
            let response = parse_body(body);
            assert!(!response.is_success(), "{body}");
            assert_eq!(response.error_message(), Some(body));
        }
    }

    #[test]
    fn test_unexpected_member_shape_is_raw_error() {
        let body = r#"{"error":"boom"}"#;
        let response = parse_body(body);
        assert!(!response.is_success());
        assert_eq!(response.error_message(), Some(body));
    }

    #[test]
    fn test_null_data_is_success_without_payload() {
        let response = parse_body(r#"{"data":null,"trace_id":"t"}"#);
        assert!(response.is_success());
        assert!(response.data().is_none());
        assert_eq!(response.trace_id(), Some("t"));
    }

    #[test]
    fn test_meta_passed_through_on_both_paths() {
        let ok = parse_body(r#"{"data":[],"meta":{"pagination":{"page":1}}}"#);
        assert_eq!(ok.meta().unwrap()["pagination"]["page"], json!(1));

        let failed = parse_body(r#"{"error":{"message":"x"},"meta":{"k":"v"}}"#);
        assert_eq!(failed.meta().unwrap()["k"], json!("v"));
    }
}
