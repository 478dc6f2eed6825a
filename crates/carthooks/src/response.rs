//! Uniform outcome of an API call and typed extraction of its payload.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Pagination, Record};

/// Failure to extract a typed value from an [`ApiResponse`].
///
/// Raised after the call itself completed, when the payload does not match
/// what the caller asked for.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The call was not successful.
    #[error("result is not successful: {message}")]
    NotSuccessful {
        /// Error message of the response.
        message: String,
    },

    /// The response carried no data.
    #[error("no data in result")]
    NoData,

    /// The payload does not have the requested shape.
    #[error("failed to decode data: {0}")]
    DecodeMismatch(#[from] serde_json::Error),

    /// The payload is not the requested scalar type.
    #[error("data is not {expected}")]
    WrongScalarType {
        /// Name of the requested type.
        expected: &'static str,
    },
}

/// Outcome of a single API call.
///
/// Produced once per call by the envelope parser and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    success: bool,
    data: Option<Value>,
    error_message: Option<String>,
    error_code: Option<String>,
    trace_id: Option<String>,
    meta: Option<Map<String, Value>>,
}

impl ApiResponse {
    /// Creates a successful response.
    #[must_use]
    pub const fn success(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error_message: None,
            error_code: None,
            trace_id: None,
            meta: None,
        }
    }

    /// Creates a failed response.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error_message: Some(message.into()),
            error_code: None,
            trace_id: None,
            meta: None,
        }
    }

    /// Sets the machine-readable error code.
    #[must_use]
    pub fn with_error_code(mut self, code: Option<String>) -> Self {
        self.error_code = code;
        self
    }

    /// Sets the trace id.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id;
        self
    }

    /// Sets the metadata map.
    #[must_use]
    pub fn with_meta(mut self, meta: Option<Map<String, Value>>) -> Self {
        self.meta = meta;
        self
    }

    /// Returns true if the envelope carried no error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the payload of a successful response.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Consumes the response and returns its payload.
    #[must_use]
    pub fn into_data(self) -> Option<Value> {
        self.data
    }

    /// Returns the error message of a failed response.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the error code sent by the server, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    /// Returns the trace id for diagnostics.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Returns the metadata map.
    #[must_use]
    pub const fn meta(&self) -> Option<&Map<String, Value>> {
        self.meta.as_ref()
    }

    /// Returns true if the call failed or an error message is present.
    #[must_use]
    pub fn has_error(&self) -> bool {
        !self.success || self.error_message.as_deref().is_some_and(|m| !m.is_empty())
    }

    fn ensure_success(&self) -> Result<(), ExtractError> {
        if self.success {
            Ok(())
        } else {
            Err(ExtractError::NotSuccessful {
                message: self.error_message.clone().unwrap_or_default(),
            })
        }
    }

    /// Decodes the payload into `T` by re-encoding the untyped tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the call failed, carried no data, or the data
    /// does not decode into `T`.
    pub fn extract_as<T: DeserializeOwned>(&self) -> Result<T, ExtractError> {
        self.ensure_success()?;
        let data = self.data.as_ref().ok_or(ExtractError::NoData)?;
        let encoded = serde_json::to_vec(data)?;
        Ok(serde_json::from_slice(&encoded)?)
    }

    /// Decodes the payload as a list of records.
    ///
    /// # Errors
    ///
    /// See [`Self::extract_as`].
    pub fn extract_records(&self) -> Result<Vec<Record>, ExtractError> {
        self.extract_as()
    }

    /// Decodes the payload as a single record.
    ///
    /// # Errors
    ///
    /// See [`Self::extract_as`].
    pub fn extract_record(&self) -> Result<Record, ExtractError> {
        self.extract_as()
    }

    /// Returns the payload as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the call failed or the payload is not a string.
    pub fn extract_string(&self) -> Result<String, ExtractError> {
        self.ensure_success()?;
        match &self.data {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ExtractError::WrongScalarType { expected: "a string" }),
        }
    }

    /// Returns the payload as an integer.
    ///
    /// Accepts JSON integers, floats without a fractional part, and strings
    /// holding a base-10 integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the call failed or the payload is not an integer.
    pub fn extract_int(&self) -> Result<i64, ExtractError> {
        self.ensure_success()?;
        let wrong = ExtractError::WrongScalarType { expected: "an integer" };
        match &self.data {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral_f64))
                .ok_or(wrong),
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| wrong),
            _ => Err(wrong),
        }
    }

    /// Returns the payload as a boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if the call failed or the payload is not a boolean.
    pub fn extract_bool(&self) -> Result<bool, ExtractError> {
        self.ensure_success()?;
        match self.data {
            Some(Value::Bool(b)) => Ok(b),
            _ => Err(ExtractError::WrongScalarType { expected: "a boolean" }),
        }
    }

    /// Decodes `meta.pagination`.
    ///
    /// Returns `Ok(None)` when there is no metadata or no pagination entry.
    ///
    /// # Errors
    ///
    /// Returns an error only if the pagination entry is malformed.
    pub fn extract_pagination(&self) -> Result<Option<Pagination>, ExtractError> {
        let Some(pagination) = self
            .meta
            .as_ref()
            .and_then(|m| m.get("pagination"))
            .filter(|p| !p.is_null())
        else {
            return Ok(None);
        };
        let encoded = serde_json::to_vec(pagination)?;
        Ok(Some(serde_json::from_slice(&encoded)?))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
fn integral_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64)
        .then_some(f as i64)
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self
            .data
            .as_ref()
            .map_or_else(|| "null".to_string(), ToString::to_string);
        write!(
            f,
            "ApiResponse(success={}, data={}, error={})",
            self.success,
            data,
            self.error_message.as_deref().unwrap_or("")
        )
    }
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
    use crate::envelope::parse_body;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_extract_record() {
        let response = parse_body(
            r#"{"data":{"id":1,"title":"X","created_at":0,"updated_at":0,"creator":1,"fields":{}}}"#,
        );
        let record = response.extract_record().unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.title, "X");
        assert_eq!(record.creator, 1);
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_extract_record_with_null_members() {
        let response = parse_body(
            r#"{"data":{"id":1,"title":null,"created_at":0,"updated_at":0,"creator":1,"fields":null}}"#,
        );
        let record = response.extract_record().unwrap();
        assert_eq!(record.id, 1);
        assert!(record.title.is_empty());
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_record_round_trip() {
        let original = json!({
            "id": 42,
            "title": "Order #42",
            "created_at": 1700000000,
            "updated_at": 1700000500,
            "creator": 7,
            "fields": {"f_1": "text", "f_2": [1, 2], "f_3": {"nested": true}, "f_4": null}
        });
        let response = ApiResponse::success(Some(original.clone()));
        let record = response.extract_record().unwrap();
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded, original);
    }

    #[test]
    fn test_extract_records() {
        let response = ApiResponse::success(Some(json!([
            {"id": 1, "title": "a", "created_at": 0, "updated_at": 0, "creator": 1, "fields": {}},
            {"id": 2, "title": "b", "created_at": 0, "updated_at": 0, "creator": 1, "fields": {"x": 1}}
        ])));
        let records = response.extract_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].fields["x"], json!(1));
    }

    #[test]
    fn test_extract_as_custom_shape() {
        #[derive(Deserialize)]
        struct Upload {
            token: String,
        }
        let response = ApiResponse::success(Some(json!({"token": "u1", "url": "https://x"})));
        let upload: Upload = response.extract_as().unwrap();
        assert_eq!(upload.token, "u1");
    }

    #[test]
    fn test_extract_failures() {
        let failed = ApiResponse::failure("boom");
        assert!(matches!(
            failed.extract_record(),
            Err(ExtractError::NotSuccessful { message }) if message == "boom"
        ));

        let empty = ApiResponse::success(None);
        assert!(matches!(empty.extract_record(), Err(ExtractError::NoData)));

        let mismatch = ApiResponse::success(Some(json!("not a record")));
        assert!(matches!(
            mismatch.extract_record(),
            Err(ExtractError::DecodeMismatch(_))
        ));
    }

    #[test]
    fn test_extract_string_and_bool() {
        assert_eq!(
            ApiResponse::success(Some(json!("hello"))).extract_string().unwrap(),
            "hello"
        );
        assert!(ApiResponse::success(Some(json!(true))).extract_bool().unwrap());
        assert!(matches!(
            ApiResponse::success(Some(json!(1))).extract_bool(),
            Err(ExtractError::WrongScalarType { .. })
        ));
        assert!(matches!(
            ApiResponse::success(Some(json!(1))).extract_string(),
            Err(ExtractError::WrongScalarType { .. })
        ));
        assert!(matches!(
            ApiResponse::failure("x").extract_string(),
            Err(ExtractError::NotSuccessful { .. })
        ));
    }

    #[test]
    fn test_extract_int_accepts_numbers_and_numeric_strings() {
        assert_eq!(ApiResponse::success(Some(json!(42))).extract_int().unwrap(), 42);
        assert_eq!(ApiResponse::success(Some(json!(-7))).extract_int().unwrap(), -7);
        assert_eq!(ApiResponse::success(Some(json!(3.0))).extract_int().unwrap(), 3);
        assert_eq!(
            ApiResponse::success(Some(json!("9007199254740993"))).extract_int().unwrap(),
            9_007_199_254_740_993
        );
    }

    #[test]
    fn test_extract_int_rejects_other_shapes() {
        for value in [json!("12abc"), json!(""), json!(1.5), json!(true), json!({"n": 1})] {
            assert!(
                matches!(
                    ApiResponse::success(Some(value.clone())).extract_int(),
                    Err(ExtractError::WrongScalarType { .. })
                ),
                "{value}"
            );
        }
        assert!(matches!(
            ApiResponse::success(None).extract_int(),
            Err(ExtractError::WrongScalarType { .. })
        ));
    }

    #[test]
    fn test_has_error() {
        assert!(!ApiResponse::success(None).has_error());
        assert!(ApiResponse::failure("").has_error());
        assert!(ApiResponse::failure("x").has_error());
    }

    #[test]
    fn test_pagination() {
        let response = parse_body(
            r#"{"data":[],"meta":{"pagination":{"page":2,"pageSize":20,"total":45,"totalPages":3}}}"#,
        );
        let pagination = response.extract_pagination().unwrap().unwrap();
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.page_size, 20);
        assert_eq!(pagination.total, 45);
        assert_eq!(pagination.total_pages, 3);
    }

    #[test]
    fn test_pagination_absent_or_malformed() {
        assert!(ApiResponse::success(None).extract_pagination().unwrap().is_none());
        assert!(parse_body(r#"{"data":1,"meta":{}}"#)
            .extract_pagination()
            .unwrap()
            .is_none());
        assert!(matches!(
            parse_body(r#"{"data":1,"meta":{"pagination":"page 1"}}"#).extract_pagination(),
            Err(ExtractError::DecodeMismatch(_))
        ));
    }

    #[test]
    fn test_display() {
        let rendered = ApiResponse::failure("bad").to_string();
        assert_eq!(rendered, "ApiResponse(success=false, data=null, error=bad)");
    }
}
