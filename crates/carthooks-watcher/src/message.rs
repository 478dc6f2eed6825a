//! Change events carried in queue messages.
//!
//! ```text
//! {"version": "1", "meta": {...}, "payload": {"id": 123, ...}}
//! ```

use carthooks::{EventMeta, Record};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    version: String,
    #[serde(default)]
    meta: Map<String, Value>,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

/// A change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Message format version.
    pub version: String,
    /// Routing metadata as sent.
    pub meta: Map<String, Value>,
    /// The changed record. Always carries an `id`.
    pub payload: Map<String, Value>,
}

impl ChangeEvent {
    /// Parses a queue message body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if the body is not an event object
    /// and [`Error::MissingField`] if the payload or its `id` is missing.
    pub fn parse(body: &str) -> Result<Self> {
        let body: MessageBody = serde_json::from_str(body)
            .map_err(|e| Error::InvalidMessage(format!("failed to parse message body: {e}")))?;
        let payload = body.payload.ok_or(Error::MissingField("payload"))?;
        if !payload.contains_key("id") {
            return Err(Error::MissingField("payload.id"));
        }

        Ok(Self {
            version: body.version,
            meta: body.meta,
            payload,
        })
    }

    /// Returns the record id, if it is numeric.
    #[must_use]
    pub fn record_id(&self) -> Option<u64> {
        match self.payload.get("id")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Decodes the metadata, if it has the documented shape.
    #[must_use]
    pub fn event_meta(&self) -> Option<EventMeta> {
        serde_json::from_value(Value::Object(self.meta.clone())).ok()
    }

    /// Decodes the payload as a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if the payload is not a record.
    pub fn record(&self) -> Result<Record> {
        serde_json::from_value(Value::Object(self.payload.clone()))
            .map_err(|e| Error::InvalidMessage(format!("payload is not a record: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use carthooks::EventCode;
    use serde_json::json;

    #[test]
    fn test_parse_event() {
        let body = json!({
            "version": "1",
            "meta": {
                "tenant_id": 3,
                "collection_id": 20,
                "event": "collection.item.updated",
                "trigger_type": "api"
            },
            "payload": {"id": 42, "title": "Order", "fields": {"total": 10}}
        })
        .to_string();

        let event = ChangeEvent::parse(&body).unwrap();
        assert_eq!(event.version, "1");
        assert_eq!(event.record_id(), Some(42));
        assert_eq!(event.event_meta().unwrap().event, EventCode::RecordUpdated);

        let record = event.record().unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.field("total"), Some(&json!(10)));
    }

    #[test]
    fn test_string_id_accepted() {
        let event = ChangeEvent::parse(r#"{"payload":{"id":"77"}}"#).unwrap();
        assert_eq!(event.record_id(), Some(77));
        assert!(event.event_meta().is_none());
    }

    #[test]
    fn test_missing_payload() {
        let err = ChangeEvent::parse(r#"{"meta":{}}"#).unwrap_err();
        assert!(matches!(err, Error::MissingField("payload")));

        let err = ChangeEvent::parse(r#"{"payload":null}"#).unwrap_err();
        assert!(matches!(err, Error::MissingField("payload")));
    }

    #[test]
    fn test_missing_id() {
        let err = ChangeEvent::parse(r#"{"payload":{"title":"x"}}"#).unwrap_err();
        assert!(matches!(err, Error::MissingField("payload.id")));
    }

    #[test]
    fn test_not_json() {
        let err = ChangeEvent::parse("hello").unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));

        let err = ChangeEvent::parse(r#"{"payload":[1]}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
    }
}
