//! Change-notification messages delivered to a watch endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of change being notified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCode {
    /// An item was created.
    #[serde(rename = "collection.item.created")]
    RecordCreated,
    /// An item was updated.
    #[serde(rename = "collection.item.updated")]
    RecordUpdated,
    /// Any event this client does not know about.
    #[serde(other)]
    Unknown,
}

impl EventCode {
    /// Returns the wire value, or `None` for unknown events.
    #[must_use]
    pub const fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::RecordCreated => Some("collection.item.created"),
            Self::RecordUpdated => Some("collection.item.updated"),
            Self::Unknown => None,
        }
    }
}

/// Routing metadata of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Tenant identifier.
    #[serde(default)]
    pub tenant_id: u64,
    /// Collection identifier.
    #[serde(default)]
    pub collection_id: u64,
    /// Event kind.
    pub event: EventCode,
    /// What triggered the event.
    #[serde(default)]
    pub trigger_type: String,
    /// Name of the trigger.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trigger_name: String,
}

impl EventMeta {
    /// Flattens the metadata into string pairs, e.g. for log or queue attributes.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("tenant_id".to_string(), self.tenant_id.to_string()),
            ("collection_id".to_string(), self.collection_id.to_string()),
            ("trigger_type".to_string(), self.trigger_type.clone()),
            ("trigger_name".to_string(), self.trigger_name.clone()),
        ])
    }
}

/// A versioned event with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Message format version.
    #[serde(default)]
    pub version: String,
    /// Routing metadata.
    pub meta: EventMeta,
    /// Changed record.
    #[serde(default)]
    pub payload: Value,
}
