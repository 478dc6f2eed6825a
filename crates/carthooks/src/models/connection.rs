//! Hooklet connections, their logs and usage.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Created, not yet active.
    Pending,
    /// Active.
    Active,
    /// Deactivated.
    Inactive,
}

impl ConnectionStatus {
    /// Returns the wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Active => 1,
            Self::Inactive => 2,
        }
    }

    /// Parses a wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Active),
            2 => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Returns the name used by update requests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Severity of a connection log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLogStatus {
    /// Something was created.
    Created,
    /// Something was updated.
    Updated,
    /// Warning.
    Warn,
    /// Error.
    Error,
}

impl ConnectionLogStatus {
    /// Returns the wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Created => 1,
            Self::Updated => 2,
            Self::Warn => 3,
            Self::Error => 4,
        }
    }

    /// Parses a wire code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Created),
            2 => Some(Self::Updated),
            3 => Some(Self::Warn),
            4 => Some(Self::Error),
            _ => None,
        }
    }
}

/// A hooklet connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connection {
    /// Connection identifier.
    pub id: u64,
    /// Tenant identifier.
    pub tenant_id: u64,
    /// App identifier.
    pub app_id: u64,
    /// Hooklet identifier.
    pub hooklet_id: u64,
    /// Developer client identifier.
    pub dev_client_id: u64,
    /// Title.
    pub title: String,
    /// Raw status code, see [`ConnectionStatus`].
    pub status: u8,
    /// Icon URL.
    pub icon_url: String,
    /// Description.
    pub description: String,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

impl Connection {
    /// Returns the decoded status, if known.
    #[must_use]
    pub const fn status(&self) -> Option<ConnectionStatus> {
        ConnectionStatus::from_code(self.status)
    }
}

/// A connection log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionLog {
    /// Entry identifier.
    pub id: u64,
    /// Tenant identifier.
    pub tenant_id: u64,
    /// Connection identifier.
    pub connection_id: u64,
    /// Raw status code, see [`ConnectionLogStatus`].
    pub status: u8,
    /// Message.
    pub message: String,
    /// Creation time.
    pub created_at: String,
}

/// A usage report of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionUsage {
    /// Entry identifier.
    pub id: u64,
    /// Tenant identifier.
    pub tenant_id: u64,
    /// Connection identifier.
    pub connection_id: u64,
    /// Usage amount.
    pub usage: i64,
    /// Creation time.
    pub created_at: String,
}

/// Body of a create-connection request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConnectionRequest {
    /// Hooklet identifier.
    pub hooklet_id: String,
    /// Title.
    pub title: String,
    /// Icon URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Vendor-side task identifier.
    pub vendor_task_id: String,
}

/// Body of an update-connection request. Empty fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConnectionRequest {
    /// Title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// `"active"` or `"inactive"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Icon URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
}

impl UpdateConnectionRequest {
    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: ConnectionStatus) -> Self {
        self.status = status.as_str().to_string();
        self
    }
}

/// Body of a create-connection-log request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConnectionLogRequest {
    /// Status code.
    pub status: u8,
    /// Message.
    pub message: String,
}

impl CreateConnectionLogRequest {
    /// Creates a log request.
    #[must_use]
    pub fn new(status: ConnectionLogStatus, message: impl Into<String>) -> Self {
        Self {
            status: status.code(),
            message: message.into(),
        }
    }
}

/// Body of a create-connection-usage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConnectionUsageRequest {
    /// Usage amount.
    pub usage: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        for status in [
            ConnectionStatus::Pending,
            ConnectionStatus::Active,
            ConnectionStatus::Inactive,
        ] {
            assert_eq!(ConnectionStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ConnectionStatus::from_code(9), None);
        assert_eq!(ConnectionLogStatus::from_code(4), Some(ConnectionLogStatus::Error));
        assert_eq!(ConnectionLogStatus::from_code(0), None);
    }

    #[test]
    fn test_update_request_omits_empty_fields() {
        let request = UpdateConnectionRequest::default().with_status(ConnectionStatus::Inactive);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"status": "inactive"})
        );
    }

    #[test]
    fn test_log_request() {
        let request = CreateConnectionLogRequest::new(ConnectionLogStatus::Warn, "slow");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"status": 3, "message": "slow"})
        );
    }
}
