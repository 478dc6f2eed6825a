//! Request options and token-like responses of the resource endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page selection for [`QueryOptions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOptions {
    /// Page number.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page: u64,
    /// Items per page.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page_size: u64,
    /// Ask the server to count matching items.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub with_count: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Filtering, sorting and projection for item queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Page selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationOptions>,
    /// Field filters.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub filters: Map<String, Value>,
    /// Sort keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<String>,
    /// Fields to return.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Options for locking an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOptions {
    /// Lock duration in seconds.
    #[serde(rename = "lockTimeout", default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Caller-chosen lock id.
    #[serde(rename = "lockId", default, skip_serializing_if = "Option::is_none")]
    pub lock_id: Option<String>,
    /// Who holds the lock.
    #[serde(rename = "lockSubject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Options for a submission token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionTokenOptions {
    /// Callback notified on submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Where the submitter is sent afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Fields the submitter may fill in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Options for an update token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTokenOptions {
    /// Lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Fields the holder may change.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Submission token response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionToken {
    /// Token.
    pub token: String,
    /// Form URL.
    pub url: String,
    /// Expiry time.
    pub expires_at: String,
}

/// Update token response.
pub type UpdateToken = SubmissionToken;

/// Upload token response.
pub type UploadToken = SubmissionToken;

/// Registration of a watch endpoint for change notifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchDataOptions {
    /// Queue or webhook URL receiving notifications.
    pub endpoint_url: String,
    /// Endpoint kind, e.g. `"sqs"`.
    pub endpoint_type: String,
    /// Name of the watch.
    pub name: String,
    /// App identifier.
    pub app_id: u64,
    /// Collection identifier.
    pub collection_id: u64,
    /// Only notify for records matching these filters.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub filters: Map<String, Value>,
    /// Lifetime of the watch in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
    /// Replay changes since this Unix time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_start_time: Option<i64>,
}

/// Watch registration response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchDataResponse {
    /// Watch identifier.
    pub watch_id: String,
    /// Watch status.
    pub status: String,
}

/// Request for an authorization code on behalf of the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeCodeRequest {
    /// Client the code is issued to.
    pub client_id: String,
    /// Redirect URI registered for the client.
    pub redirect_uri: String,
    /// Opaque CSRF state.
    pub state: String,
    /// Tenant to authorize, if not the current one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_tenant_id: Option<u64>,
}

/// Authorization code response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizeCodeResponse {
    /// Redirect URL carrying the code.
    pub redirect_url: String,
}
