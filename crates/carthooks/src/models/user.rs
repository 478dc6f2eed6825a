//! User types.

use serde::{Deserialize, Serialize};

/// The authenticated user, as returned by `GET /v1/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    /// User identifier.
    pub user_id: u64,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Tenant identifier.
    pub tenant_id: u64,
    /// Tenant name.
    pub tenant_name: String,
    /// Whether the user administers the tenant.
    pub is_admin: bool,
    /// Granted scopes.
    pub scope: Vec<String>,
}

impl UserInfo {
    /// Returns true if `scope` was granted.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }
}

/// A user looked up by id or token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// User identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
