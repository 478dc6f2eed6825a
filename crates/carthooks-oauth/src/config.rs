//! `OAuth2` client configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable `OAuth2` intent of a client: who it is and how it refreshes.
///
/// Distinct from the credentials derived at runtime. Replacing a
/// configuration never carries over a refresh token the new value does not
/// supply itself.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OAuthConfig {
    /// Client identifier.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Refresh token seeded by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Whether `ensure_fresh` may refresh the token on demand.
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
}

const fn default_auto_refresh() -> bool {
    true
}

impl OAuthConfig {
    /// Creates a configuration with auto-refresh enabled.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: None,
            auto_refresh: true,
        }
    }

    /// Seeds a refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        let refresh_token = refresh_token.into();
        self.refresh_token = (!refresh_token.is_empty()).then_some(refresh_token);
        self
    }

    /// Enables or disables refresh-on-demand.
    #[must_use]
    pub const fn with_auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auto_refresh = auto_refresh;
        self
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("auto_refresh", &self.auto_refresh)
            .finish()
    }
}
