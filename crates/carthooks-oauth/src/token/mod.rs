//! `OAuth2` token payloads and the credentials derived from them.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// How far ahead of expiry a token is considered due for refresh, in seconds.
pub const REFRESH_WINDOW_SECS: i64 = 300;

/// Token payload returned in the `data` field of a token endpoint envelope.
///
/// Only `access_token` is required. Other members of an unexpected shape
/// decode to their defaults; `expires_in` also accepts numeric strings.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    #[serde(default, deserialize_with = "lenient_string")]
    pub access_token: String,
    /// Token type.
    #[serde(default, deserialize_with = "lenient_string")]
    pub token_type: String,
    /// Lifetime in seconds, counted from issuance.
    #[serde(
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_in: Option<i64>,
    /// Refresh token.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<String>,
    /// Scope.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub scope: Option<String>,
}

fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_opt_string(deserializer).map(Option::unwrap_or_default)
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        // Float casts saturate.
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl TokenResponse {
    /// Decodes a token payload from an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a token object.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .finish()
    }
}

/// Credentials recorded from the most recent successful token exchange.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credentials {
    /// Bearer token presented on API calls.
    pub access_token: String,
    /// Token type (expected to be "Bearer").
    pub token_type: String,
    /// Lifetime in seconds as returned by the server.
    pub expires_in: i64,
    /// Expiry instant, set only when `expires_in > 0` and representable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token for obtaining new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scope granted by the authorization server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Credentials {
    /// Creates credentials with no expiry or refresh token.
    #[must_use]
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_in: 0,
            expires_at: None,
            refresh_token: None,
            scope: None,
        }
    }

    /// Builds credentials from a token payload issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload carries no access token.
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Result<Self> {
        if response.access_token.is_empty() {
            return Err(Error::MissingAccessToken);
        }

        let expires_in = response.expires_in.unwrap_or(0);
        let expires_at = if expires_in > 0 {
            Duration::try_seconds(expires_in).and_then(|d| issued_at.checked_add_signed(d))
        } else {
            None
        };

        Ok(Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in,
            expires_at,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            scope: response.scope,
        })
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the expiration time.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Classifies these credentials relative to `now`.
    #[must_use]
    pub fn freshness_at(&self, now: DateTime<Utc>) -> Freshness {
        match self.expires_at {
            None => Freshness::Unknown,
            Some(exp) if exp <= now => Freshness::Expired,
            Some(exp) if exp <= now + Duration::seconds(REFRESH_WINDOW_SECS) => {
                Freshness::NearExpiry
            }
            Some(_) => Freshness::Fresh,
        }
    }

    /// Returns true if the token expires within the refresh window of `now`.
    ///
    /// Credentials without a recorded expiry never need a refresh.
    #[must_use]
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.freshness_at(now),
            Freshness::NearExpiry | Freshness::Expired
        )
    }

    /// Returns true if the token needs a refresh right now.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(Utc::now())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .finish()
    }
}

/// Whether the stored access token is usable without refreshing first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No exchange has completed yet.
    Uninitialized,
    /// Valid beyond the refresh window.
    Fresh,
    /// Valid, but expires within the refresh window.
    NearExpiry,
    /// Expiry instant has passed.
    Expired,
    /// Credentials exist but no expiry was recorded.
    Unknown,
}

impl Freshness {
    /// Classifies optional credentials relative to `now`.
    #[must_use]
    pub fn of(credentials: Option<&Credentials>, now: DateTime<Utc>) -> Self {
        credentials.map_or(Self::Uninitialized, |c| c.freshness_at(now))
    }
}
