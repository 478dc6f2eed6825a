//! Credential store: the active bearer token plus `OAuth2` state.

use carthooks_oauth::{Credentials, GrantType, OAuthConfig, TokenResponse};
use chrono::{DateTime, Utc};

/// Mutable authentication state of one client.
///
/// Not synchronized itself; [`super::TokenManager`] owns it behind a lock.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    access_token: Option<String>,
    config: Option<OAuthConfig>,
    tokens: Option<Credentials>,
}

impl CredentialStore {
    /// Creates a store from a static token and/or `OAuth2` configuration.
    #[must_use]
    pub fn new(access_token: Option<String>, config: Option<OAuthConfig>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            config,
            tokens: None,
        }
    }

    /// Overwrites the bearer token. Expiry and refresh token are untouched.
    pub fn set_token(&mut self, access_token: impl Into<String>) {
        let token = access_token.into();
        self.access_token = (!token.is_empty()).then_some(token);
    }

    /// Returns the bearer token sent on API calls.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Records a successful exchange of `grant_type` issued at `issued_at`.
    ///
    /// A `refresh_token` grant that returns no new refresh token keeps the
    /// one it was made with. Other grants replace the credentials wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload has no access token; the store is
    /// left unchanged.
    pub fn record_exchange_result(
        &mut self,
        payload: TokenResponse,
        grant_type: GrantType,
        issued_at: DateTime<Utc>,
    ) -> carthooks_oauth::Result<&Credentials> {
        let mut credentials = Credentials::from_response(payload, issued_at)?;
        if grant_type == GrantType::RefreshToken && credentials.refresh_token.is_none() {
            credentials.refresh_token = self
                .tokens
                .as_ref()
                .and_then(|t| t.refresh_token.clone());
        }
        self.set_token(credentials.access_token.clone());
        Ok(self.tokens.insert(credentials))
    }

    /// Replaces the credentials wholesale, e.g. from persisted state.
    pub fn restore(&mut self, credentials: Credentials) {
        self.set_token(credentials.access_token.clone());
        self.tokens = Some(credentials);
    }

    /// Returns the credentials of the most recent exchange.
    #[must_use]
    pub const fn current_tokens(&self) -> Option<&Credentials> {
        self.tokens.as_ref()
    }

    /// Returns the `OAuth2` configuration.
    #[must_use]
    pub const fn current_config(&self) -> Option<&OAuthConfig> {
        self.config.as_ref()
    }

    /// Replaces the `OAuth2` configuration without merging.
    pub fn replace_config(&mut self, config: OAuthConfig) {
        self.config = Some(config);
    }

    /// Picks the refresh token to use: explicit, configured, then stored.
    #[must_use]
    pub fn refresh_token_for(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.as_ref().and_then(|c| c.refresh_token.clone()))
            .or_else(|| self.tokens.as_ref().and_then(|t| t.refresh_token.clone()))
            .filter(|t| !t.is_empty())
    }

    /// Returns true if the stored token should be refreshed before use at `now`.
    ///
    /// False without `OAuth2` configuration, with auto-refresh disabled, or
    /// before any expiry has been recorded.
    #[must_use]
    pub fn wants_refresh_at(&self, now: DateTime<Utc>) -> bool {
        let auto_refresh = self.config.as_ref().is_some_and(|c| c.auto_refresh);
        auto_refresh
            && self
                .tokens
                .as_ref()
                .is_some_and(|t| t.needs_refresh_at(now))
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
    use chrono::Duration;

    fn payload(token: &str, refresh: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: token.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: Some(3600),
            refresh_token: refresh.map(str::to_string),
            scope: None,
        }
    }

    #[test]
    fn test_set_token_leaves_credentials() {
        let mut store = CredentialStore::new(None, None);
        store.restore(Credentials::new("a", "Bearer").with_refresh_token("r"));
        store.set_token("b");
        assert_eq!(store.bearer(), Some("b"));
        assert_eq!(store.current_tokens().unwrap().access_token, "a");
        assert_eq!(
            store.current_tokens().unwrap().refresh_token.as_deref(),
            Some("r")
        );
    }

    #[test]
    fn test_record_exchange_updates_bearer() {
        let mut store = CredentialStore::new(Some("static".to_string()), None);
        let now = Utc::now();
        let creds = store
            .record_exchange_result(payload("t1", None), GrantType::ClientCredentials, now)
            .unwrap();
        assert_eq!(creds.expires_at, Some(now + Duration::seconds(3600)));
        assert_eq!(store.bearer(), Some("t1"));
    }

    #[test]
    fn test_refresh_without_rotation_keeps_refresh_token() {
        let mut store = CredentialStore::new(None, None);
        store
            .record_exchange_result(payload("t1", Some("r1")), GrantType::AuthorizationCode, Utc::now())
            .unwrap();
        store
            .record_exchange_result(payload("t2", None), GrantType::RefreshToken, Utc::now())
            .unwrap();
        assert_eq!(
            store.current_tokens().unwrap().refresh_token.as_deref(),
            Some("r1")
        );

        store
            .record_exchange_result(payload("t3", Some("r2")), GrantType::RefreshToken, Utc::now())
            .unwrap();
        assert_eq!(
            store.current_tokens().unwrap().refresh_token.as_deref(),
            Some("r2")
        );
    }

    #[test]
    fn test_other_grants_replace_refresh_token() {
        let mut store = CredentialStore::new(None, None);
        store
            .record_exchange_result(payload("t1", Some("r1")), GrantType::AuthorizationCode, Utc::now())
            .unwrap();
        store
            .record_exchange_result(payload("t2", None), GrantType::ClientCredentials, Utc::now())
            .unwrap();
        let tokens = store.current_tokens().unwrap();
        assert_eq!(tokens.access_token, "t2");
        assert!(tokens.refresh_token.is_none());
    }

    #[test]
    fn test_invalid_payload_leaves_store_unchanged() {
        let mut store = CredentialStore::new(Some("static".to_string()), None);
        assert!(
            store
                .record_exchange_result(payload("", None), GrantType::RefreshToken, Utc::now())
                .is_err()
        );
        assert_eq!(store.bearer(), Some("static"));
        assert!(store.current_tokens().is_none());
    }

    #[test]
    fn test_refresh_token_precedence() {
        let mut store = CredentialStore::new(
            None,
            Some(OAuthConfig::new("id", "secret").with_refresh_token("configured")),
        );
        store.restore(Credentials::new("a", "Bearer").with_refresh_token("stored"));

        assert_eq!(store.refresh_token_for(Some("explicit")).as_deref(), Some("explicit"));
        assert_eq!(store.refresh_token_for(Some("")).as_deref(), Some("configured"));
        assert_eq!(store.refresh_token_for(None).as_deref(), Some("configured"));

        store.replace_config(OAuthConfig::new("id", "secret"));
        assert_eq!(store.refresh_token_for(None).as_deref(), Some("stored"));

        let empty = CredentialStore::new(None, Some(OAuthConfig::new("id", "secret")));
        assert!(empty.refresh_token_for(None).is_none());
    }

    #[test]
    fn test_replace_config_discards_seeded_refresh_token() {
        let mut store = CredentialStore::new(
            None,
            Some(OAuthConfig::new("id", "secret").with_refresh_token("seed")),
        );
        store.replace_config(OAuthConfig::new("other", "secret"));
        assert_eq!(store.current_config().unwrap().client_id, "other");
        assert!(store.current_config().unwrap().refresh_token.is_none());
    }

    #[test]
    fn test_wants_refresh() {
        let now = Utc::now();
        let near = Credentials::new("a", "Bearer").with_expires_at(now + Duration::seconds(60));

        let mut store = CredentialStore::new(None, Some(OAuthConfig::new("id", "s")));
        assert!(!store.wants_refresh_at(now));
        store.restore(near.clone());
        assert!(store.wants_refresh_at(now));

        store.replace_config(OAuthConfig::new("id", "s").with_auto_refresh(false));
        assert!(!store.wants_refresh_at(now));

        let mut static_only = CredentialStore::new(None, None);
        static_only.restore(near);
        assert!(!static_only.wants_refresh_at(now));
    }
}
