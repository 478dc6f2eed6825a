//! Token lifecycle: issuance, refresh and lazy freshness checks.
//!
//! The [`TokenManager`] owns the [`CredentialStore`] behind a read-write lock.
//! Refresh attempts are serialized through a separate gate so that two
//! callers observing a near-expiry token issue one refresh between them,
//! and a rotated refresh token is never overwritten by a stale exchange.

mod store;

pub use store::CredentialStore;

use carthooks_oauth::{Credentials, Freshness, Grant, OAuthConfig, TokenRequest, TokenResponse};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::envelope;
use crate::error::{Error, Result};
use crate::response::ApiResponse;
use crate::transport::{Request, Transport};

/// Path of the token endpoint.
pub const TOKEN_PATH: &str = "/oauth/token";

/// Owner of the credential state of one client.
#[derive(Debug, Default)]
pub struct TokenManager {
    state: RwLock<CredentialStore>,
    refresh_gate: Mutex<()>,
}

impl TokenManager {
    /// Creates a manager from a static token and/or `OAuth2` configuration.
    #[must_use]
    pub fn new(access_token: Option<String>, config: Option<OAuthConfig>) -> Self {
        Self {
            state: RwLock::new(CredentialStore::new(access_token, config)),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Returns the bearer token to send on protected calls.
    pub async fn bearer(&self) -> Option<String> {
        self.state.read().await.bearer().map(str::to_string)
    }

    /// Overwrites the bearer token.
    pub async fn set_access_token(&self, token: impl Into<String>) {
        self.state.write().await.set_token(token);
    }

    /// Returns a snapshot of the credentials of the last exchange.
    pub async fn current_tokens(&self) -> Option<Credentials> {
        self.state.read().await.current_tokens().cloned()
    }

    /// Returns a snapshot of the `OAuth2` configuration.
    pub async fn oauth_config(&self) -> Option<OAuthConfig> {
        self.state.read().await.current_config().cloned()
    }

    /// Replaces the `OAuth2` configuration.
    pub async fn set_oauth_config(&self, config: OAuthConfig) {
        self.state.write().await.replace_config(config);
    }

    /// Seeds the store with persisted credentials.
    pub async fn restore(&self, credentials: Credentials) {
        self.state.write().await.restore(credentials);
    }

    /// Classifies the stored credentials against the current time.
    pub async fn freshness(&self) -> Freshness {
        Freshness::of(self.state.read().await.current_tokens(), Utc::now())
    }

    /// Sends a token request and records the issued tokens.
    ///
    /// Tokens are recorded only if the request was made for the configured
    /// client. The response is returned unchanged either way.
    pub async fn request_token(&self, transport: &Transport, request: &TokenRequest) -> ApiResponse {
        let grant_type = request.grant_type();
        let http_request = Request::post(TOKEN_PATH).form(request.to_form_body());

        let response = match transport.send(&http_request, None).await {
            Ok(raw) => envelope::parse(&raw),
            Err(e) => ApiResponse::failure(e.to_string()),
        };

        if !response.is_success() {
            debug!(%grant_type, error = ?response.error_message(), "Token request failed");
            return response;
        }

        let mut state = self.state.write().await;
        let for_configured_client = state
            .current_config()
            .is_some_and(|c| c.client_id == request.client_id);
        if !for_configured_client {
            debug!(%grant_type, "Token issued for a different client, not stored");
            return response;
        }

        let payload = response
            .data()
            .cloned()
            .ok_or(carthooks_oauth::Error::MissingAccessToken)
            .and_then(TokenResponse::from_value);

        match payload.and_then(|p| state.record_exchange_result(p, grant_type, Utc::now())) {
            Ok(credentials) => info!(
                %grant_type,
                expires_at = ?credentials.expires_at,
                has_refresh_token = credentials.refresh_token.is_some(),
                "Access token issued"
            ),
            Err(e) => warn!(%grant_type, "Token response not stored: {e}"),
        }

        response
    }

    /// Obtains a token with the `client_credentials` grant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] without `OAuth2` configuration.
    pub async fn exchange_client_credentials(
        &self,
        transport: &Transport,
        user_access_token: Option<&str>,
    ) -> Result<ApiResponse> {
        let config = self.oauth_config().await.ok_or(Error::ConfigurationMissing)?;
        let grant = Grant::ClientCredentials {
            user_access_token: user_access_token
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        };
        let request = TokenRequest::new(config.client_id, config.client_secret, grant);
        Ok(self.request_token(transport, &request).await)
    }

    /// Exchanges an authorization code for a token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] without `OAuth2` configuration.
    pub async fn exchange_authorization_code(
        &self,
        transport: &Transport,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ApiResponse> {
        let config = self.oauth_config().await.ok_or(Error::ConfigurationMissing)?;
        let grant = Grant::AuthorizationCode {
            code: code.to_string(),
            redirect_uri: redirect_uri.to_string(),
        };
        let request = TokenRequest::new(config.client_id, config.client_secret, grant);
        Ok(self.request_token(transport, &request).await)
    }

    /// Refreshes the access token.
    ///
    /// The refresh token is taken from `explicit`, then the configuration,
    /// then the last exchange.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] without `OAuth2` configuration
    /// and [`Error::NoRefreshToken`] if no refresh token is available. No
    /// request is sent in either case.
    pub async fn refresh(&self, transport: &Transport, explicit: Option<&str>) -> Result<ApiResponse> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked(transport, explicit).await
    }

    async fn refresh_locked(&self, transport: &Transport, explicit: Option<&str>) -> Result<ApiResponse> {
        let request = {
            let state = self.state.read().await;
            let config = state.current_config().ok_or(Error::ConfigurationMissing)?;
            let refresh_token = state
                .refresh_token_for(explicit)
                .ok_or(Error::NoRefreshToken)?;
            TokenRequest::new(
                config.client_id.clone(),
                config.client_secret.clone(),
                Grant::RefreshToken { refresh_token },
            )
        };
        Ok(self.request_token(transport, &request).await)
    }

    /// Refreshes the token if it expires within the refresh window.
    ///
    /// Does nothing without `OAuth2` configuration, with auto-refresh
    /// disabled, or before the first exchange.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRefreshToken`] if a refresh is due but impossible,
    /// and [`Error::Refresh`] if the refresh request failed.
    pub async fn ensure_fresh(&self, transport: &Transport) -> Result<()> {
        if !self.state.read().await.wants_refresh_at(Utc::now()) {
            return Ok(());
        }

        let _gate = self.refresh_gate.lock().await;
        // Another caller may have refreshed while we waited.
        if !self.state.read().await.wants_refresh_at(Utc::now()) {
            return Ok(());
        }

        debug!("Access token near expiry, refreshing");
        let response = self.refresh_locked(transport, None).await.inspect_err(|e| {
            warn!("Token refresh not possible: {e}");
        })?;

        if response.is_success() {
            return Ok(());
        }

        let message = response.error_message().unwrap_or_default().to_string();
        warn!(trace_id = ?response.trace_id(), "Token refresh failed: {message}");
        Err(Error::Refresh {
            message,
            trace_id: response.trace_id().map(str::to_string),
        })
    }
}
