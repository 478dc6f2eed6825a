//! The Carthooks API client.

use carthooks_oauth::{Credentials, Freshness, OAuthConfig, TokenRequest};
use serde::Serialize;
use tracing::debug;

use crate::auth::TokenManager;
use crate::config::ClientConfig;
use crate::envelope;
use crate::error::{Error, Result};
use crate::response::ApiResponse;
use crate::transport::{Request, Transport};

/// Client for the Carthooks API.
///
/// Each client owns its own credential state; share one client between
/// tasks with an `Arc` rather than creating several for the same session.
///
/// # Example
///
/// ```no_run
/// use carthooks::{Client, ClientConfig};
///
/// # async fn example() -> carthooks::Result<()> {
/// let client = Client::new(ClientConfig::builder().access_token("token").build())?;
/// let items = client.get_items(1, 2, 20, 0, &[]).await;
/// if items.is_success() {
///     println!("{} items", items.extract_records().map(|r| r.len()).unwrap_or(0));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    transport: Transport,
    auth: TokenManager,
}

impl Client {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration contains an invalid header or
    /// the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Transport::new(&config)?;
        debug!(base_url = transport.base_url(), oauth = config.oauth.is_some(), "Created client");
        Ok(Self {
            transport,
            auth: TokenManager::new(config.access_token, config.oauth),
        })
    }

    /// Creates a client from `CARTHOOKS_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`Client::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Sets the bearer token used on subsequent calls.
    pub async fn set_access_token(&self, token: impl Into<String>) {
        self.auth.set_access_token(token).await;
    }

    /// Sends a raw token request to `/oauth/token`.
    ///
    /// Issued tokens are stored when the request is for the configured
    /// client.
    pub async fn request_token(&self, request: &TokenRequest) -> ApiResponse {
        self.auth.request_token(&self.transport, request).await
    }

    /// Obtains a token with the `client_credentials` grant, optionally
    /// acting on behalf of the user owning `user_access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] without `OAuth2` configuration.
    pub async fn initialize_oauth(&self, user_access_token: Option<&str>) -> Result<ApiResponse> {
        self.auth
            .exchange_client_credentials(&self.transport, user_access_token)
            .await
    }

    /// Exchanges an authorization code for a token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] without `OAuth2` configuration.
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ApiResponse> {
        self.auth
            .exchange_authorization_code(&self.transport, code, redirect_uri)
            .await
    }

    /// Refreshes the access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] or [`Error::NoRefreshToken`]
    /// when no request could be made.
    pub async fn refresh_token(&self, refresh_token: Option<&str>) -> Result<ApiResponse> {
        self.auth.refresh(&self.transport, refresh_token).await
    }

    /// Refreshes the access token if it expires within five minutes.
    ///
    /// Called automatically before every API call.
    ///
    /// # Errors
    ///
    /// Returns an error if a due refresh failed.
    pub async fn ensure_fresh(&self) -> Result<()> {
        self.auth.ensure_fresh(&self.transport).await
    }

    /// Returns the credentials of the last token exchange.
    pub async fn current_tokens(&self) -> Option<Credentials> {
        self.auth.current_tokens().await
    }

    /// Returns the `OAuth2` configuration.
    pub async fn oauth_config(&self) -> Option<OAuthConfig> {
        self.auth.oauth_config().await
    }

    /// Replaces the `OAuth2` configuration.
    ///
    /// A refresh token seeded in the previous configuration is not carried
    /// over.
    pub async fn set_oauth_config(&self, config: OAuthConfig) {
        self.auth.set_oauth_config(config).await;
    }

    /// Seeds the client with previously persisted credentials.
    pub async fn restore_credentials(&self, credentials: Credentials) {
        self.auth.restore(credentials).await;
    }

    /// Returns the freshness of the stored credentials.
    pub async fn freshness(&self) -> Freshness {
        self.auth.freshness().await
    }

    /// Performs a protected call.
    ///
    /// Runs the freshness check first; a failed refresh aborts the call.
    pub(crate) async fn call(&self, request: Request) -> ApiResponse {
        if let Err(e) = self.auth.ensure_fresh(&self.transport).await {
            return lifecycle_failure(e);
        }

        let bearer = self.auth.bearer().await;
        match self.transport.send(&request, bearer.as_deref()).await {
            Ok(raw) => envelope::parse(&raw),
            Err(e) => ApiResponse::failure(e.to_string()),
        }
    }

    /// Performs a protected call with a JSON body.
    pub(crate) async fn call_json<T>(&self, request: Request, body: &T) -> ApiResponse
    where
        T: Serialize + ?Sized,
    {
        match request.json(body) {
            Ok(request) => self.call(request).await,
            Err(e) => ApiResponse::failure(e.to_string()),
        }
    }
}

fn lifecycle_failure(error: Error) -> ApiResponse {
    match error {
        Error::Refresh { ref trace_id, .. } => {
            let trace_id = trace_id.clone();
            ApiResponse::failure(error.to_string()).with_trace_id(trace_id)
        }
        other => ApiResponse::failure(other.to_string()),
    }
}
