//! Client configuration types.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use carthooks_oauth::OAuthConfig;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.carthooks.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "CARTHOOKS_API_URL";
/// Environment variable holding a static access token.
pub const ENV_ACCESS_TOKEN: &str = "CARTHOOKS_ACCESS_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "CARTHOOKS_TIMEOUT";
/// Environment variable enabling request/response echo when `"true"`.
pub const ENV_DEBUG: &str = "CARTHOOKS_SDK_DEBUG";

/// Carthooks client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL.
    pub base_url: String,
    /// Static bearer token.
    pub access_token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Extra headers sent on every request.
    pub headers: BTreeMap<String, String>,
    /// Echo requests and responses to the `debug` log level.
    pub debug: bool,
    /// `OAuth2` client configuration.
    pub oauth: Option<OAuthConfig>,
}

impl ClientConfig {
    /// Creates a configuration for the given base URL with defaults elsewhere.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: None,
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
            debug: false,
            oauth: None,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Builds a configuration from `CARTHOOKS_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        ClientConfigBuilder::new().with_env().build()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("debug", &self.debug)
            .field("oauth", &self.oauth)
            .finish()
    }
}

/// Builder for client configuration.
///
/// Explicitly set values win over environment variables.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
    timeout: Option<Duration>,
    headers: BTreeMap<String, String>,
    debug: bool,
    oauth: Option<OAuthConfig>,
}

impl ClientConfigBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a static bearer token.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header sent on every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Enables request/response echo.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the `OAuth2` client configuration.
    #[must_use]
    pub fn oauth(mut self, oauth: OAuthConfig) -> Self {
        self.oauth = Some(oauth);
        self
    }

    /// Fills unset values from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Fills unset values using `lookup` to resolve environment variables.
    #[must_use]
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if self.base_url.is_none() {
            self.base_url = lookup(ENV_API_URL);
        }
        if self.access_token.is_none() {
            self.access_token = lookup(ENV_ACCESS_TOKEN);
        }
        if self.timeout.is_none() {
            self.timeout = lookup(ENV_TIMEOUT).and_then(|v| parse_timeout_secs(&v));
        }
        if !self.debug {
            self.debug = lookup(ENV_DEBUG).is_some_and(|v| v == "true");
        }
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            access_token: self.access_token.filter(|t| !t.is_empty()),
            timeout: self
                .timeout
                .filter(|t| !t.is_zero())
                .unwrap_or(DEFAULT_TIMEOUT),
            headers: self.headers,
            debug: self.debug,
            oauth: self.oauth,
        }
    }
}

fn parse_timeout_secs(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    (secs.is_finite() && secs > 0.0).then(|| Duration::from_secs_f64(secs))
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
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::builder().build();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.access_token.is_none());
        assert!(!config.debug);
        assert!(config.oauth.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:8080")
            .access_token("tok")
            .timeout(Duration::from_secs(5))
            .header("X-Tenant", "42")
            .debug(true)
            .oauth(OAuthConfig::new("id", "secret"))
            .build();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.access_token.as_deref(), Some("tok"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.headers.get("X-Tenant").map(String::as_str), Some("42"));
        assert!(config.debug);
        assert_eq!(config.oauth.unwrap().client_id, "id");
    }

    #[test]
    fn test_env_fills_unset_values() {
        let config = ClientConfig::builder()
            .with_env_lookup(env(&[
                (ENV_API_URL, "https://env.example.com"),
                (ENV_ACCESS_TOKEN, "env-token"),
                (ENV_TIMEOUT, "12"),
                (ENV_DEBUG, "true"),
            ]))
            .build();

        assert_eq!(config.base_url, "https://env.example.com");
        assert_eq!(config.access_token.as_deref(), Some("env-token"));
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert!(config.debug);
    }

    #[test]
    fn test_explicit_values_win_over_env() {
        let config = ClientConfig::builder()
            .base_url("http://explicit")
            .timeout(Duration::from_secs(3))
            .with_env_lookup(env(&[(ENV_API_URL, "http://env"), (ENV_TIMEOUT, "99")]))
            .build();

        assert_eq!(config.base_url, "http://explicit");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_env_timeout_falls_back() {
        let config = ClientConfig::builder()
            .with_env_lookup(env(&[(ENV_TIMEOUT, "soon"), (ENV_DEBUG, "yes")]))
            .build();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!config.debug);
    }

    #[test]
    fn test_debug_output_hides_token() {
        let config = ClientConfig::builder().access_token("secret-token").build();
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
