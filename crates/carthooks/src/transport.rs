//! HTTP transport for the Carthooks API.
//!
//! Builds URLs against the configured base URL, applies default, custom and
//! authorization headers, and returns the raw response. Envelope decoding is
//! left to [`crate::envelope`].

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON document, sent with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Pre-encoded form body for token exchanges.
    ///
    /// Form requests never carry the bearer token.
    Form(String),
}

/// An API request relative to the base URL.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Path appended to the base URL, e.g. `/v1/me`.
    pub path: String,
    /// Optional body.
    pub body: Option<Body>,
    /// Flat query parameters.
    pub query: Vec<(String, String)>,
}

impl Request {
    /// Creates a request without body or query.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(Body::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attaches a form-encoded body.
    #[must_use]
    pub fn form(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Form(body.into()));
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Appends several query parameters.
    #[must_use]
    pub fn queries<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    const fn is_form(&self) -> bool {
        matches!(self.body, Some(Body::Form(_)))
    }
}

/// Raw HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Status code. Informational only; the envelope decides success.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Full response body.
    pub body: String,
}

/// HTTP transport bound to one base URL.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
    debug: bool,
}

impl Transport {
    /// Creates a transport from client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a custom header is not a valid HTTP header or
    /// the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("invalid value for header {name}: {e}")))?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
            debug: config.debug,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the full URL of a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL and path do not form a valid URL.
    pub fn url(&self, request: &Request) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Builds the headers of a request in application order: defaults,
    /// custom headers, then the bearer token.
    fn headers_for(&self, request: &Request, bearer: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if request.is_form() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM));
            headers.insert(ACCEPT, HeaderValue::from_static(JSON));
            for (name, value) in &self.headers {
                if name != AUTHORIZATION && name != CONTENT_TYPE {
                    headers.insert(name.clone(), value.clone());
                }
            }
            return Ok(headers);
        }

        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        headers.extend(self.headers.clone());

        if let Some(token) = bearer.filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Config(format!("access token is not a valid header value: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Sends a request and reads the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on connection failure or timeout.
    pub async fn send(&self, request: &Request, bearer: Option<&str>) -> Result<RawResponse> {
        let url = self.url(request)?;
        let headers = self.headers_for(request, bearer)?;

        if self.debug {
            match &request.body {
                Some(Body::Json(body)) => {
                    debug!(method = %request.method, %url, %body, "Sending request");
                }
                Some(Body::Form(_)) => debug!(method = %request.method, %url, "Sending form request"),
                None => debug!(method = %request.method, %url, "Sending request"),
            }
        }

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers);

        builder = match &request.body {
            Some(Body::Json(body)) => builder.body(serde_json::to_vec(body)?),
            Some(Body::Form(body)) => builder.body(body.clone()),
            None => builder,
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {e}")))?;

        if self.debug {
            debug!(%status, %body, "Received response");
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Transport(format!("request timed out: {e}"))
    } else {
        Error::Transport(format!("request failed: {e}"))
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
    use std::time::Duration;

    fn transport() -> Transport {
        let config = ClientConfig::builder()
            .base_url("https://api.example.com/")
            .header("X-Tenant", "7")
            .header("Authorization", "Custom abc")
            .build();
        Transport::new(&config).unwrap()
    }

    #[test]
    fn test_url_with_query() {
        let t = transport();
        let request = Request::get("/v1/apps/1/collections/2/items")
            .query("pagination[start]", "0")
            .query("pagination[limit]", "20");
        let url = t.url(&request).unwrap();
        assert_eq!(url.path(), "/v1/apps/1/collections/2/items");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("pagination[start]".to_string(), "0".to_string()),
                ("pagination[limit]".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_url_without_query_has_none() {
        let t = transport();
        let url = t.url(&Request::get("/v1/me")).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/me");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_json_headers_end_with_bearer() {
        let t = transport();
        let headers = t.headers_for(&Request::get("/v1/me"), Some("tok")).unwrap();
        assert_eq!(headers[CONTENT_TYPE], JSON);
        assert_eq!(headers[ACCEPT], JSON);
        assert_eq!(headers["x-tenant"], "7");
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
    }

    #[test]
    fn test_custom_authorization_kept_without_token() {
        let t = transport();
        let headers = t.headers_for(&Request::get("/v1/me"), None).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Custom abc");
    }

    #[test]
    fn test_form_headers_skip_authorization() {
        let t = transport();
        let request = Request::post("/oauth/token").form("grant_type=client_credentials");
        let headers = t.headers_for(&request, Some("tok")).unwrap();
        assert_eq!(headers[CONTENT_TYPE], FORM);
        assert_eq!(headers[ACCEPT], JSON);
        assert_eq!(headers["x-tenant"], "7");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_custom_header_rejected() {
        let config = ClientConfig::builder().header("bad header", "v").build();
        assert!(matches!(Transport::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_json_body_encoding() {
        let request = Request::post("/v1/watch-data")
            .json(&serde_json::json!({"name": "w"}))
            .unwrap();
        assert_eq!(
            request.body,
            Some(Body::Json(serde_json::json!({"name": "w"})))
        );
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .timeout(Duration::from_secs(2))
            .build();
        let t = Transport::new(&config).unwrap();
        let err = t.send(&Request::get("/v1/me"), None).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
