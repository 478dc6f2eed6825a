//! Error types for the Carthooks client.

use thiserror::Error;

/// Errors raised by the client outside of the response envelope.
///
/// Calls that reach the API report failures through
/// [`ApiResponse`](crate::ApiResponse) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure or timeout.
    #[error("{0}")]
    Transport(String),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// An `OAuth2` operation was invoked without `OAuth2` configuration.
    #[error("OAuth configuration not provided")]
    ConfigurationMissing,

    /// A refresh was attempted with no refresh token available.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Refresh-on-demand failed; the stale token was not used.
    #[error("Failed to refresh token: {message}")]
    Refresh {
        /// Failure message from the token endpoint or transport.
        message: String,
        /// Trace id of the failed exchange, if the server sent one.
        trace_id: Option<String>,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
