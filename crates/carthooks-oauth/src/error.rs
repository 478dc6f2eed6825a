//! Error types for `OAuth2` token bookkeeping.

/// Result type alias for `OAuth2` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `OAuth2` error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Token payload did not carry an access token.
    #[error("Token response is missing access_token")]
    MissingAccessToken,

    /// Token payload could not be decoded.
    #[error("Invalid token response: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}
