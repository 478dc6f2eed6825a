//! # carthooks-oauth
//!
//! `OAuth2` building blocks for the Carthooks API client.
//!
//! ## Features
//!
//! - **Grant requests**: `client_credentials` (with optional end-user context),
//!   `authorization_code` and `refresh_token`, encoded as form bodies
//! - **Token bookkeeping**: decoding of token payloads into [`Credentials`]
//!   with a computed expiry instant
//! - **Freshness**: classification of stored credentials against the
//!   five-minute refresh window
//!
//! This crate performs no I/O. The `carthooks` crate sends the requests and
//! owns the credential store.
//!
//! ## Example
//!
//! ```
//! use carthooks_oauth::{Grant, TokenRequest};
//!
//! let request = TokenRequest::new(
//!     "client-id",
//!     "client-secret",
//!     Grant::RefreshToken { refresh_token: "r1".into() },
//! );
//! assert!(request.to_form_body().starts_with("grant_type=refresh_token"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod error;
pub mod grant;
pub mod token;

pub use config::OAuthConfig;
pub use error::{Error, Result};
pub use grant::{Grant, GrantType, TokenRequest};
pub use token::{Credentials, Freshness, REFRESH_WINDOW_SECS, TokenResponse};
