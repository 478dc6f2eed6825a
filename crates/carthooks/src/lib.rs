//! # carthooks
//!
//! Client library for the Carthooks API.
//!
//! ## Features
//!
//! - **Token lifecycle**: `client_credentials`, `authorization_code` and
//!   `refresh_token` grants, with lazy refresh five minutes before expiry
//! - **Uniform responses**: every call returns an [`ApiResponse`] decoded
//!   from the `{data, error, trace_id, meta}` envelope, never a transport
//!   error
//! - **Typed extraction**: records, scalars and pagination out of the
//!   dynamic payload
//! - **Resource endpoints**: items, sub-items, connections, submission and
//!   upload tokens, users, apps, collections and watch registration
//!
//! ## Quick Start
//!
//! ```no_run
//! use carthooks::{Client, ClientConfig, OAuthConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .oauth(OAuthConfig::new("client-id", "client-secret"))
//!         .build();
//!     let client = Client::new(config)?;
//!
//!     let token = client.initialize_oauth(None).await?;
//!     if !token.is_success() {
//!         eprintln!("token request failed: {}", token);
//!         return Ok(());
//!     }
//!
//!     let item = client.get_item_by_id(1, 2, 3, &[]).await;
//!     match item.extract_record() {
//!         Ok(record) => println!("{}: {}", record.id, record.title),
//!         Err(e) => eprintln!("{e} (trace id {:?})", item.trace_id()),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod api;
pub mod auth;
mod client;
pub mod config;
pub mod envelope;
mod error;
pub mod models;
mod response;
pub mod transport;

pub use carthooks_oauth::{
    Credentials, Freshness, Grant, GrantType, OAuthConfig, REFRESH_WINDOW_SECS, TokenRequest,
    TokenResponse,
};
pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, Result};
pub use models::{
    App, AuthorizeCodeRequest, AuthorizeCodeResponse, Collection, Connection, ConnectionLog,
    ConnectionLogStatus, ConnectionStatus, ConnectionUsage, CreateConnectionLogRequest,
    CreateConnectionRequest, CreateConnectionUsageRequest, EventCode, EventMessage, EventMeta,
    ImageResult, LockOptions, Pagination, PaginationOptions, QueryOptions, Record,
    SubmissionToken, SubmissionTokenOptions, UpdateConnectionRequest, UpdateToken,
    UpdateTokenOptions, UploadToken, UrlSet, User, UserInfo, WatchDataOptions, WatchDataResponse,
};
pub use response::{ApiResponse, ExtractError};
