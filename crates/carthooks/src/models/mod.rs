//! Domain types exchanged with the Carthooks API.

mod app;
mod connection;
mod event;
mod options;
mod record;
mod user;

pub use app::{App, Collection};
pub use connection::{
    Connection, ConnectionLog, ConnectionLogStatus, ConnectionStatus, ConnectionUsage,
    CreateConnectionLogRequest, CreateConnectionRequest, CreateConnectionUsageRequest,
    UpdateConnectionRequest,
};
pub use event::{EventCode, EventMessage, EventMeta};
pub use options::{
    AuthorizeCodeRequest, AuthorizeCodeResponse, LockOptions, PaginationOptions, QueryOptions,
    SubmissionToken, SubmissionTokenOptions, UpdateToken, UpdateTokenOptions, UploadToken,
    WatchDataOptions, WatchDataResponse,
};
pub use record::{ImageResult, Pagination, Record, UrlSet};
pub use user::{User, UserInfo};

use serde::{Deserialize, Deserializer};

/// Decodes an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
