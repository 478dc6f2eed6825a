//! Error types for the watcher.

use thiserror::Error;

/// Watcher errors.
#[derive(Debug, Error)]
pub enum Error {
    /// `run` was called while the watcher was already running.
    #[error("watcher is already running")]
    AlreadyRunning,

    /// Registering the watch endpoint failed.
    #[error("failed to start watch data: {0}")]
    Subscribe(String),

    /// The message queue failed.
    #[error("queue error: {0}")]
    Queue(String),

    /// A message body is not a change event.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A required field is missing, in a message or the configuration.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// The handler rejected a message.
    #[error("handler failed: {0}")]
    Handler(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
