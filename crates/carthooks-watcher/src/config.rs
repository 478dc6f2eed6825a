//! Watcher configuration.

use std::time::Duration;

use carthooks::WatchDataOptions;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Endpoint type registered for queue delivery.
pub const ENDPOINT_TYPE: &str = "sqs";

/// Lifetime of a watch registration (five days).
pub const WATCH_AGE_SECS: u64 = 432_000;

/// AWS region of the queue unless configured otherwise.
pub const DEFAULT_REGION: &str = "ap-southeast-1";

/// Maximum number of messages taken per poll.
pub const DEFAULT_MAX_MESSAGES: usize = 5;

/// Long-poll wait per receive.
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(20);

/// How long a received message stays hidden from other consumers.
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(300);

/// Pause after a failed receive.
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Pause after a poll that returned no messages.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_secs(1);

/// Immutable watcher configuration.
///
/// Assembled with [`WatcherConfig::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherConfig {
    /// Identifier of this watcher, used in logs.
    pub watcher_id: String,
    /// Watched app.
    pub app_id: u64,
    /// Watched collection.
    pub collection_id: u64,
    /// URL of the queue notifications are delivered to.
    pub queue_url: String,
    /// AWS region of the queue.
    pub region: String,
    /// Only notify for records matching these filters.
    pub filters: Map<String, Value>,
    /// Maximum number of messages taken per poll.
    pub max_messages: usize,
    /// Long-poll wait per receive.
    pub wait_time: Duration,
    /// Visibility timeout of received messages.
    pub visibility_timeout: Duration,
    /// Pause after a failed receive.
    pub error_backoff: Duration,
    /// Pause after an empty poll.
    pub idle_delay: Duration,
}

impl WatcherConfig {
    /// Creates a builder.
    #[must_use]
    pub fn builder(watcher_id: impl Into<String>) -> WatcherConfigBuilder {
        WatcherConfigBuilder::new(watcher_id)
    }

    /// Name of the watch registration, `watch-{app}-{collection}`.
    #[must_use]
    pub fn watch_name(&self) -> String {
        format!("watch-{}-{}", self.app_id, self.collection_id)
    }

    /// Registration request for this watcher.
    #[must_use]
    pub fn watch_options(&self) -> WatchDataOptions {
        WatchDataOptions {
            endpoint_url: self.queue_url.clone(),
            endpoint_type: ENDPOINT_TYPE.to_string(),
            name: self.watch_name(),
            app_id: self.app_id,
            collection_id: self.collection_id,
            filters: self.filters.clone(),
            age: Some(WATCH_AGE_SECS),
            watch_start_time: Some(0),
        }
    }
}

/// Builder for [`WatcherConfig`].
#[derive(Debug, Clone)]
pub struct WatcherConfigBuilder {
    watcher_id: String,
    app: Option<(u64, u64)>,
    queue_url: Option<String>,
    region: String,
    filters: Map<String, Value>,
    max_messages: usize,
    wait_time: Duration,
    visibility_timeout: Duration,
    error_backoff: Duration,
    idle_delay: Duration,
}

impl WatcherConfigBuilder {
    /// Creates a builder with default polling parameters.
    #[must_use]
    pub fn new(watcher_id: impl Into<String>) -> Self {
        Self {
            watcher_id: watcher_id.into(),
            app: None,
            queue_url: None,
            region: DEFAULT_REGION.to_string(),
            filters: Map::new(),
            max_messages: DEFAULT_MAX_MESSAGES,
            wait_time: DEFAULT_WAIT_TIME,
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
            error_backoff: DEFAULT_ERROR_BACKOFF,
            idle_delay: DEFAULT_IDLE_DELAY,
        }
    }

    /// Sets the watched app and collection.
    #[must_use]
    pub const fn app(mut self, app_id: u64, collection_id: u64) -> Self {
        self.app = Some((app_id, collection_id));
        self
    }

    /// Sets the queue URL.
    #[must_use]
    pub fn queue_url(mut self, queue_url: impl Into<String>) -> Self {
        self.queue_url = Some(queue_url.into());
        self
    }

    /// Sets the queue region.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the SQS queue URL and its region.
    #[must_use]
    pub fn sqs(self, queue_url: impl Into<String>, region: impl Into<String>) -> Self {
        self.queue_url(queue_url).region(region)
    }

    /// Sets record filters.
    #[must_use]
    pub fn filters(mut self, filters: Map<String, Value>) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the maximum number of messages per poll.
    #[must_use]
    pub const fn max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages;
        self
    }

    /// Sets the long-poll wait.
    #[must_use]
    pub const fn wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time = wait_time;
        self
    }

    /// Sets the visibility timeout.
    #[must_use]
    pub const fn visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = timeout;
        self
    }

    /// Sets the pause after a failed receive.
    #[must_use]
    pub const fn error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Sets the pause after an empty poll.
    #[must_use]
    pub const fn idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = delay;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the app or queue URL was not set.
    pub fn build(self) -> Result<WatcherConfig> {
        let (app_id, collection_id) = self.app.ok_or(Error::MissingField("app"))?;
        let queue_url = self
            .queue_url
            .filter(|u| !u.is_empty())
            .ok_or(Error::MissingField("queue_url"))?;

        Ok(WatcherConfig {
            watcher_id: self.watcher_id,
            app_id,
            collection_id,
            queue_url,
            region: self.region,
            filters: self.filters,
            max_messages: self.max_messages.max(1),
            wait_time: self.wait_time,
            visibility_timeout: self.visibility_timeout,
            error_backoff: self.error_backoff,
            idle_delay: self.idle_delay,
        })
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
    use serde_json::json;

    #[test]
    fn test_builder_defaults() {
        let config = WatcherConfig::builder("w1")
            .app(1, 2)
            .queue_url("https://sqs.example.com/q")
            .build()
            .unwrap();

        assert_eq!(config.watcher_id, "w1");
        assert_eq!(config.region, "ap-southeast-1");
        assert_eq!(config.max_messages, 5);
        assert_eq!(config.wait_time, Duration::from_secs(20));
        assert_eq!(config.visibility_timeout, Duration::from_secs(300));
        assert_eq!(config.error_backoff, Duration::from_secs(5));
        assert_eq!(config.idle_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_sqs_sets_url_and_region() {
        let config = WatcherConfig::builder("w1")
            .app(1, 2)
            .sqs("https://sqs.us-east-1.amazonaws.com/1/q", "us-east-1")
            .build()
            .unwrap();
        assert_eq!(config.queue_url, "https://sqs.us-east-1.amazonaws.com/1/q");
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn test_builder_requires_app_and_queue() {
        let missing_app = WatcherConfig::builder("w1").queue_url("q").build();
        assert!(matches!(missing_app, Err(Error::MissingField("app"))));

        let missing_queue = WatcherConfig::builder("w1").app(1, 2).build();
        assert!(matches!(missing_queue, Err(Error::MissingField("queue_url"))));

        let empty_queue = WatcherConfig::builder("w1").app(1, 2).queue_url("").build();
        assert!(matches!(empty_queue, Err(Error::MissingField("queue_url"))));
    }

    #[test]
    fn test_watch_options() {
        let mut filters = Map::new();
        filters.insert("status".to_string(), json!("open"));
        let config = WatcherConfig::builder("w1")
            .app(10, 20)
            .queue_url("https://sqs.example.com/q")
            .filters(filters.clone())
            .build()
            .unwrap();

        let options = config.watch_options();
        assert_eq!(options.name, "watch-10-20");
        assert_eq!(options.endpoint_type, "sqs");
        assert_eq!(options.endpoint_url, "https://sqs.example.com/q");
        assert_eq!(options.age, Some(432_000));
        assert_eq!(options.watch_start_time, Some(0));
        assert_eq!(options.filters, filters);
    }
}
