//! Amazon SQS queue.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::error::DisplayErrorContext;
use tracing::{debug, warn};

use crate::config::WatcherConfig;
use crate::error::{Error, Result};
use crate::queue::{MessageQueue, QueueMessage};

/// Most messages SQS returns from one receive.
const MAX_BATCH: usize = 10;

/// [`MessageQueue`] backed by an SQS queue.
#[derive(Debug, Clone)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueue {
    /// Wraps an existing SQS client.
    #[must_use]
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Connects to the queue of `config`, loading AWS credentials from the
    /// environment.
    pub async fn from_config(config: &WatcherConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        debug!(region = %config.region, queue_url = %config.queue_url, "Loaded AWS config");
        Self::new(aws_sdk_sqs::Client::new(&sdk_config), config.queue_url.clone())
    }

    /// Returns the queue URL.
    #[must_use]
    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

fn whole_seconds(duration: Duration) -> i32 {
    i32::try_from(duration.as_secs()).unwrap_or(i32::MAX)
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn receive(
        &self,
        max: usize,
        wait: Duration,
        visibility_timeout: Duration,
    ) -> Result<Vec<QueueMessage>> {
        let max = i32::try_from(max.clamp(1, MAX_BATCH)).unwrap_or(1);
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max)
            .wait_time_seconds(whole_seconds(wait))
            .visibility_timeout(whole_seconds(visibility_timeout))
            .send()
            .await
            .map_err(|e| Error::Queue(DisplayErrorContext(e).to_string()))?;

        let messages = output
            .messages()
            .iter()
            .filter_map(|m| {
                let Some(receipt_handle) = m.receipt_handle() else {
                    warn!(message_id = ?m.message_id(), "Skipping message without receipt handle");
                    return None;
                };
                Some(QueueMessage {
                    receipt_handle: receipt_handle.to_string(),
                    body: m.body().unwrap_or_default().to_string(),
                })
            })
            .collect();
        Ok(messages)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| Error::Queue(DisplayErrorContext(e).to_string()))?;
        Ok(())
    }
}
