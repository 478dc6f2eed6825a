//! Message queue abstraction.
//!
//! The watcher consumes notifications through [`MessageQueue`], which models
//! long-poll receive with per-message visibility and explicit deletion.
//! [`ChannelQueue`] is an in-process implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

use crate::error::{Error, Result};

/// A received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Handle used to delete this delivery.
    pub receipt_handle: String,
    /// Raw message body.
    pub body: String,
}

/// A queue the watcher can consume from.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Receives up to `max` messages, waiting at most `wait` for the first.
    ///
    /// Received messages are hidden from further receives for
    /// `visibility_timeout` unless deleted.
    async fn receive(
        &self,
        max: usize,
        wait: Duration,
        visibility_timeout: Duration,
    ) -> Result<Vec<QueueMessage>>;

    /// Deletes a delivered message.
    async fn delete(&self, receipt_handle: &str) -> Result<()>;
}

#[derive(Debug)]
struct InFlight {
    body: String,
    visible_at: Instant,
}

#[derive(Debug, Default)]
struct Deliveries {
    next_handle: u64,
    in_flight: HashMap<String, InFlight>,
}

impl Deliveries {
    fn deliver(&mut self, body: String, visibility_timeout: Duration) -> QueueMessage {
        self.next_handle += 1;
        let receipt_handle = format!("rh-{}", self.next_handle);
        self.in_flight.insert(
            receipt_handle.clone(),
            InFlight {
                body: body.clone(),
                visible_at: Instant::now() + visibility_timeout,
            },
        );
        QueueMessage {
            receipt_handle,
            body,
        }
    }

    /// Takes up to `max` bodies whose visibility timeout has passed.
    fn take_expired(&mut self, max: usize) -> Vec<String> {
        let now = Instant::now();
        let mut expired: Vec<String> = self
            .in_flight
            .iter()
            .filter(|(_, m)| m.visible_at <= now)
            .map(|(handle, _)| handle.clone())
            .collect();
        expired.sort();
        expired.truncate(max);
        expired
            .into_iter()
            .filter_map(|handle| self.in_flight.remove(&handle))
            .map(|m| m.body)
            .collect()
    }
}

/// Sending side of a [`ChannelQueue`].
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::UnboundedSender<String>,
}

impl QueueSender {
    /// Enqueues a message body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Queue`] if the queue was dropped.
    pub fn send(&self, body: impl Into<String>) -> Result<()> {
        self.tx
            .send(body.into())
            .map_err(|_| Error::Queue("queue closed".to_string()))
    }
}

/// In-memory queue backed by a tokio channel.
///
/// Undeleted messages are redelivered once their visibility timeout passes.
#[derive(Debug)]
pub struct ChannelQueue {
    tx: mpsc::UnboundedSender<String>,
    rx: Mutex<mpsc::UnboundedReceiver<String>>,
    deliveries: Mutex<Deliveries>,
}

impl ChannelQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            deliveries: Mutex::new(Deliveries::default()),
        }
    }

    /// Returns a handle for enqueueing messages.
    #[must_use]
    pub fn sender(&self) -> QueueSender {
        QueueSender {
            tx: self.tx.clone(),
        }
    }

    /// Number of delivered messages not yet deleted.
    pub async fn in_flight(&self) -> usize {
        self.deliveries.lock().await.in_flight.len()
    }
}

impl Default for ChannelQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageQueue for ChannelQueue {
    async fn receive(
        &self,
        max: usize,
        wait: Duration,
        visibility_timeout: Duration,
    ) -> Result<Vec<QueueMessage>> {
        let mut bodies = self.deliveries.lock().await.take_expired(max);

        let mut rx = self.rx.lock().await;
        while bodies.len() < max {
            match rx.try_recv() {
                Ok(body) => bodies.push(body),
                Err(_) => break,
            }
        }

        if bodies.is_empty() {
            match tokio::time::timeout(wait, rx.recv()).await {
                Ok(Some(body)) => bodies.push(body),
                Ok(None) => return Err(Error::Queue("queue closed".to_string())),
                Err(_) => return Ok(Vec::new()),
            }
            while bodies.len() < max {
                match rx.try_recv() {
                    Ok(body) => bodies.push(body),
                    Err(_) => break,
                }
            }
        }
        drop(rx);

        let mut deliveries = self.deliveries.lock().await;
        Ok(bodies
            .into_iter()
            .map(|body| deliveries.deliver(body, visibility_timeout))
            .collect())
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        self.deliveries
            .lock()
            .await
            .in_flight
            .remove(receipt_handle)
            .map(|_| ())
            .ok_or_else(|| Error::Queue(format!("unknown receipt handle {receipt_handle}")))
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
    use tokio_test::{assert_err, assert_ok};

    const WAIT: Duration = Duration::from_secs(20);
    const VISIBILITY: Duration = Duration::from_secs(300);

    #[tokio::test(start_paused = true)]
    async fn test_receive_respects_max() {
        let queue = ChannelQueue::new();
        let sender = queue.sender();
        for i in 0..7 {
            sender.send(format!("m{i}")).unwrap();
        }

        let first = queue.receive(5, WAIT, VISIBILITY).await.unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].body, "m0");
        let second = queue.receive(5, WAIT, VISIBILITY).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(queue.in_flight().await, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_poll_waits_then_returns_nothing() {
        let queue = ChannelQueue::new();
        let started = Instant::now();
        let messages = queue.receive(5, WAIT, VISIBILITY).await.unwrap();
        assert!(messages.is_empty());
        assert!(started.elapsed() >= WAIT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_poll_wakes_on_send() {
        let queue = std::sync::Arc::new(ChannelQueue::new());
        let sender = queue.sender();
        let waiter = {
            let queue = std::sync::Arc::clone(&queue);
            tokio::spawn(async move { queue.receive(5, WAIT, VISIBILITY).await })
        };
        tokio::time::sleep(Duration::from_secs(3)).await;
        sender.send("late").unwrap();

        let messages = waiter.await.unwrap().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "late");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_removes_delivery() {
        let queue = ChannelQueue::new();
        queue.sender().send("m").unwrap();
        let messages = queue.receive(5, WAIT, VISIBILITY).await.unwrap();

        assert_ok!(queue.delete(&messages[0].receipt_handle).await);
        assert_eq!(queue.in_flight().await, 0);
        assert_err!(queue.delete(&messages[0].receipt_handle).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undeleted_message_redelivered_after_visibility_timeout() {
        let queue = ChannelQueue::new();
        queue.sender().send("m").unwrap();
        let first = queue.receive(5, WAIT, VISIBILITY).await.unwrap();
        assert_eq!(first.len(), 1);

        tokio::time::advance(VISIBILITY + Duration::from_secs(1)).await;
        let again = queue.receive(5, WAIT, VISIBILITY).await.unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].body, "m");
        assert_ne!(again[0].receipt_handle, first[0].receipt_handle);
        assert_eq!(queue.in_flight().await, 1);
    }
}
