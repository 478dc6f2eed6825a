//! The polling loop.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use carthooks::{Client, WatchDataOptions};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::WatcherConfig;
use crate::error::{Error, Result};
use crate::message::ChangeEvent;
use crate::queue::{MessageQueue, QueueMessage};

/// Registers a watch endpoint with the API.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Registers `options`.
    async fn start_watch(&self, options: &WatchDataOptions) -> Result<()>;
}

#[async_trait]
impl Subscriber for Client {
    async fn start_watch(&self, options: &WatchDataOptions) -> Result<()> {
        let response = self.start_watch_data(options).await;
        if response.is_success() {
            Ok(())
        } else {
            Err(Error::Subscribe(
                response.error_message().unwrap_or_default().to_string(),
            ))
        }
    }
}

#[async_trait]
impl<S: Subscriber + ?Sized> Subscriber for Arc<S> {
    async fn start_watch(&self, options: &WatchDataOptions) -> Result<()> {
        (**self).start_watch(options).await
    }
}

/// Processes change events.
///
/// Implemented for async closures returning `anyhow::Result<()>`. A message
/// is deleted from the queue only if its handler succeeds.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles one event.
    async fn handle(&self, event: ChangeEvent) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(ChangeEvent) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, event: ChangeEvent) -> anyhow::Result<()> {
        self(event).await
    }
}

/// Stops a running [`Watcher`] from another task.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Asks the watcher to stop after the current step.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }
}

/// Consumes change notifications for one collection.
///
/// [`run`](Self::run) registers the watch, then polls the queue until
/// [`stop`](Self::stop) is called.
#[derive(Debug)]
pub struct Watcher<S, Q> {
    config: WatcherConfig,
    subscriber: S,
    queue: Q,
    running: AtomicBool,
    stop: Arc<watch::Sender<bool>>,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<S: Subscriber, Q: MessageQueue> Watcher<S, Q> {
    /// Creates a watcher.
    pub fn new(config: WatcherConfig, subscriber: S, queue: Q) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            config,
            subscriber,
            queue,
            running: AtomicBool::new(false),
            stop: Arc::new(stop),
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Returns the queue.
    pub const fn queue(&self) -> &Q {
        &self.queue
    }

    /// Returns true while [`run`](Self::run) is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns a handle that stops the watcher.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Asks the watcher to stop. Has no effect unless it is running.
    pub fn stop(&self) {
        if self.is_running() {
            self.stop.send_replace(true);
        }
    }

    /// Registers the watch and processes messages until stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if the watcher is already running
    /// and [`Error::Subscribe`] if the registration failed. Queue and
    /// message failures are logged and do not end the loop.
    pub async fn run<H: EventHandler>(&self, handler: H) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);
        self.stop.send_replace(false);
        let mut stop = self.stop.subscribe();

        let watcher_id = self.config.watcher_id.as_str();
        let options = self.config.watch_options();
        self.subscriber.start_watch(&options).await?;
        info!(watcher_id, name = %options.name, "Watch registered");

        loop {
            let stopped = *stop.borrow();
            if stopped {
                break;
            }

            let received = tokio::select! {
                () = wait_stopped(&mut stop) => break,
                received = self.queue.receive(
                    self.config.max_messages,
                    self.config.wait_time,
                    self.config.visibility_timeout,
                ) => received,
            };

            let pause = match received {
                Ok(messages) if messages.is_empty() => Some(self.config.idle_delay),
                Ok(messages) => {
                    debug!(watcher_id, count = messages.len(), "Received messages");
                    for message in messages {
                        self.process(&handler, message).await;
                    }
                    None
                }
                Err(e) => {
                    warn!(watcher_id, "Error receiving messages: {e}");
                    Some(self.config.error_backoff)
                }
            };

            if let Some(pause) = pause
                && sleep_or_stop(&mut stop, pause).await
            {
                break;
            }
        }

        info!(watcher_id, "Watcher stopped");
        Ok(())
    }

    async fn process<H: EventHandler>(&self, handler: &H, message: QueueMessage) {
        let watcher_id = self.config.watcher_id.as_str();
        let outcome = match ChangeEvent::parse(&message.body) {
            Ok(event) => handler
                .handle(event)
                .await
                .map_err(|e| Error::Handler(e.to_string())),
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            warn!(watcher_id, receipt_handle = %message.receipt_handle, "Message processing failed: {e}");
            return;
        }

        if let Err(e) = self.queue.delete(&message.receipt_handle).await {
            warn!(watcher_id, receipt_handle = %message.receipt_handle, "Failed to delete message: {e}");
        }
    }
}

/// Sleeps for `duration`; returns true if a stop was requested meanwhile.
async fn sleep_or_stop(stop: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    tokio::select! {
        () = wait_stopped(stop) => true,
        () = tokio::time::sleep(duration) => false,
    }
}

async fn wait_stopped(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}
