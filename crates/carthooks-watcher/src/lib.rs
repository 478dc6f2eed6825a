//! # carthooks-watcher
//!
//! Change-notification listener for Carthooks collections.
//!
//! A [`Watcher`] registers a watch for one collection, then long-polls a
//! message queue and hands every change event to a handler. With the
//! default `sqs` feature the queue is Amazon SQS ([`SqsQueue`]); any other
//! queue plugs in through [`MessageQueue`]. A message is
//! deleted only after its handler succeeded, so failed messages are
//! redelivered by the queue.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use carthooks::{Client, ClientConfig};
//! use carthooks_watcher::{ChangeEvent, SqsQueue, Watcher, WatcherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(Client::new(ClientConfig::from_env())?);
//! let config = WatcherConfig::builder("orders")
//!     .app(1, 2)
//!     .sqs(
//!         "https://sqs.ap-southeast-1.amazonaws.com/123/orders",
//!         "ap-southeast-1",
//!     )
//!     .build()?;
//!
//! let queue = SqsQueue::from_config(&config).await;
//! let watcher = Watcher::new(config, client, queue);
//! watcher
//!     .run(|event: ChangeEvent| async move {
//!         println!("record {:?} changed", event.record_id());
//!         Ok::<_, anyhow::Error>(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod message;
pub mod queue;
#[cfg(feature = "sqs")]
mod sqs;
mod watcher;

pub use config::{WatcherConfig, WatcherConfigBuilder};
pub use error::{Error, Result};
pub use message::ChangeEvent;
pub use queue::{ChannelQueue, MessageQueue, QueueMessage, QueueSender};
#[cfg(feature = "sqs")]
pub use sqs::SqsQueue;
pub use watcher::{EventHandler, StopHandle, Subscriber, Watcher};
