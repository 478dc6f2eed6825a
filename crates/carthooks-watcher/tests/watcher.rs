//! Polling loop behavior with an in-memory queue.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use carthooks::{Client, ClientConfig, WatchDataOptions};
use carthooks_watcher::{
    ChangeEvent, ChannelQueue, Error, MessageQueue, QueueMessage, Subscriber, Watcher,
    WatcherConfig,
};
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default)]
struct RecordingSubscriber {
    calls: Mutex<Vec<WatchDataOptions>>,
    fail: bool,
}

#[async_trait]
impl Subscriber for RecordingSubscriber {
    async fn start_watch(&self, options: &WatchDataOptions) -> carthooks_watcher::Result<()> {
        self.calls.lock().await.push(options.clone());
        if self.fail {
            Err(Error::Subscribe("watch limit reached".to_string()))
        } else {
            Ok(())
        }
    }
}

fn config() -> WatcherConfig {
    WatcherConfig::builder("test")
        .app(1, 2)
        .queue_url("memory://q")
        .build()
        .unwrap()
}

fn event(id: u64) -> String {
    json!({
        "version": "1",
        "meta": {"event": "collection.item.created", "collection_id": 2},
        "payload": {"id": id}
    })
    .to_string()
}

async fn ignore(_event: ChangeEvent) -> anyhow::Result<()> {
    Ok(())
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    while !condition() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_processes_and_deletes_messages() {
    let queue = ChannelQueue::new();
    let sender = queue.sender();
    sender.send(event(1)).unwrap();
    sender.send("not json").unwrap();
    sender.send(r#"{"payload":{"title":"no id"}}"#).unwrap();
    sender.send(event(2)).unwrap();

    let subscriber = Arc::new(RecordingSubscriber::default());
    let watcher = Arc::new(Watcher::new(config(), Arc::clone(&subscriber), queue));

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let task = {
        let watcher = Arc::clone(&watcher);
        let seen = Arc::clone(&seen);
        tokio::spawn(async move {
            watcher
                .run(move |event: ChangeEvent| {
                    let seen = Arc::clone(&seen);
                    async move {
                        seen.lock().unwrap().push(event.record_id());
                        Ok::<_, anyhow::Error>(())
                    }
                })
                .await
        })
    };

    wait_until(|| seen.lock().unwrap().len() == 2).await;
    watcher.stop();
    assert_ok!(task.await.unwrap());

    assert_eq!(*seen.lock().unwrap(), vec![Some(1), Some(2)]);
    // The two malformed messages were not deleted.
    assert_eq!(watcher.queue().in_flight().await, 2);
    assert!(!watcher.is_running());

    let calls = subscriber.calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "watch-1-2");
    assert_eq!(calls[0].endpoint_url, "memory://q");
}

#[tokio::test(start_paused = true)]
async fn test_handler_failure_keeps_message() {
    let queue = ChannelQueue::new();
    queue.sender().send(event(1)).unwrap();
    queue.sender().send(event(2)).unwrap();

    let watcher = Arc::new(Watcher::new(
        config(),
        RecordingSubscriber::default(),
        queue,
    ));
    let handled = Arc::new(AtomicUsize::new(0));
    let task = {
        let watcher = Arc::clone(&watcher);
        let handled = Arc::clone(&handled);
        tokio::spawn(async move {
            watcher
                .run(move |event: ChangeEvent| {
                    let handled = Arc::clone(&handled);
                    async move {
                        handled.fetch_add(1, Ordering::SeqCst);
                        if event.record_id() == Some(1) {
                            anyhow::bail!("downstream unavailable");
                        }
                        Ok(())
                    }
                })
                .await
        })
    };

    wait_until(|| handled.load(Ordering::SeqCst) >= 2).await;
    watcher.stop();
    task.await.unwrap().unwrap();

    assert_eq!(watcher.queue().in_flight().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_second_run_rejected() {
    let subscriber = Arc::new(RecordingSubscriber::default());
    let watcher = Arc::new(Watcher::new(
        config(),
        Arc::clone(&subscriber),
        ChannelQueue::new(),
    ));

    let task = {
        let watcher = Arc::clone(&watcher);
        tokio::spawn(async move { watcher.run(ignore).await })
    };
    while subscriber.calls.lock().await.is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let second = watcher.run(ignore).await;
    assert!(matches!(second, Err(Error::AlreadyRunning)));

    watcher.stop_handle().stop();
    task.await.unwrap().unwrap();
    assert!(!watcher.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_failure_ends_run() {
    let subscriber = RecordingSubscriber {
        fail: true,
        ..RecordingSubscriber::default()
    };
    let watcher = Watcher::new(config(), subscriber, ChannelQueue::new());

    let result = watcher.run(ignore).await;
    assert!(matches!(result, Err(Error::Subscribe(_))));
    assert!(!watcher.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_stop_when_idle_is_noop() {
    let watcher = Watcher::new(config(), RecordingSubscriber::default(), ChannelQueue::new());
    watcher.stop();
    assert!(!watcher.is_running());
}

#[derive(Debug, Default)]
struct FailingQueue {
    receives: std::sync::Mutex<Vec<Instant>>,
}

#[async_trait]
impl MessageQueue for FailingQueue {
    async fn receive(
        &self,
        _max: usize,
        _wait: Duration,
        _visibility_timeout: Duration,
    ) -> carthooks_watcher::Result<Vec<QueueMessage>> {
        self.receives.lock().unwrap().push(Instant::now());
        Err(Error::Queue("access denied".to_string()))
    }

    async fn delete(&self, _receipt_handle: &str) -> carthooks_watcher::Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_receive_error_backs_off() {
    let watcher = Arc::new(Watcher::new(
        config(),
        RecordingSubscriber::default(),
        FailingQueue::default(),
    ));
    let task = {
        let watcher = Arc::clone(&watcher);
        tokio::spawn(async move { watcher.run(ignore).await })
    };

    wait_until(|| watcher.queue().receives.lock().unwrap().len() >= 3).await;
    watcher.stop();
    task.await.unwrap().unwrap();

    let receives = watcher.queue().receives.lock().unwrap().clone();
    for pair in receives.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(5));
    }
}

#[tokio::test]
async fn test_client_subscribes_with_queue_registration() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/watch-data"))
        .and(body_json(json!({
            "endpoint_url": "memory://q",
            "endpoint_type": "sqs",
            "name": "watch-1-2",
            "app_id": 1,
            "collection_id": 2,
            "age": 432_000,
            "watch_start_time": 0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"watch_id": "w1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(
        ClientConfig::builder()
            .base_url(server.uri())
            .access_token("tok")
            .build(),
    )
    .unwrap();
    assert_ok!(client.start_watch(&config().watch_options()).await);
}

#[tokio::test]
async fn test_client_subscribe_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/watch-data"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"message": "forbidden"}
        })))
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::builder().base_url(server.uri()).build()).unwrap();
    match client.start_watch(&config().watch_options()).await {
        Err(Error::Subscribe(message)) => assert_eq!(message, "forbidden"),
        other => panic!("unexpected result: {other:?}"),
    }
}
