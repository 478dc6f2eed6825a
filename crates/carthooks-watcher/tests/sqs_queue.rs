//! SQS queue against a mock SQS endpoint.

#![cfg(feature = "sqs")]
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use aws_sdk_sqs::config::retry::RetryConfig;
use aws_sdk_sqs::config::{BehaviorVersion, Credentials, Region};
use carthooks_watcher::{Error, MessageQueue, SqsQueue};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUEUE_URL: &str = "https://sqs.us-east-1.amazonaws.com/123456789012/orders";
const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

fn queue(server: &MockServer) -> SqsQueue {
    let config = aws_sdk_sqs::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .endpoint_url(server.uri())
        .credentials_provider(Credentials::new("AKID", "SECRET", None, None, "test"))
        .retry_config(RetryConfig::disabled())
        .build();
    SqsQueue::new(aws_sdk_sqs::Client::from_conf(config), QUEUE_URL)
}

fn sqs_reply(body: &serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), CONTENT_TYPE)
}

#[tokio::test]
async fn test_receive_long_polls_with_visibility_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "AmazonSQS.ReceiveMessage"))
        .and(body_partial_json(json!({
            "QueueUrl": QUEUE_URL,
            "MaxNumberOfMessages": 5,
            "WaitTimeSeconds": 20,
            "VisibilityTimeout": 300
        })))
        .respond_with(sqs_reply(&json!({
            "Messages": [
                {"MessageId": "m1", "ReceiptHandle": "rh-a", "Body": "{\"payload\":{\"id\":1}}"},
                {"MessageId": "m2", "Body": "no handle"},
                {"MessageId": "m3", "ReceiptHandle": "rh-c"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let messages = queue(&server)
        .receive(5, Duration::from_secs(20), Duration::from_secs(300))
        .await
        .unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].receipt_handle, "rh-a");
    assert_eq!(messages[0].body, r#"{"payload":{"id":1}}"#);
    assert_eq!(messages[1].receipt_handle, "rh-c");
    assert!(messages[1].body.is_empty());
}

#[tokio::test]
async fn test_receive_caps_batch_size() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "AmazonSQS.ReceiveMessage"))
        .and(body_partial_json(json!({"MaxNumberOfMessages": 10})))
        .respond_with(sqs_reply(&json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let messages = queue(&server)
        .receive(50, Duration::from_secs(1), Duration::from_secs(30))
        .await
        .unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_delete_sends_receipt_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "AmazonSQS.DeleteMessage"))
        .and(body_partial_json(json!({
            "QueueUrl": QUEUE_URL,
            "ReceiptHandle": "rh-a"
        })))
        .respond_with(sqs_reply(&json!({})))
        .expect(1)
        .mount(&server)
        .await;

    queue(&server).delete("rh-a").await.unwrap();
}

#[tokio::test]
async fn test_service_error_is_queue_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(
            json!({
                "__type": "com.amazonaws.sqs#QueueDoesNotExist",
                "message": "The specified queue does not exist."
            })
            .to_string(),
            CONTENT_TYPE,
        ))
        .mount(&server)
        .await;

    let err = queue(&server)
        .receive(5, Duration::from_secs(1), Duration::from_secs(30))
        .await
        .unwrap_err();
    match err {
        Error::Queue(message) => assert!(message.contains("QueueDoesNotExist"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_queue_url() {
    let config = aws_sdk_sqs::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .build();
    let queue = SqsQueue::new(aws_sdk_sqs::Client::from_conf(config), QUEUE_URL);
    assert_eq!(queue.queue_url(), QUEUE_URL);
}
