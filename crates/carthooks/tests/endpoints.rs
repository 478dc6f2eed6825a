//! Resource endpoints against a mock API server.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use carthooks::{
    AuthorizeCodeRequest, Client, ClientConfig, ConnectionLogStatus, CreateConnectionLogRequest,
    LockOptions, PaginationOptions, QueryOptions, SubmissionTokenOptions, WatchDataOptions,
};
use serde_json::{Map, Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Client {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .access_token("static-token")
        .header("X-Tenant", "acme")
        .build();
    Client::new(config).unwrap()
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[tokio::test]
async fn test_get_items_with_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/1/collections/2/items"))
        .and(query_param("pagination[start]", "40"))
        .and(query_param("pagination[limit]", "20"))
        .and(query_param("sort", "-created_at"))
        .and(header("authorization", "Bearer static-token"))
        .and(header("x-tenant", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 1, "title": "A", "created_at": 1, "updated_at": 2, "creator": 9, "fields": {"f1": "x"}},
                {"id": 2, "title": "B", "created_at": 3, "updated_at": 4, "creator": 9, "fields": {}}
            ],
            "meta": {"pagination": {"page": 3, "pageSize": 20, "total": 42, "totalPages": 3}},
            "trace_id": "list-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .get_items(1, 2, 20, 40, &[("sort", "-created_at")])
        .await;
    assert!(response.is_success());
    assert_eq!(response.trace_id(), Some("list-1"));

    let records = response.extract_records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].field("f1"), Some(&json!("x")));

    let pagination = response.extract_pagination().unwrap().unwrap();
    assert_eq!(pagination.total, 42);
    assert!(!pagination.has_next());
}

#[tokio::test]
async fn test_get_item_by_id_joins_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/1/collections/2/items/3"))
        .and(query_param("fields", "title,f1"))
        .respond_with(ok(json!({"id": 3, "title": "X", "created_at": 0, "updated_at": 0, "creator": 1, "fields": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let record = client(&server)
        .get_item_by_id(1, 2, 3, &["title", "f1"])
        .await
        .extract_record()
        .unwrap();
    assert_eq!(record.id, 3);
    assert_eq!(record.title, "X");
}

#[tokio::test]
async fn test_item_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/1/collections/2/items/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "Item not found", "code": "NOT_FOUND"},
            "trace_id": "abc123"
        })))
        .mount(&server)
        .await;

    let response = client(&server).get_item_by_id(1, 2, 404, &[]).await;
    assert!(!response.is_success());
    assert!(response.has_error());
    assert_eq!(response.error_message(), Some("Item not found"));
    assert_eq!(response.error_code(), Some("NOT_FOUND"));
    assert_eq!(response.trace_id(), Some("abc123"));
    assert!(response.extract_record().is_err());
}

#[tokio::test]
async fn test_query_items_sends_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/1/collections/2/items/query"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "pagination": {"page": 1, "pageSize": 10},
            "filters": {"status": "open"},
            "sort": ["-id"]
        })))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let options = QueryOptions {
        pagination: Some(PaginationOptions {
            page: 1,
            page_size: 10,
            with_count: false,
        }),
        filters: fields(json!({"status": "open"})),
        sort: vec!["-id".to_string()],
        fields: Vec::new(),
    };
    let response = client(&server).query_items(1, 2, &options).await;
    assert!(response.extract_records().unwrap().is_empty());
}

#[tokio::test]
async fn test_item_writes_wrap_data() {
    let server = MockServer::start().await;
    let data = fields(json!({"title": "New"}));

    Mock::given(method("POST"))
        .and(path("/v1/apps/1/collections/2/items"))
        .and(body_json(json!({"data": {"title": "New"}})))
        .respond_with(ok(json!({"id": 10})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/apps/1/collections/2/items/10"))
        .and(body_json(json!({"data": {"title": "New"}})))
        .respond_with(ok(json!({"id": 10})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/apps/1/collections/2/items/10"))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let created = client.create_item(1, 2, &data).await;
    assert_eq!(created.data().unwrap()["id"], json!(10));
    assert!(client.update_item(1, 2, 10, &data).await.is_success());

    let deleted = client.delete_item(1, 2, 10).await;
    assert!(deleted.is_success());
    assert!(deleted.data().is_none());
}

#[tokio::test]
async fn test_lock_and_unlock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/1/collections/2/items/3/lock"))
        .and(body_json(json!({"lockTimeout": 60, "lockId": "L1", "lockSubject": "sync"})))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/1/collections/2/items/3/unlock"))
        .and(body_json(json!({"lockId": "L1"})))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let options = LockOptions {
        timeout: Some(60),
        lock_id: Some("L1".to_string()),
        subject: Some("sync".to_string()),
    };
    assert!(client.lock_item(1, 2, 3, &options).await.extract_bool().unwrap());
    assert!(client.unlock_item(1, 2, 3, "L1").await.extract_bool().unwrap());
}

#[tokio::test]
async fn test_sub_items() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/1/collections/2/items/3/subform/4"))
        .respond_with(ok(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/apps/1/collections/2/items/3/subform/4/items/5"))
        .respond_with(ok(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/apps/1/collections/2/items/3/subform/4/items/5"))
        .respond_with(ok(Value::Null))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let row = fields(json!({"qty": 2}));
    assert!(client.create_sub_item(1, 2, 3, 4, &row).await.is_success());
    assert!(client.update_sub_item(1, 2, 3, 4, 5, &row).await.is_success());
    assert!(client.delete_sub_item(1, 2, 3, 4, 5).await.is_success());
}

#[tokio::test]
async fn test_connection_log() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/1/connections/8/logs"))
        .and(body_json(json!({"status": 2, "message": "running"})))
        .respond_with(ok(json!({"id": 100})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/1/connections/8"))
        .respond_with(ok(json!({"id": 8, "status": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let request = CreateConnectionLogRequest::new(ConnectionLogStatus::Updated, "running");
    assert_eq!(
        client
            .create_connection_log(1, 8, &request)
            .await
            .data()
            .unwrap()["id"],
        json!(100)
    );
    assert!(client.get_connection(1, 8).await.is_success());
}

#[tokio::test]
async fn test_tokens_and_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/1/collections/2/submission-token"))
        .and(body_json(json!({"ttl": 600})))
        .respond_with(ok(json!({"token": "sub", "url": "https://f", "expires_at": "later"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/uploads/token"))
        .respond_with(ok(json!({"token": "up"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let options = SubmissionTokenOptions {
        ttl: Some(600),
        ..SubmissionTokenOptions::default()
    };
    let token: carthooks::SubmissionToken = client
        .get_submission_token(1, 2, &options)
        .await
        .extract_as()
        .unwrap();
    assert_eq!(token.token, "sub");

    let upload: carthooks::UploadToken = client.get_upload_token().await.extract_as().unwrap();
    assert_eq!(upload.token, "up");
}

#[tokio::test]
async fn test_users_and_authorize_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/users/42"))
        .respond_with(ok(json!({"id": 42, "name": "Ada"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/user-token/ut-1"))
        .respond_with(ok(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/get-authorize-code"))
        .and(header("authorization", "Bearer static-token"))
        .respond_with(ok(json!({"redirect_url": "https://app/cb?code=c1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let user: carthooks::User = client.get_user(42).await.extract_as().unwrap();
    assert_eq!(user.name, "Ada");
    assert!(client.get_user_by_token("ut-1").await.is_success());

    let request = AuthorizeCodeRequest {
        client_id: "other".to_string(),
        redirect_uri: "https://app/cb".to_string(),
        state: "s".to_string(),
        target_tenant_id: None,
    };
    let code: carthooks::AuthorizeCodeResponse = client
        .get_oauth_authorize_code(&request)
        .await
        .extract_as()
        .unwrap();
    assert_eq!(code.redirect_url, "https://app/cb?code=c1");
}

#[tokio::test]
async fn test_apps_collections_and_watch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/1/collections/2"))
        .respond_with(ok(json!({"id": 2, "app_id": 1, "name": "Orders"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/watch-data"))
        .and(body_json(json!({
            "endpoint_url": "https://queue",
            "endpoint_type": "sqs",
            "name": "watch-1-2",
            "app_id": 1,
            "collection_id": 2,
            "age": 432_000,
            "watch_start_time": 0
        })))
        .respond_with(ok(json!({"watch_id": "w1", "status": "active"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let collection: carthooks::Collection = client.get_collection(1, 2).await.extract_as().unwrap();
    assert_eq!(collection.name, "Orders");

    let options = WatchDataOptions {
        endpoint_url: "https://queue".to_string(),
        endpoint_type: "sqs".to_string(),
        name: "watch-1-2".to_string(),
        app_id: 1,
        collection_id: 2,
        filters: Map::new(),
        age: Some(432_000),
        watch_start_time: Some(0),
    };
    let watch: carthooks::WatchDataResponse =
        client.start_watch_data(&options).await.extract_as().unwrap();
    assert_eq!(watch.watch_id, "w1");
}

#[tokio::test]
async fn test_malformed_body_surfaces_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let response = client(&server).get_apps().await;
    assert!(!response.is_success());
    assert_eq!(response.error_message(), Some("<html>Bad Gateway</html>"));
}

#[tokio::test]
async fn test_http_error_status_with_data_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/5"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"data": {"id": 5}})))
        .mount(&server)
        .await;

    let response = client(&server).get_app(5).await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_timeout_is_failed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps"))
        .respond_with(ok(json!([])).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(200))
        .build();
    let response = Client::new(config).unwrap().get_apps().await;
    assert!(!response.is_success());
    assert!(response.error_message().unwrap().starts_with("request timed out"));
}

#[tokio::test]
async fn test_connection_refused_is_failed_response() {
    let config = ClientConfig::builder()
        .base_url("http://127.0.0.1:9")
        .timeout(Duration::from_secs(2))
        .build();
    let response = Client::new(config).unwrap().get_apps().await;
    assert!(!response.is_success());
    assert!(!response.error_message().unwrap().is_empty());
}
