//! Integration tests for transport middleware.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use courier::middleware::LoggingLayer;
use courier::tower::util::MapRequestLayer;
use courier::{ApiClient, HyperClient, Request, RequestOptions};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

/// Test that logging middleware doesn't break the request flow.
#[tokio::test]
async fn test_logging_middleware() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logged": true})))
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder()
        .endpoint(mock_server.uri())
        .build(HyperClient::builder().with_logging().build());

    let body = client
        .get("/logged", RequestOptions::new())
        .await
        .expect("resolved");

    assert_eq!(body, json!({"logged": true}));
}

/// Test that debug logging keeps error statuses flowing to the lifecycle.
#[tokio::test]
async fn test_debug_logging_keeps_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&mock_server)
        .await;

    let client = ApiClient::builder()
        .endpoint(mock_server.uri())
        .build(HyperClient::builder().layer(LoggingLayer::debug()).build());

    let err = client
        .get("/broken", RequestOptions::new())
        .await
        .expect_err("rejected");

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "boom");
}

/// Test that a layer rewriting requests applies to every call.
#[tokio::test]
async fn test_request_rewriting_layer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/protected"))
        .and(header("authorization", "Bearer my-secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "alice"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HyperClient::builder()
        .layer(MapRequestLayer::new(|mut request: Request<Bytes>| {
            request
                .headers_mut()
                .insert("authorization".to_string(), "Bearer my-secret-token".to_string());
            request
        }))
        .with_logging()
        .build();
    let client = ApiClient::builder()
        .endpoint(mock_server.uri())
        .build(transport);

    let body = client
        .get("/protected", RequestOptions::new())
        .await
        .expect("resolved");

    assert_eq!(body, json!({"user": "alice"}));
}

/// Test that transport layers see every retry attempt.
#[tokio::test]
async fn test_layer_sees_each_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(408))
        .expect(4)
        .mount(&mock_server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let transport = HyperClient::builder()
        .layer(MapRequestLayer::new(move |request: Request<Bytes>| {
            counter.fetch_add(1, Ordering::SeqCst);
            request
        }))
        .build();
    let client = ApiClient::builder()
        .endpoint(mock_server.uri())
        .build(transport);

    let err = client
        .get(
            "/slow",
            RequestOptions::new()
                .max_attempts(4)
                .retry_interval(Duration::from_millis(5)),
        )
        .await
        .expect_err("rejected");

    assert_eq!(err.status(), Some(408));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}
