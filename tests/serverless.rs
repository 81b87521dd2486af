//! Tests for the serverless single-entry adapter.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use giftshare_api::auth::{Identity, StaticTokenVerifier};
use giftshare_api::config::AdapterKind;
use giftshare_api::handlers::route_table;
use giftshare_api::http::RequestLimits;
use giftshare_api::security::CorsPolicy;
use giftshare_api::store::MemoryStore;
use giftshare_api::{AppContext, Dispatcher, FunctionHandler};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

use common::{client, start_app, test_config, ALICE, BOB, ORIGIN};

fn function() -> FunctionHandler {
    let verifier = StaticTokenVerifier::new()
        .with_token(ALICE, Identity::new("alice"))
        .with_token(BOB, Identity::new("bob"));
    let context = AppContext::new(Arc::new(MemoryStore::new()), Arc::new(verifier));
    let dispatcher = Dispatcher::new(route_table("/api").unwrap(), context);
    FunctionHandler::new(dispatcher, CorsPolicy::new([ORIGIN]), RequestLimits::default())
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header("origin", ORIGIN);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn call(handler: &FunctionHandler, request: Request<Body>) -> (StatusCode, Value) {
    let response = handler.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_options_is_empty_204_with_cors_headers() {
    let handler = function();
    let response = handler
        .clone()
        .oneshot(request("OPTIONS", "/api/items/123/claim", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], ORIGIN);
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");
    assert_eq!(headers["access-control-allow-credentials"], "true");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_owner_cannot_claim_own_item() {
    let handler = function();
    let (status, body) = call(
        &handler,
        request("POST", "/api/items", Some(ALICE), Some(json!({ "title": "Bike" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["item"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &handler,
        request("POST", &format!("/api/items/{}/claim", id), Some(ALICE), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "You cannot claim your own item" }));
}

#[tokio::test]
async fn test_get_item_is_idempotent() {
    let handler = function();
    let (_, body) = call(
        &handler,
        request("POST", "/api/items", Some(BOB), Some(json!({ "title": "Chair" }))),
    )
    .await;
    let uri = format!("/api/items/{}", body["item"]["id"].as_str().unwrap());

    let first = call(&handler, request("GET", &uri, None, None)).await;
    let second = call(&handler, request("GET", &uri, None, None)).await;
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unsupported_method_is_route_not_found() {
    let handler = function();
    let (status, body) = call(&handler, request("HEAD", "/health", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));

    let (status, body) = call(&handler, request("GET", "/api/nope", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
}

#[tokio::test]
async fn test_hosted_function_matches_server_responses() {
    let (server_addr, server_shutdown) = start_app(test_config(AdapterKind::Server)).await;
    let (function_addr, function_shutdown) = start_app(test_config(AdapterKind::Serverless)).await;
    let client = client();

    for path in ["/health", "/nonexistent", "/api/items", "/api/users/nobody", "/api/items/user"] {
        let a = client.get(format!("http://{}{}", server_addr, path)).send().await.unwrap();
        let b = client.get(format!("http://{}{}", function_addr, path)).send().await.unwrap();
        assert_eq!(a.status(), b.status(), "status differs for {}", path);

        let a: Value = a.json().await.unwrap();
        let b: Value = b.json().await.unwrap();
        if path != "/health" {
            assert_eq!(a, b, "body differs for {}", path);
        }
    }

    server_shutdown.trigger();
    function_shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_rejected_alike_by_both_adapters() {
    let mut server_config = test_config(AdapterKind::Server);
    server_config.security.max_body_size = 64;
    let mut function_config = test_config(AdapterKind::Serverless);
    function_config.security.max_body_size = 64;

    let (server_addr, server_shutdown) = start_app(server_config).await;
    let (function_addr, function_shutdown) = start_app(function_config).await;
    let client = client();
    let body = json!({ "title": "x".repeat(200) });

    for addr in [server_addr, function_addr] {
        let res = client
            .post(format!("http://{}/api/items", addr))
            .bearer_auth(ALICE)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Request body too large" }));
    }

    server_shutdown.trigger();
    function_shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_body_on_unknown_path_is_404_on_both_adapters() {
    let (server_addr, server_shutdown) = start_app(test_config(AdapterKind::Server)).await;
    let (function_addr, function_shutdown) = start_app(test_config(AdapterKind::Serverless)).await;
    let client = client();

    for addr in [server_addr, function_addr] {
        let res = client
            .post(format!("http://{}/nonexistent", addr))
            .header("content-type", "application/json")
            .body("{ nope")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Route not found" }));
    }

    server_shutdown.trigger();
    function_shutdown.trigger();
}
