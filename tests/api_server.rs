//! End-to-end tests against the long-running server adapter.

use giftshare_api::config::AdapterKind;
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{client, start_app, test_config, ALICE, BOB, ORIGIN};

#[tokio::test]
async fn test_health() {
    let (addr, shutdown) = start_app(test_config(AdapterKind::Server)).await;

    let res = client().get(format!("http://{}/health", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_unmatched_route_is_404_json() {
    let (addr, shutdown) = start_app(test_config(AdapterKind::Server)).await;

    let res = client().get(format!("http://{}/nonexistent", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Route not found" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_preflight_short_circuits() {
    let (addr, shutdown) = start_app(test_config(AdapterKind::Server)).await;

    let res = client()
        .request(reqwest::Method::OPTIONS, format!("http://{}/api/items/anything", addr))
        .header("origin", ORIGIN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(res.headers()["access-control-allow-origin"], ORIGIN);
    assert_eq!(res.headers()["access-control-allow-credentials"], "true");
    assert_eq!(
        res.headers()["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, PATCH, OPTIONS"
    );
    assert!(res.text().await.unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_item_lifecycle() {
    let (addr, shutdown) = start_app(test_config(AdapterKind::Server)).await;
    let client = client();
    let base = format!("http://{}/api", addr);

    let res = client
        .post(format!("{}/items", base))
        .bearer_auth(ALICE)
        .header("origin", ORIGIN)
        .json(&json!({ "title": "Desk lamp", "category": "home" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["access-control-allow-origin"], ORIGIN);
    let body: Value = res.json().await.unwrap();
    let id = body["item"]["id"].as_str().unwrap().to_string();

    let res = client.get(format!("{}/items/{}", base, id)).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["item"]["title"], "Desk lamp");
    assert_eq!(body["item"]["userId"], "alice");

    let res = client
        .post(format!("{}/items/{}/claim", base, id))
        .bearer_auth(BOB)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(format!("{}/items", base)).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "items": [] }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_auth_routes_without_token() {
    let (addr, shutdown) = start_app(test_config(AdapterKind::Server)).await;

    for token in [None, Some("forged")] {
        let mut req = client().get(format!("http://{}/api/items/user", addr));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Authentication required" }));
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let (addr, shutdown) = start_app(test_config(AdapterKind::Server)).await;

    let res = client()
        .post(format!("http://{}/api/items", addr))
        .bearer_auth(ALICE)
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid JSON body" }));

    shutdown.trigger();
}
