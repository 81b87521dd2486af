//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use giftshare_api::config::{AdapterKind, AppConfig, StaticTokenConfig};
use giftshare_api::http::serve;
use giftshare_api::lifecycle::{Application, Shutdown};
use tokio::net::TcpListener;

pub const ALICE: &str = "alice-token";
pub const BOB: &str = "bob-token";
pub const ORIGIN: &str = "http://localhost:3000";

fn token(token: &str, uid: &str) -> StaticTokenConfig {
    StaticTokenConfig {
        token: token.into(),
        uid: uid.into(),
        email: Some(format!("{}@example.com", uid)),
        name: None,
        picture: None,
    }
}

/// Defaults plus two static users and an `/api` base path.
pub fn test_config(adapter: AdapterKind) -> AppConfig {
    let mut config = AppConfig::default();
    config.adapter = adapter;
    config.listener.bind_address = "127.0.0.1:0".into();
    config.api.base_path = "/api".into();
    config.auth.tokens = vec![token(ALICE, "alice"), token(BOB, "bob")];
    config
}

/// Start the configured adapter on an ephemeral port.
pub async fn start_app(config: AppConfig) -> (SocketAddr, Shutdown) {
    let app = Application::build(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let router = app.router();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = serve(router, listener, signal).await;
    });

    (addr, shutdown)
}

/// A client that never reuses connections across tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
