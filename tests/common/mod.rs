//! Shared utilities for integration tests.

#![allow(dead_code)]

use chrono::Duration;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use guildhq::auth::{issue_token, Claims};
use guildhq::config::AppConfig;
use guildhq::{AppState, GuildStore, HttpServer, Shutdown};

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_KEY: &str = "integration-admin-key";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config
}

/// A running server on an ephemeral port. Shut down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub store: GuildStore,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_server(config: AppConfig) -> TestServer {
    start_with_state(AppState::new(config, GuildStore::default())).await
}

pub async fn start_with_state(state: AppState) -> TestServer {
    let store = state.store.clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(state);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();

    TestServer {
        addr,
        client,
        store,
        shutdown,
    }
}

/// Token for `sub` signed with the test secret.
pub fn token(sub: &str, name: &str) -> String {
    let claims = Claims::new(sub, Duration::hours(1)).with_name(name);
    issue_token(SECRET, &claims).unwrap()
}

pub fn wallet_token(sub: &str, name: &str, wallet: &str) -> String {
    let claims = Claims::new(sub, Duration::hours(1))
        .with_name(name)
        .with_wallet(wallet);
    issue_token(SECRET, &claims).unwrap()
}
