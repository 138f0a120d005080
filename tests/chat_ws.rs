//! Chat delivery over WebSocket.

use futures_util::StreamExt;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};

mod common;
use common::{start_server, test_config, token};

#[tokio::test]
async fn test_posted_message_reaches_websocket_subscriber() {
    let server = start_server(test_config()).await;
    let alice = token("alice", "Alice");

    let guild: Value = server
        .client
        .post(server.url("/guilds"))
        .bearer_auth(&alice)
        .json(&json!({ "name": "Chatterbox" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = guild["id"].as_str().unwrap().to_string();

    let (mut ws, _) = connect_async(server.ws_url(&format!("/guilds/{}/chat/ws", id)))
        .await
        .expect("websocket handshake");

    let res = server
        .client
        .post(server.url(&format!("/guilds/{}/chat", id)))
        .bearer_auth(&alice)
        .json(&json!({ "text": "gm lunacia" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("no frame within timeout")
        .expect("stream ended")
        .expect("websocket error");
    let Message::Text(text) = frame else {
        panic!("expected text frame, got {:?}", frame);
    };
    let message: Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(message["text"], "gm lunacia");
    assert_eq!(message["author"], "Alice");
    assert_eq!(message["authorId"], "alice");

    let history: Vec<Value> = server
        .client
        .get(server.url(&format!("/guilds/{}/chat", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], message["id"]);
}

#[tokio::test]
async fn test_websocket_for_unknown_guild_is_rejected() {
    let server = start_server(test_config()).await;
    let result = connect_async(server.ws_url("/guilds/missing/chat/ws")).await;
    match result {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 404);
        }
        other => panic!("expected HTTP 404, got {:?}", other.map(|_| ())),
    }
}
