//! Chat WebSocket stream.
//!
//! # Data Flow
//! ```text
//! POST /guilds/{id}/chat ──→ ChatHub (broadcast per guild) ──→ WebSocket clients
//! ```
//!
//! The stream is one-way: client frames other than Close are ignored.
//! A subscriber that falls behind the channel buffer skips the missed
//! messages and keeps receiving.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::guild::model::ChatMessage;
use crate::guild::GuildError;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

pub async fn chat_ws_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    if state.store.get(&id).is_none() {
        return Err(GuildError::not_found("guild", &id).into());
    }

    // Subscribe before the upgrade so nothing posted after the 101 is missed.
    let rx = state.chat.subscribe(&id);
    Ok(ws.on_upgrade(move |socket| stream_messages(socket, id, rx)))
}

async fn stream_messages(
    mut socket: WebSocket,
    guild_id: String,
    mut rx: broadcast::Receiver<ChatMessage>,
) {
    tracing::debug!(guild = %guild_id, "Chat subscriber connected");

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(message) => {
                    let payload = match serde_json::to_string(&message) {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to encode chat message");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(guild = %guild_id, skipped, "Chat subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!(guild = %guild_id, "Chat subscriber disconnected");
}
