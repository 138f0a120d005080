//! Guild chat history and fan-out.
//!
//! Messages are appended to the guild document, then published on the
//! guild's broadcast channel for WebSocket subscribers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::auth::AuthUser;
use crate::guild::model::ChatMessage;
use crate::guild::GuildError;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

/// One broadcast channel per guild, created on first use.
#[derive(Clone)]
pub struct ChatHub {
    channels: Arc<DashMap<String, broadcast::Sender<ChatMessage>>>,
    capacity: usize,
}

impl ChatHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, guild_id: &str) -> broadcast::Receiver<ChatMessage> {
        self.channels
            .entry(guild_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Returns the number of subscribers reached.
    pub fn publish(&self, guild_id: &str, message: ChatMessage) -> usize {
        self.channels
            .get(guild_id)
            .and_then(|tx| tx.send(message).ok())
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self, guild_id: &str) -> usize {
        self.channels
            .get(guild_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new(64)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewMessage {
    pub text: String,
}

pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let guild = state
        .store
        .get(&id)
        .ok_or_else(|| GuildError::not_found("guild", &id))?;
    Ok(Json(guild.chat_messages))
}

pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let Json(body) = payload?;
    let message = state
        .store
        .update(&id, |g| g.post_message(user.id(), &body.text, Utc::now()))?;

    let reached = state.chat.publish(&id, message.clone());
    tracing::debug!(guild = %id, message = %message.id, subscribers = reached, "Chat message posted");
    Ok((StatusCode::CREATED, Json(message)))
}
