//! Guild REST API.
//!
//! Handlers are thin: extract, call the matching [`Guild`](crate::guild::Guild)
//! operation through [`GuildStore::update`](crate::store::GuildStore::update),
//! and return the result as JSON.

pub mod chat;
pub mod guilds;
pub mod marketplace;
pub mod members;
pub mod prayer;
pub mod proposals;
pub mod quests;
pub mod teams;
pub mod treasury;

use axum::{
    extract::State,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::http::server::AppState;
use crate::http::websocket::chat_ws_handler;

pub use chat::ChatHub;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "guilds": state.store.len(),
    }))
}

/// Every public route. Auth is enforced per handler by the `AuthUser` extractor.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/guilds", get(guilds::list_guilds).post(guilds::create_guild))
        .route("/guilds/{id}", get(guilds::get_guild).patch(guilds::update_guild))
        .route("/guilds/{id}/join", post(guilds::join_guild))
        .route(
            "/guilds/{id}/members/{user_id}",
            patch(members::change_role).delete(members::kick_member),
        )
        .route("/guilds/{id}/quests", post(quests::create_quest))
        .route("/guilds/{id}/quests/{quest_id}/claim", post(quests::claim_quest))
        .route("/guilds/{id}/treasury/donate", post(treasury::donate))
        .route("/guilds/{id}/treasury/disburse", post(treasury::disburse))
        .route("/guilds/{id}/teams", post(teams::create_team))
        .route("/teams/{team_id}/apply", post(teams::apply))
        .route("/teams/{team_id}/assign", patch(teams::assign))
        .route("/teams/{team_id}/unassign", patch(teams::unassign))
        .route("/guilds/{id}/proposals", post(proposals::create_proposal))
        .route(
            "/guilds/{id}/proposals/{proposal_id}/vote",
            post(proposals::vote),
        )
        .route("/guilds/{id}/marketplace", post(marketplace::list_item))
        .route(
            "/guilds/{id}/marketplace/{item_id}/buy",
            post(marketplace::buy_item),
        )
        .route(
            "/guilds/{id}/chat",
            get(chat::list_messages).post(chat::post_message),
        )
        .route("/guilds/{id}/chat/ws", get(chat_ws_handler))
        .route("/guilds/{id}/prayer", get(prayer::guild_prayer))
}
