//! Guild documents: list, read, found, settings, join.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::auth::AuthUser;
use crate::guild::model::{Guild, Member};
use crate::guild::ops::{GuildPatch, NewGuild};
use crate::guild::GuildError;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

pub async fn list_guilds(State(state): State<AppState>) -> Json<Vec<Guild>> {
    let now = Utc::now();
    Json(state.store.list().iter().map(|g| g.public_view(now)).collect())
}

pub async fn get_guild(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Guild>> {
    let guild = state
        .store
        .get(&id)
        .ok_or_else(|| GuildError::not_found("guild", &id))?;
    Ok(Json(guild.public_view(Utc::now())))
}

pub async fn create_guild(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewGuild>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Guild>)> {
    let Json(draft) = payload?;
    let founder_score = state.config.load().guilds.founder_score;
    let now = Utc::now();

    let guild = Guild::found(state.store.next_id(), draft, &user.profile(), founder_score, now)?;
    let guild = state.store.insert(guild);

    tracing::info!(guild = %guild.id, founder = %user.id(), "Guild created");
    Ok((StatusCode::CREATED, Json(guild.public_view(now))))
}

pub async fn update_guild(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<GuildPatch>, JsonRejection>,
) -> ApiResult<Json<Guild>> {
    let Json(patch) = payload?;
    let guild = state.store.update(&id, |g| {
        g.update_settings(user.id(), patch)?;
        Ok(g.public_view(Utc::now()))
    })?;
    Ok(Json(guild))
}

pub async fn join_guild(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> ApiResult<(StatusCode, Json<Member>)> {
    let profile = user.profile();
    let member = state.store.update(&id, |g| g.join(&profile))?;
    tracing::info!(guild = %id, member = %member.id, "Member joined");
    Ok((StatusCode::CREATED, Json(member)))
}
