//! Teams and scholarship assignment.
//!
//! Routes under `/teams/{teamId}` find the owning guild by team id.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::guild::model::Team;
use crate::guild::ops::NewTeam;
use crate::guild::GuildError;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub scholar_id: String,
}

fn owning_guild(state: &AppState, team_id: &str) -> Result<String, GuildError> {
    state
        .store
        .find_team_guild(team_id)
        .ok_or_else(|| GuildError::not_found("team", team_id))
}

pub async fn create_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<NewTeam>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    let Json(draft) = payload?;
    let team = state.store.update(&id, |g| g.create_team(user.id(), draft))?;
    tracing::info!(guild = %id, team = %team.id, "Team created");
    Ok((StatusCode::CREATED, Json(team.redacted())))
}

pub async fn apply(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<Team>> {
    let guild_id = owning_guild(&state, &team_id)?;
    let team = state
        .store
        .update(&guild_id, |g| g.apply_to_team(user.id(), &team_id))?;
    Ok(Json(team.redacted()))
}

pub async fn assign(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    user: AuthUser,
    payload: Result<Json<Assignment>, JsonRejection>,
) -> ApiResult<Json<Team>> {
    let Json(assignment) = payload?;
    let guild_id = owning_guild(&state, &team_id)?;
    let team = state.store.update(&guild_id, |g| {
        g.assign_scholar(user.id(), &team_id, &assignment.scholar_id)
    })?;
    tracing::info!(team = %team_id, scholar = %assignment.scholar_id, "Scholar assigned");
    Ok(Json(team.redacted()))
}

pub async fn unassign(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<Team>> {
    let guild_id = owning_guild(&state, &team_id)?;
    let team = state
        .store
        .update(&guild_id, |g| g.unassign_scholar(user.id(), &team_id))?;
    tracing::info!(team = %team_id, "Scholar unassigned");
    Ok(Json(team.redacted()))
}
