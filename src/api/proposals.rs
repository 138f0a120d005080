//! Governance proposals and voting.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::guild::model::{Proposal, VoteChoice};
use crate::guild::ops::NewProposal;
use crate::guild::GuildError;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Voting window; `guilds.proposal_window_hours` when absent.
    #[serde(default)]
    pub window_hours: Option<u64>,
    /// Fraction of members that must vote; `guilds.proposal_quorum` when absent.
    #[serde(default)]
    pub quorum: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Ballot {
    pub choice: VoteChoice,
}

pub async fn create_proposal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<ProposalRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Proposal>)> {
    let Json(request) = payload?;
    let defaults = state.config.load().guilds.clone();

    let hours = request.window_hours.unwrap_or(defaults.proposal_window_hours);
    let window = i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .ok_or_else(|| GuildError::Invalid(format!("voting window of {} hours is too long", hours)))?;
    let draft = NewProposal {
        title: request.title,
        description: request.description,
        window,
        quorum: request.quorum.unwrap_or(defaults.proposal_quorum),
    };

    let proposal = state
        .store
        .update(&id, |g| g.create_proposal(user.id(), draft, Utc::now()))?;
    tracing::info!(guild = %id, proposal = %proposal.id, "Proposal created");
    Ok((StatusCode::CREATED, Json(proposal)))
}

pub async fn vote(
    State(state): State<AppState>,
    Path((id, proposal_id)): Path<(String, String)>,
    user: AuthUser,
    payload: Result<Json<Ballot>, JsonRejection>,
) -> ApiResult<Json<Proposal>> {
    let Json(ballot) = payload?;
    let proposal = state
        .store
        .update(&id, |g| g.vote(user.id(), &proposal_id, ballot.choice, Utc::now()))?;
    Ok(Json(proposal))
}
