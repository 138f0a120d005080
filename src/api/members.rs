//! Role changes and kicks.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::guild::model::Member;
use crate::guild::ops::MemberAction;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub action: MemberAction,
}

pub async fn change_role(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
    user: AuthUser,
    payload: Result<Json<RoleChange>, JsonRejection>,
) -> ApiResult<Json<Member>> {
    let Json(change) = payload?;
    let member = state
        .store
        .update(&id, |g| g.change_member_role(user.id(), &user_id, change.action))?;
    tracing::info!(guild = %id, member = %user_id, role = ?member.role, "Member role changed");
    Ok(Json(member))
}

pub async fn kick_member(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
    user: AuthUser,
) -> ApiResult<Json<Member>> {
    let removed = state.store.update(&id, |g| g.kick_member(user.id(), &user_id))?;
    tracing::info!(guild = %id, member = %user_id, by = %user.id(), "Member kicked");
    Ok(Json(removed))
}
