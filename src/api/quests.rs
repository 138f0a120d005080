use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::guild::model::Quest;
use crate::guild::ops::NewQuest;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

pub async fn create_quest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<NewQuest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Quest>)> {
    let Json(draft) = payload?;
    let quest = state.store.update(&id, |g| g.create_quest(user.id(), draft))?;
    Ok((StatusCode::CREATED, Json(quest)))
}

pub async fn claim_quest(
    State(state): State<AppState>,
    Path((id, quest_id)): Path<(String, String)>,
    user: AuthUser,
) -> ApiResult<Json<Quest>> {
    let quest = state.store.update(&id, |g| g.claim_quest(user.id(), &quest_id))?;
    Ok(Json(quest))
}
