//! Treasury donations and disbursements.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::guild::model::Treasury;
use crate::guild::ops::Donation;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct Disbursement {
    pub symbol: String,
    pub amount: f64,
}

pub async fn donate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<Donation>, JsonRejection>,
) -> ApiResult<Json<Treasury>> {
    let Json(donation) = payload?;
    let treasury = state.store.update(&id, |g| g.donate(user.id(), donation))?;
    Ok(Json(treasury))
}

pub async fn disburse(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<Disbursement>, JsonRejection>,
) -> ApiResult<Json<Treasury>> {
    let Json(request) = payload?;
    let treasury = state
        .store
        .update(&id, |g| g.disburse(user.id(), &request.symbol, request.amount))?;
    tracing::info!(
        guild = %id,
        by = %user.id(),
        symbol = %request.symbol,
        amount = request.amount,
        "Treasury disbursement"
    );
    Ok(Json(treasury))
}
