use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::guild::model::MarketplaceItem;
use crate::guild::ops::NewListing;
use crate::http::response::ApiResult;
use crate::http::server::AppState;

pub async fn list_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: Result<Json<NewListing>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MarketplaceItem>)> {
    let Json(draft) = payload?;
    let item = state.store.update(&id, |g| g.list_item(user.id(), draft))?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn buy_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
    user: AuthUser,
) -> ApiResult<Json<MarketplaceItem>> {
    let item = state.store.update(&id, |g| g.buy_item(user.id(), &item_id))?;
    tracing::info!(guild = %id, item = %item_id, buyer = %user.id(), "Item sold");
    Ok(Json(item))
}
