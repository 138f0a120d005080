//! Operator endpoints, guarded by `admin.api_key`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/prayer", get(get_prayer))
        .route("/admin/prayer/run", post(run_prayer))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
