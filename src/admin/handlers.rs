use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::response::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::prayer::RunReport;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub guilds: usize,
    /// `None` when no chain client is configured.
    pub rpc_healthy: Option<bool>,
    pub prayer_enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerStatus {
    pub enabled: bool,
    pub running: bool,
    pub interval_secs: u64,
    pub last_report: Option<RunReport>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let rpc_healthy = match &state.chain {
        Some(client) => Some(client.is_healthy().await),
        None => None,
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        guilds: state.store.len(),
        rpc_healthy,
        prayer_enabled: state.prayer.is_some(),
    })
}

pub async fn get_prayer(State(state): State<AppState>) -> Json<PrayerStatus> {
    let status = match &state.prayer {
        Some(scheduler) => PrayerStatus {
            enabled: true,
            running: scheduler.is_running(),
            interval_secs: scheduler.interval().as_secs(),
            last_report: scheduler.last_report().await,
        },
        None => PrayerStatus {
            enabled: false,
            running: false,
            interval_secs: state.config.load().prayer.interval_secs,
            last_report: None,
        },
    };
    Json(status)
}

/// Trigger a run immediately. 409 while another run is in progress.
///
/// The run executes on its own task: a request timeout or a disconnect
/// ends the wait, not the run. The report then shows up on `/admin/prayer`.
pub async fn run_prayer(State(state): State<AppState>) -> ApiResult<Json<RunReport>> {
    let scheduler = state
        .prayer
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("prayer scheduler is disabled"))?;

    tracing::info!("Manual prayer run requested");
    let report = scheduler
        .spawn_run()?
        .await
        .map_err(|e| ApiError::internal(format!("prayer run task failed: {}", e)))??;
    Ok(Json(report))
}
