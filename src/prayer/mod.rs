//! Prayer-streak batch job.
//!
//! # Data Flow
//! ```text
//! KeySource (env / keys file)
//!     → Wallet per manager
//!     → ScholarResolver (guild teams / static table), capped at 10
//!     → StreakContract (status check, activateStreak)
//!     → RunReport
//! ```

pub mod keys;
pub mod runner;
pub mod scheduler;
pub mod scholars;

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::{AtiaContract, BlockchainClient, BlockchainError};
use crate::config::AppConfig;
use crate::store::GuildStore;

pub use keys::{EnvKeySource, FileKeySource, KeySource, ManagerKey};
pub use runner::{
    PrayerResult, PrayerRunner, RunReport, RunnerSettings, ScholarOutcome,
    MAX_SCHOLARS_PER_MANAGER,
};
pub use scheduler::PrayerScheduler;
pub use scholars::{ScholarResolver, StaticScholarResolver, StoreScholarResolver};

/// Errors that stop a manager or a whole run.
#[derive(Debug, Error)]
pub enum PrayerError {
    #[error("Key source error: {0}")]
    Keys(String),

    #[error("Scholar lookup failed: {0}")]
    Scholars(String),

    #[error("A prayer run is already in progress")]
    Busy,

    #[error(transparent)]
    Chain(#[from] BlockchainError),
}

/// Wire a runner from configuration.
///
/// Keys come from `keys_file` (argument, then `prayer.keys_file`) or
/// `GUILDHQ_PRAYER_KEYS`. Scholars come from `[prayer.scholars]` when that
/// table is non-empty, otherwise from guild teams in `store`.
pub async fn runner_from_config(
    config: &AppConfig,
    store: GuildStore,
    keys_file: Option<&Path>,
) -> Result<(PrayerRunner, BlockchainClient), PrayerError> {
    let client = BlockchainClient::connect(config.blockchain.clone()).await?;
    let contract = AtiaContract::from_config(client.clone())?;

    let keys: Arc<dyn KeySource> = match keys_file.or(config.prayer.keys_file.as_deref().map(Path::new)) {
        Some(path) => {
            tracing::info!(path = ?path, "Using prayer keys file");
            Arc::new(FileKeySource::new(path))
        }
        None => Arc::new(EnvKeySource::from_env()),
    };

    let resolver: Arc<dyn ScholarResolver> = if config.prayer.scholars.is_empty() {
        Arc::new(StoreScholarResolver::new(store))
    } else {
        tracing::info!(
            managers = config.prayer.scholars.len(),
            "Using static scholar table"
        );
        Arc::new(StaticScholarResolver::from_config(&config.prayer.scholars)?)
    };

    let runner = PrayerRunner::new(
        keys,
        resolver,
        Arc::new(contract),
        RunnerSettings::from_config(&config.prayer),
    );
    Ok((runner, client))
}
