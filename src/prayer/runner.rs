//! Daily streak activation run.
//!
//! Managers and scholars are processed strictly in order. A scholar's failure
//! is recorded in the report and never stops the run.

use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::{BlockchainResult, StreakContract, Wallet};
use crate::config::PrayerConfig;
use crate::observability::metrics;
use crate::prayer::keys::KeySource;
use crate::prayer::scholars::ScholarResolver;
use crate::prayer::PrayerError;

/// Scholars processed per manager per run; the rest are dropped.
pub const MAX_SCHOLARS_PER_MANAGER: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Pause after each successful activation.
    pub tx_delay: Duration,
    /// Check statuses only, never submit.
    pub dry_run: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self::from_config(&PrayerConfig::default())
    }
}

impl RunnerSettings {
    pub fn from_config(config: &PrayerConfig) -> Self {
        Self {
            tx_delay: Duration::from_millis(config.tx_delay_ms),
            dry_run: config.dry_run,
        }
    }
}

/// What happened for one scholar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PrayerResult {
    Activated { streak: u64, tx_hash: TxHash },
    AlreadyPrayed,
    WouldActivate { current_streak: u64 },
    Failed { reason: String },
}

impl PrayerResult {
    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            PrayerResult::Activated { .. } => "activated",
            PrayerResult::AlreadyPrayed => "already_prayed",
            PrayerResult::WouldActivate { .. } => "would_activate",
            PrayerResult::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarOutcome {
    pub manager: Address,
    pub scholar: Address,
    #[serde(flatten)]
    pub result: PrayerResult,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub managers_total: usize,
    pub managers_processed: usize,
    pub managers_skipped: usize,
    pub scholars_truncated: usize,
    pub outcomes: Vec<ScholarOutcome>,
}

impl RunReport {
    fn count(&self, label: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.label() == label)
            .count()
    }

    pub fn activated(&self) -> usize {
        self.count("activated")
    }

    pub fn already_prayed(&self) -> usize {
        self.count("already_prayed")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }
}

/// Runs the manager → scholar activation pass.
#[derive(Clone)]
pub struct PrayerRunner {
    keys: Arc<dyn KeySource>,
    resolver: Arc<dyn ScholarResolver>,
    contract: Arc<dyn StreakContract>,
    settings: RunnerSettings,
}

impl PrayerRunner {
    pub fn new(
        keys: Arc<dyn KeySource>,
        resolver: Arc<dyn ScholarResolver>,
        contract: Arc<dyn StreakContract>,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            keys,
            resolver,
            contract,
            settings,
        }
    }

    pub fn settings(&self) -> RunnerSettings {
        self.settings
    }

    /// Process every manager once. Fails only when the key source does.
    pub async fn run(&self) -> Result<RunReport, PrayerError> {
        let started_at = Utc::now();
        let keys = self.keys.manager_keys().await?;

        tracing::info!(
            managers = keys.len(),
            dry_run = self.settings.dry_run,
            "Starting daily prayer run"
        );

        let mut report = RunReport {
            started_at,
            finished_at: started_at,
            dry_run: self.settings.dry_run,
            managers_total: keys.len(),
            managers_processed: 0,
            managers_skipped: 0,
            scholars_truncated: 0,
            outcomes: Vec::new(),
        };

        for (index, key) in keys.iter().enumerate() {
            let Some(raw_key) = key.private_key() else {
                tracing::error!(entry = index, "No prayer key in manager entry, skipping");
                report.managers_skipped += 1;
                continue;
            };

            let wallet = match Wallet::from_private_key(raw_key) {
                Ok(w) => w,
                Err(e) => {
                    tracing::error!(entry = index, error = %e, "Unusable prayer key, skipping");
                    report.managers_skipped += 1;
                    continue;
                }
            };
            let manager = wallet.address();

            let mut scholars = match self.resolver.scholars_for(manager).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(manager = %manager, error = %e, "Scholar lookup failed, skipping manager");
                    report.managers_skipped += 1;
                    continue;
                }
            };

            tracing::info!(manager = %manager, scholars = scholars.len(), "Processing manager");

            if scholars.len() > MAX_SCHOLARS_PER_MANAGER {
                let dropped = scholars.len() - MAX_SCHOLARS_PER_MANAGER;
                tracing::warn!(
                    manager = %manager,
                    found = scholars.len(),
                    limit = MAX_SCHOLARS_PER_MANAGER,
                    "Too many scholars, processing the first {} only",
                    MAX_SCHOLARS_PER_MANAGER
                );
                scholars.truncate(MAX_SCHOLARS_PER_MANAGER);
                report.scholars_truncated += dropped;
            }

            for scholar in scholars {
                let result = self.pray_for(&wallet, scholar).await;
                metrics::record_prayer_outcome(result.label());
                report.outcomes.push(ScholarOutcome {
                    manager,
                    scholar,
                    result,
                });
            }
            report.managers_processed += 1;
        }

        report.finished_at = Utc::now();
        tracing::info!(
            activated = report.activated(),
            already_prayed = report.already_prayed(),
            failed = report.failed(),
            skipped_managers = report.managers_skipped,
            "Prayer run finished"
        );
        Ok(report)
    }

    async fn pray_for(&self, wallet: &Wallet, scholar: Address) -> PrayerResult {
        match self.try_pray(wallet, scholar).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    manager = %wallet.address(),
                    scholar = %scholar,
                    error = %e,
                    "Failed to pray for scholar"
                );
                PrayerResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_pray(&self, wallet: &Wallet, scholar: Address) -> BlockchainResult<PrayerResult> {
        let status = self.contract.activation_status(scholar).await?;
        if status.has_prayed_today {
            tracing::info!(scholar = %scholar, "Scholar already prayed today");
            return Ok(PrayerResult::AlreadyPrayed);
        }

        let current = self.contract.streak(scholar).await?.current_streak_count;

        if self.settings.dry_run {
            tracing::info!(scholar = %scholar, current_streak = current, "Dry run: would activate");
            return Ok(PrayerResult::WouldActivate {
                current_streak: current,
            });
        }

        let tx_hash = self.contract.activate_streak(wallet, scholar).await?;
        let streak = current + 1;
        tracing::info!(scholar = %scholar, streak, tx_hash = %tx_hash, "Streak activated");

        tokio::time::sleep(self.settings.tx_delay).await;

        Ok(PrayerResult::Activated { streak, tx_hash })
    }
}

impl std::fmt::Debug for PrayerRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrayerRunner")
            .field("settings", &self.settings)
            .finish()
    }
}
