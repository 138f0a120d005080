//! Repeating prayer runs.
//!
//! Used by `guildhq-blessings --daemon` and by the API server when
//! `prayer.enabled` is set. A run in progress is never interrupted; shutdown
//! is observed between runs.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::prayer::runner::{PrayerRunner, RunReport};
use crate::prayer::PrayerError;

pub struct PrayerScheduler {
    runner: PrayerRunner,
    interval: Duration,
    last_report: RwLock<Option<RunReport>>,
    running: Arc<Mutex<()>>,
}

impl PrayerScheduler {
    pub fn new(runner: PrayerRunner, interval: Duration) -> Self {
        Self {
            runner,
            interval,
            last_report: RwLock::new(None),
            running: Arc::new(Mutex::new(())),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run now, waiting for any run in progress to finish first.
    pub async fn run_once(&self) -> Result<RunReport, PrayerError> {
        let _guard = self.running.lock().await;
        self.execute().await
    }

    /// Start a run on its own task unless one is already in progress.
    ///
    /// The run finishes and its report is stored even if nobody awaits the
    /// returned handle.
    pub fn spawn_run(self: &Arc<Self>) -> Result<JoinHandle<Result<RunReport, PrayerError>>, PrayerError> {
        let guard = self
            .running
            .clone()
            .try_lock_owned()
            .map_err(|_| PrayerError::Busy)?;
        let scheduler = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let _guard = guard;
            scheduler.execute().await
        }))
    }

    async fn execute(&self) -> Result<RunReport, PrayerError> {
        let report = self.runner.run().await?;
        *self.last_report.write().await = Some(report.clone());
        Ok(report)
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    pub async fn last_report(&self) -> Option<RunReport> {
        self.last_report.read().await.clone()
    }

    /// Run immediately, then every `interval`, until shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Prayer scheduler started");
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!(error = %e, "Scheduled prayer run failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Prayer scheduler stopping");
                    break;
                }
            }
        }
    }
}

impl std::fmt::Debug for PrayerScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrayerScheduler")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
