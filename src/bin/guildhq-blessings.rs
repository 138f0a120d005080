//! Daily prayer-streak job.
//!
//! Activates the on-chain streak for every scholar assigned to each manager
//! wallet. Runs once and exits unless `--daemon` is given.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use guildhq::config::load_or_default;
use guildhq::lifecycle::{spawn_signal_listener, Shutdown};
use guildhq::observability::{init_logging, metrics};
use guildhq::prayer::{runner_from_config, PrayerResult, PrayerScheduler, RunReport};
use guildhq::GuildStore;

#[derive(Parser, Debug)]
#[command(name = "guildhq-blessings")]
#[command(about = "Activate daily prayer streaks for assigned scholars", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "guildhq.toml")]
    config: PathBuf,

    /// TOML keys file ([[keys]] prayer_private_key = "0x...");
    /// defaults to prayer.keys_file, then GUILDHQ_PRAYER_KEYS
    #[arg(short, long)]
    keys: Option<PathBuf>,

    /// Guild snapshot to resolve scholars from; defaults to store.snapshot_path
    #[arg(long)]
    store: Option<PathBuf>,

    /// Check statuses only, never submit transactions
    #[arg(long)]
    dry_run: bool,

    /// Repeat every prayer.interval_secs until Ctrl+C / SIGTERM
    #[arg(long)]
    daemon: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(&args.config)?;
    if args.dry_run {
        config.prayer.dry_run = true;
    }

    init_logging(&config.observability);

    if config.observability.metrics_enabled && args.daemon {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let snapshot = args
        .store
        .clone()
        .or_else(|| config.store.snapshot_path.as_ref().map(PathBuf::from));
    let store = match &snapshot {
        Some(path) => GuildStore::load_from_file(path)?,
        None => GuildStore::default(),
    };

    let (runner, _client) = runner_from_config(&config, store, args.keys.as_deref()).await?;

    if !args.daemon {
        let report = runner.run().await?;
        print_report(&report);
        return Ok(());
    }

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let scheduler = Arc::new(PrayerScheduler::new(
        runner,
        Duration::from_secs(config.prayer.interval_secs),
    ));
    scheduler.run(shutdown.subscribe()).await;

    tracing::info!("Prayer daemon stopped");
    Ok(())
}

fn short(address: &impl std::fmt::Display) -> String {
    let s = address.to_string();
    format!("…{}", &s[s.len().saturating_sub(4)..])
}

fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        let scholar = short(&outcome.scholar);
        match &outcome.result {
            PrayerResult::Activated { streak, tx_hash } => {
                println!("activated   {} new streak {} ({})", scholar, streak, tx_hash)
            }
            PrayerResult::AlreadyPrayed => println!("prayed      {}", scholar),
            PrayerResult::WouldActivate { current_streak } => {
                println!("dry-run     {} streak {}", scholar, current_streak)
            }
            PrayerResult::Failed { reason } => println!("failed      {} {}", scholar, reason),
        }
    }
    println!(
        "managers: {} processed, {} skipped; scholars: {} activated, {} already prayed, {} failed, {} over limit",
        report.managers_processed,
        report.managers_skipped,
        report.activated(),
        report.already_prayed(),
        report.failed(),
        report.scholars_truncated,
    );
}

