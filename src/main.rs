//! GuildHQ API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ axum router ──▶ api handlers ──▶ Guild ops ──▶ GuildStore
//!                   │                                             │
//!                   ├── /guilds/{id}/chat/ws ◀── ChatHub ◀────────┤
//!                   ├── /guilds/{id}/prayer ──▶ streak contract (reads)
//!                   └── /admin ──▶ PrayerScheduler ──▶ streak contract (Ronin)
//!
//!     Cross-cutting: config (+ hot reload), tracing, metrics, shutdown
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use guildhq::blockchain::{AtiaContract, BlockchainClient};
use guildhq::config::{load_or_default, watcher::ConfigWatcher};
use guildhq::lifecycle::{spawn_signal_listener, Shutdown};
use guildhq::observability::{init_logging, metrics};
use guildhq::prayer::{runner_from_config, PrayerScheduler};
use guildhq::{AppState, GuildStore, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "guildhq")]
#[command(about = "GuildHQ guild API server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "guildhq.toml")]
    config: PathBuf,

    /// Override listener.bind_address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_or_default(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "guildhq starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = match &config.store.snapshot_path {
        Some(path) => GuildStore::load_from_file(Path::new(path))?,
        None => GuildStore::default(),
    };

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let mut state = AppState::new(config.clone(), store.clone());
    if config.prayer.enabled {
        let (runner, client) = runner_from_config(&config, store.clone(), None).await?;
        let scheduler = Arc::new(PrayerScheduler::new(
            runner,
            Duration::from_secs(config.prayer.interval_secs),
        ));
        tokio::spawn(scheduler.clone().run(shutdown.subscribe()));
        state = state.with_prayer(scheduler).with_chain(client);
    }

    // Streak reads for the member prayer view need no keys.
    let client = match state.chain.clone() {
        Some(client) => client,
        None => BlockchainClient::new(config.blockchain.clone())?,
    };
    let streaks = AtiaContract::from_config(client.clone())?;
    state = state.with_chain(client).with_streaks(Arc::new(streaks));

    let server = HttpServer::new(state);

    // The watcher handle must outlive the server.
    let _watcher = if args.config.exists() {
        let (watcher, updates) = ConfigWatcher::new(&args.config);
        server.apply_config_updates(updates);
        match watcher.run() {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::error!(error = %e, "Config watcher failed to start, hot reload disabled");
                None
            }
        }
    } else {
        None
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        guilds = store.len(),
        prayer_enabled = config.prayer.enabled,
        "Configuration loaded"
    );

    let server_shutdown = shutdown.subscribe();
    let mut server_task = match &config.listener.tls {
        Some(tls) => {
            let addr: std::net::SocketAddr = config.listener.bind_address.parse()?;
            let (cert, key) = (tls.cert_path.clone(), tls.key_path.clone());
            tokio::spawn(async move { server.run_tls(addr, &cert, &key, server_shutdown).await })
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            tokio::spawn(server.run(listener, server_shutdown))
        }
    };

    let mut shutdown_rx = shutdown.subscribe();
    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    tokio::select! {
        result = &mut server_task => {
            // Server exited on its own: stop the rest.
            shutdown.trigger();
            result??;
        }
        _ = shutdown_rx.recv() => {
            match tokio::time::timeout(grace, &mut server_task).await {
                Ok(result) => result??,
                Err(_) => {
                    tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, forcing shutdown");
                    server_task.abort();
                }
            }
        }
    }

    if config.store.save_on_shutdown {
        if let Err(e) = store.save_to_file() {
            tracing::error!(error = %e, "Failed to save guild snapshot");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
