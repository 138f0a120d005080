//! Configuration file watcher for hot reload.
//!
//! Invalid edits are logged and dropped; the running configuration stays.
//! Editors often emit several events per save, so a reload is only published
//! when the file content actually changed.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::AppConfig;

/// Watches the config file and publishes validated reloads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AppConfig>,
    last_content: Arc<Mutex<Option<String>>>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let last_content = std::fs::read_to_string(path).ok();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
                last_content: Arc::new(Mutex::new(last_content)),
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let ConfigWatcher {
            path,
            update_tx,
            last_content,
        } = self;
        let watch_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match reload_if_changed(&path, &last_content) {
                        Ok(Some(config)) => {
                            tracing::info!(path = ?path, "Configuration reloaded");
                            let _ = update_tx.send(config);
                        }
                        Ok(None) => {}
                        Err(e) => tracing::error!(
                            error = %e,
                            "Failed to reload config, keeping current configuration"
                        ),
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?watch_path, "Config watcher started");
        Ok(watcher)
    }
}

fn reload_if_changed(
    path: &Path,
    last_content: &Mutex<Option<String>>,
) -> Result<Option<AppConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut last = last_content
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if last.as_deref() == Some(content.as_str()) {
        return Ok(None);
    }
    let config = parse_config(&content)?;
    *last = Some(content);
    Ok(Some(config))
}
