//! Manager signing keys.
//!
//! Keys come from `GUILDHQ_PRAYER_KEYS` (comma separated) or a TOML file:
//!
//! ```toml
//! [[keys]]
//! prayer_private_key = "0x..."
//! ```
//!
//! An entry without a key is kept so the runner can log and skip it.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::prayer::PrayerError;

/// Environment variable holding comma-separated manager keys.
pub const PRAYER_KEYS_ENV_VAR: &str = "GUILDHQ_PRAYER_KEYS";

/// One manager entry. The key may be absent.
#[derive(Clone, Default, Deserialize)]
pub struct ManagerKey {
    #[serde(default)]
    pub prayer_private_key: Option<String>,
}

impl ManagerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            prayer_private_key: Some(key.into()),
        }
    }

    /// The key, if present and not blank.
    pub fn private_key(&self) -> Option<&str> {
        self.prayer_private_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl std::fmt::Debug for ManagerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerKey")
            .field("prayer_private_key", &self.private_key().map(|_| "<redacted>"))
            .finish()
    }
}

/// Supplies the manager entries for one run.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn manager_keys(&self) -> Result<Vec<ManagerKey>, PrayerError>;
}

/// Keys from a comma-separated string, usually `GUILDHQ_PRAYER_KEYS`.
#[derive(Clone, Default)]
pub struct EnvKeySource {
    raw: Option<String>,
}

impl EnvKeySource {
    pub fn from_env() -> Self {
        Self {
            raw: std::env::var(PRAYER_KEYS_ENV_VAR).ok(),
        }
    }

    pub fn from_value(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }
}

#[async_trait]
impl KeySource for EnvKeySource {
    async fn manager_keys(&self) -> Result<Vec<ManagerKey>, PrayerError> {
        let raw = self
            .raw
            .as_deref()
            .ok_or_else(|| PrayerError::Keys(format!("{} is not set", PRAYER_KEYS_ENV_VAR)))?;

        // Empty segments stay as keyless entries.
        Ok(raw
            .split(',')
            .map(|k| ManagerKey {
                prayer_private_key: Some(k.trim().to_string()),
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct KeysFile {
    #[serde(default)]
    keys: Vec<ManagerKey>,
}

/// Keys from a TOML file, re-read on every run.
#[derive(Debug, Clone)]
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

pub(crate) fn parse_keys_file(content: &str) -> Result<Vec<ManagerKey>, PrayerError> {
    let file: KeysFile =
        toml::from_str(content).map_err(|e| PrayerError::Keys(format!("Invalid keys file: {}", e)))?;
    Ok(file.keys)
}

#[async_trait]
impl KeySource for FileKeySource {
    async fn manager_keys(&self) -> Result<Vec<ManagerKey>, PrayerError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            PrayerError::Keys(format!("Cannot read {}: {}", self.path.display(), e))
        })?;
        parse_keys_file(&content)
    }
}

/// Fixed key list.
#[async_trait]
impl KeySource for Vec<ManagerKey> {
    async fn manager_keys(&self) -> Result<Vec<ManagerKey>, PrayerError> {
        Ok(self.clone())
    }
}
