//! Guild document store.
//!
//! One document per guild, keyed by guild id. Each mutation runs while the
//! document's map entry is held, which gives per-document atomicity: two
//! writers on the same guild are serialized, writers on different guilds
//! are not. There are no cross-document transactions.
//!
//! The store can be snapshotted to and restored from a JSON file.

use dashmap::DashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::guild::{Guild, GuildError, GuildResult};
use crate::observability::metrics;

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Snapshot IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// A thread-safe, cloneable handle to the guild documents.
#[derive(Clone, Default)]
pub struct GuildStore {
    inner: Arc<DashMap<String, Guild>>,
    persistence_path: Option<PathBuf>,
}

impl std::fmt::Debug for GuildStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuildStore")
            .field("guilds", &self.inner.len())
            .field("persistence_path", &self.persistence_path)
            .finish()
    }
}

impl GuildStore {
    /// Create an empty store, optionally bound to a snapshot file.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
        }
    }

    /// Load from a snapshot file if it exists; otherwise start empty.
    ///
    /// The file stays bound to the store for later [`GuildStore::save_to_file`] calls.
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let guilds: Vec<Guild> = serde_json::from_reader(reader)?;
            for guild in guilds {
                store.inner.insert(guild.id.clone(), guild);
            }
            tracing::info!(path = ?path, guilds = store.len(), "Loaded guild snapshot");
        }
        metrics::record_guild_count(store.len());
        Ok(store)
    }

    /// Write all documents to the bound snapshot file. No-op when unbound.
    pub fn save_to_file(&self) -> Result<(), StoreError> {
        if let Some(path) = &self.persistence_path {
            let writer = BufWriter::new(File::create(path)?);
            let guilds = self.list();
            serde_json::to_writer_pretty(writer, &guilds)?;
            tracing::info!(path = ?path, guilds = guilds.len(), "Saved guild snapshot");
        }
        Ok(())
    }

    /// All guilds ordered by id.
    pub fn list(&self) -> Vec<Guild> {
        let mut guilds: Vec<Guild> = self.inner.iter().map(|r| r.value().clone()).collect();
        guilds.sort_by(|a, b| a.id.cmp(&b.id));
        guilds
    }

    pub fn get(&self, id: &str) -> Option<Guild> {
        self.inner.get(id).map(|r| r.value().clone())
    }

    /// Allocate a fresh document id.
    pub fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Insert a document, replacing any document with the same id.
    pub fn insert(&self, guild: Guild) -> Guild {
        self.inner.insert(guild.id.clone(), guild.clone());
        metrics::record_guild_count(self.inner.len());
        guild
    }

    /// Apply `f` to the guild `id` as a single read-modify-write.
    ///
    /// `f` works on a draft; the document is replaced only when `f` succeeds.
    pub fn update<T, F>(&self, id: &str, f: F) -> GuildResult<T>
    where
        F: FnOnce(&mut Guild) -> GuildResult<T>,
    {
        let mut entry = self
            .inner
            .get_mut(id)
            .ok_or_else(|| GuildError::not_found("guild", id))?;
        let mut draft = entry.value().clone();
        let out = f(&mut draft)?;
        *entry.value_mut() = draft;
        Ok(out)
    }

    /// Id of the guild owning team `team_id`.
    pub fn find_team_guild(&self, team_id: &str) -> Option<String> {
        self.inner
            .iter()
            .find(|r| r.value().team(team_id).is_some())
            .map(|r| r.key().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guild::ops::{NewGuild, UserProfile};
    use chrono::Utc;

    fn founder() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            name: "Aria".into(),
            avatar_url: String::new(),
            wallet_address: Some("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".into()),
        }
    }

    fn guild(store: &GuildStore, name: &str) -> Guild {
        let g = Guild::found(
            store.next_id(),
            NewGuild {
                name: name.into(),
                description: String::new(),
            },
            &founder(),
            1000,
            Utc::now(),
        )
        .unwrap();
        store.insert(g)
    }

    #[test]
    fn test_update_applies_on_success_only() {
        let store = GuildStore::new(None);
        let g = guild(&store, "Raiders");

        let result: GuildResult<()> = store.update(&g.id, |doc| {
            doc.name = "Renamed".into();
            Err(GuildError::Invalid("nope".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.get(&g.id).unwrap().name, "Raiders");

        store
            .update(&g.id, |doc| {
                doc.name = "Renamed".into();
                Ok(())
            })
            .unwrap();
        assert_eq!(store.get(&g.id).unwrap().name, "Renamed");
    }

    #[test]
    fn test_debug_summarizes_documents() {
        let store = GuildStore::default();
        guild(&store, "Raiders");
        let debug = format!("{:?}", store);
        assert!(debug.contains("guilds: 1"));
        assert!(!debug.contains("members"));
    }

    #[test]
    fn test_update_unknown_guild() {
        let store = GuildStore::new(None);
        let err = store.update("missing", |_| Ok(())).unwrap_err();
        assert_eq!(err, GuildError::not_found("guild", "missing"));
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let store = GuildStore::new(None);
        let g = guild(&store, "Raiders");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                let id = g.id.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        store
                            .update(&id, |doc| {
                                doc.tags.push(format!("{}-{}", i, j));
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Two initial tags plus every pushed one.
        assert_eq!(store.get(&g.id).unwrap().tags.len(), 2 + 8 * 25);
    }

    #[test]
    fn test_find_team_guild() {
        let store = GuildStore::new(None);
        let g = guild(&store, "Raiders");
        let team = store
            .update(&g.id, |doc| {
                doc.create_team(
                    "u1",
                    crate::guild::ops::NewTeam {
                        name: "Alpha".into(),
                        wallet_address: "0xteam".into(),
                        password: None,
                        axies: Default::default(),
                    },
                )
            })
            .unwrap();
        assert_eq!(store.find_team_guild(&team.id), Some(g.id));
        assert_eq!(store.find_team_guild("team-none"), None);
    }

    #[test]
    fn test_persistence() {
        let path = std::env::temp_dir().join(format!("guildhq-store-{}.json", Uuid::new_v4()));

        let store = GuildStore::new(Some(path.clone()));
        let g = guild(&store, "Raiders");
        store.save_to_file().unwrap();

        let loaded = GuildStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(&g.id).unwrap().name, "Raiders");

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_missing_file_starts_empty() {
        let path = std::env::temp_dir().join(format!("guildhq-absent-{}.json", Uuid::new_v4()));
        let store = GuildStore::load_from_file(&path).unwrap();
        assert!(store.is_empty());
    }
}
