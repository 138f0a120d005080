//! Manager → scholar wallet resolution.

use alloy::primitives::Address;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::guild::Guild;
use crate::prayer::PrayerError;
use crate::store::GuildStore;

/// Looks up the scholar wallets a manager signs activations for.
#[async_trait]
pub trait ScholarResolver: Send + Sync {
    async fn scholars_for(&self, manager: Address) -> Result<Vec<Address>, PrayerError>;
}

/// Resolves scholars from guild team assignments in the store.
#[derive(Debug, Clone)]
pub struct StoreScholarResolver {
    store: GuildStore,
}

impl StoreScholarResolver {
    pub fn new(store: GuildStore) -> Self {
        Self { store }
    }
}

fn parse_wallet(raw: &str) -> Option<Address> {
    raw.trim().parse().ok()
}

/// Scholar wallets of teams managed by `manager` within one guild.
pub(crate) fn scholars_in_guild(guild: &Guild, manager: Address) -> Vec<Address> {
    let manager_ids: HashSet<&str> = guild
        .members
        .iter()
        .filter(|m| parse_wallet(&m.wallet_address) == Some(manager))
        .map(|m| m.id.as_str())
        .collect();

    if manager_ids.is_empty() {
        return Vec::new();
    }

    guild
        .teams
        .iter()
        .filter(|t| manager_ids.contains(t.manager_id.as_str()))
        .filter_map(|t| t.scholar_id.as_deref().map(|s| (t, s)))
        .filter_map(|(team, scholar_id)| {
            let wallet = guild
                .member(scholar_id)
                .map(|m| m.wallet_address.as_str())
                .and_then(parse_wallet);
            if wallet.is_none() {
                tracing::warn!(
                    guild = %guild.id,
                    team = %team.id,
                    scholar = %scholar_id,
                    "Scholar has no usable wallet address, skipping"
                );
            }
            wallet
        })
        .collect()
}

fn dedup_in_order(addresses: impl IntoIterator<Item = Address>) -> Vec<Address> {
    let mut seen = HashSet::new();
    addresses.into_iter().filter(|a| seen.insert(*a)).collect()
}

#[async_trait]
impl ScholarResolver for StoreScholarResolver {
    async fn scholars_for(&self, manager: Address) -> Result<Vec<Address>, PrayerError> {
        let guilds = self.store.list();
        Ok(dedup_in_order(
            guilds.iter().flat_map(|g| scholars_in_guild(g, manager)),
        ))
    }
}

/// Fixed manager → scholars table.
#[derive(Debug, Clone, Default)]
pub struct StaticScholarResolver {
    scholars: HashMap<Address, Vec<Address>>,
}

impl StaticScholarResolver {
    pub fn new(scholars: HashMap<Address, Vec<Address>>) -> Self {
        Self { scholars }
    }

    /// Build from the `[prayer.scholars]` config table.
    pub fn from_config(table: &BTreeMap<String, Vec<String>>) -> Result<Self, PrayerError> {
        let mut scholars = HashMap::new();
        for (manager, list) in table {
            let manager: Address = manager
                .parse()
                .map_err(|e| PrayerError::Scholars(format!("manager {}: {}", manager, e)))?;
            let parsed = list
                .iter()
                .map(|s| {
                    s.parse()
                        .map_err(|e| PrayerError::Scholars(format!("scholar {}: {}", s, e)))
                })
                .collect::<Result<Vec<Address>, _>>()?;
            scholars.insert(manager, parsed);
        }
        Ok(Self { scholars })
    }

    pub fn is_empty(&self) -> bool {
        self.scholars.is_empty()
    }
}

#[async_trait]
impl ScholarResolver for StaticScholarResolver {
    async fn scholars_for(&self, manager: Address) -> Result<Vec<Address>, PrayerError> {
        Ok(dedup_in_order(
            self.scholars.get(&manager).cloned().unwrap_or_default(),
        ))
    }
}
