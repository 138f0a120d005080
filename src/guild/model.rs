//! Guild document schema.
//!
//! A guild is a single document; every other entity lives inside it.
//! Field names serialize in camelCase, which is both the API wire format
//! and the snapshot format of the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Member role. The only access-control signal inside a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Guild Master")]
    GuildMaster,
    Officer,
    Member,
    #[serde(rename = "Treasury Manager")]
    TreasuryManager,
}

impl Role {
    /// Roles allowed to manage members, quests, teams and settings.
    pub fn is_manager(self) -> bool {
        matches!(self, Role::GuildMaster | Role::Officer)
    }

    /// Roles allowed to manage the treasury.
    pub fn is_treasury_manager(self) -> bool {
        matches!(self, Role::GuildMaster | Role::TreasuryManager)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub avatar_url: String,
    pub guild_score: i64,
    pub wallet_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward: u64,
    #[serde(default)]
    pub claimed_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axie {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub manager_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholar_id: Option<String>,
    #[serde(default)]
    pub applicants: Vec<String>,
    pub wallet_address: String,
    /// Stored exactly as submitted. Stripped before leaving the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_password: Option<String>,
    #[serde(default)]
    pub axies: Vec<Axie>,
}

impl Team {
    pub fn is_assigned(&self) -> bool {
        self.scholar_id.is_some()
    }

    /// Copy without the stored password.
    pub fn redacted(&self) -> Team {
        Team {
            encrypted_password: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Active,
    Passed,
    Failed,
    Expired,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Active => "active",
            ProposalStatus::Passed => "passed",
            ProposalStatus::Failed => "failed",
            ProposalStatus::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    For,
    Against,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub proposer: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Voter id to choice. One entry per voter.
    #[serde(default)]
    pub votes: BTreeMap<String, VoteChoice>,
    /// Participation required for the vote to be valid, as a fraction.
    pub quorum: f64,
}

impl Proposal {
    /// Status as observed at `now`. Expiry is a read-time check; the stored
    /// status is never transitioned by it.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ProposalStatus {
        if self.status == ProposalStatus::Active && now >= self.expires_at {
            ProposalStatus::Expired
        } else {
            self.status
        }
    }

    /// Returns (for, against).
    pub fn tally(&self) -> (usize, usize) {
        self.votes.values().fold((0, 0), |(f, a), v| match v {
            VoteChoice::For => (f + 1, a),
            VoteChoice::Against => (f, a + 1),
        })
    }

    /// Whether turnout reached quorum for a roster of `member_count`.
    pub fn quorum_reached(&self, member_count: usize) -> bool {
        if member_count == 0 {
            return false;
        }
        self.votes.len() as f64 / member_count as f64 >= self.quorum
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Sold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub seller_id: String,
    pub seller_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub author_id: String,
    pub author: String,
    pub avatar_url: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryNft {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub owner_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treasury {
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
    #[serde(default)]
    pub nfts: Vec<TreasuryNft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon_url: String,
    pub banner_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub treasury: Treasury,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub quests: Vec<Quest>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub marketplace: Vec<MarketplaceItem>,
    #[serde(default)]
    pub chat_messages: Vec<ChatMessage>,
}

impl Guild {
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Copy suitable for API responses: team passwords removed, proposal
    /// statuses evaluated at `now`.
    pub fn public_view(&self, now: DateTime<Utc>) -> Guild {
        let mut view = self.clone();
        view.teams = self.teams.iter().map(Team::redacted).collect();
        for proposal in &mut view.proposals {
            proposal.status = proposal.effective_status(now);
        }
        view
    }
}
