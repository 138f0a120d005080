//! Guild operations.
//!
//! Every mutation is a method on [`Guild`] taking the acting user's id.
//! The store applies them to a draft copy of the document and writes it back
//! only on success, so a rejected operation leaves the document untouched.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::guild::error::{GuildError, GuildResult};
use crate::guild::model::*;

pub const PLACEHOLDER_ICON: &str = "https://placehold.co/128x128.png";
pub const PLACEHOLDER_BANNER: &str = "https://placehold.co/600x240.png";
pub const PLACEHOLDER_AVATAR: &str = "https://placehold.co/100x100.png";
pub const PLACEHOLDER_AXIE: &str = "https://placehold.co/150x150.png";
pub const PLACEHOLDER_ITEM: &str = "https://placehold.co/400x400.png";
pub const PLACEHOLDER_WALLET: &str = "0x...placeholder";

/// Generate a document-local id such as `quest-6f1c…`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// The authenticated user as seen by guild operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGuild {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub banner_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberAction {
    Promote,
    Demote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub reward: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Donation {
    Token {
        symbol: String,
        amount: f64,
    },
    Nft {
        id: String,
        name: String,
        #[serde(rename = "imageUrl", default)]
        image_url: Option<String>,
    },
}

/// Axie ids, either as a JSON list or a comma separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AxieIds {
    List(Vec<String>),
    Csv(String),
}

impl AxieIds {
    pub fn into_axies(self) -> Vec<Axie> {
        let ids: Vec<String> = match self {
            AxieIds::List(ids) => ids,
            AxieIds::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        ids.iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(|id| Axie {
                id: id.to_string(),
                name: format!("Axie {}", id),
                image_url: PLACEHOLDER_AXIE.to_string(),
            })
            .collect()
    }
}

impl Default for AxieIds {
    fn default() -> Self {
        AxieIds::List(Vec::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub name: String,
    pub wallet_address: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub axies: AxieIds,
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub window: Duration,
    pub quorum: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn require_text(field: &str, value: &str) -> GuildResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GuildError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

impl Guild {
    /// Build a new guild document with `founder` as its Guild Master.
    pub fn found(
        id: String,
        draft: NewGuild,
        founder: &UserProfile,
        founder_score: i64,
        now: DateTime<Utc>,
    ) -> GuildResult<Guild> {
        let name = require_text("name", &draft.name)?;
        Ok(Guild {
            id,
            summary: format!(
                "Welcome to {}! A new guild founded on {}.",
                name,
                now.format("%Y-%m-%d")
            ),
            name,
            description: draft.description.trim().to_string(),
            icon_url: PLACEHOLDER_ICON.to_string(),
            banner_url: PLACEHOLDER_BANNER.to_string(),
            tags: vec!["New".to_string(), "PvE".to_string()],
            treasury: Treasury::default(),
            members: vec![Member {
                id: founder.id.clone(),
                name: founder.name.clone(),
                role: Role::GuildMaster,
                avatar_url: founder.avatar_url.clone(),
                guild_score: founder_score,
                wallet_address: founder
                    .wallet_address
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER_WALLET.to_string()),
            }],
            quests: Vec::new(),
            teams: Vec::new(),
            proposals: Vec::new(),
            marketplace: Vec::new(),
            chat_messages: Vec::new(),
        })
    }

    fn acting_member(&self, actor: &str) -> GuildResult<&Member> {
        self.member(actor)
            .ok_or_else(|| GuildError::NotAMember(actor.to_string()))
    }

    fn require_manager(&self, actor: &str) -> GuildResult<()> {
        if self.acting_member(actor)?.role.is_manager() {
            Ok(())
        } else {
            Err(GuildError::Forbidden(
                "requires Guild Master or Officer".to_string(),
            ))
        }
    }

    fn team_mut(&mut self, team_id: &str) -> GuildResult<&mut Team> {
        self.teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or_else(|| GuildError::not_found("team", team_id))
    }

    pub fn update_settings(&mut self, actor: &str, patch: GuildPatch) -> GuildResult<()> {
        self.require_manager(actor)?;
        if let Some(name) = patch.name {
            self.name = require_text("name", &name)?;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(icon_url) = patch.icon_url {
            self.icon_url = icon_url;
        }
        if let Some(banner_url) = patch.banner_url {
            self.banner_url = banner_url;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        Ok(())
    }

    pub fn join(&mut self, user: &UserProfile) -> GuildResult<Member> {
        if self.member(&user.id).is_some() {
            return Err(GuildError::Conflict("already a member".to_string()));
        }
        let member = Member {
            id: user.id.clone(),
            name: user.name.clone(),
            role: Role::Member,
            avatar_url: user.avatar_url.clone(),
            guild_score: 0,
            wallet_address: user
                .wallet_address
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_WALLET.to_string()),
        };
        self.members.push(member.clone());
        Ok(member)
    }

    /// Promote a `Member` to `Officer`, or demote an `Officer` to `Member`.
    pub fn change_member_role(
        &mut self,
        actor: &str,
        target: &str,
        action: MemberAction,
    ) -> GuildResult<Member> {
        self.require_manager(actor)?;
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == target)
            .ok_or_else(|| GuildError::not_found("member", target))?;
        member.role = match (action, member.role) {
            (MemberAction::Promote, Role::Member) => Role::Officer,
            (MemberAction::Demote, Role::Officer) => Role::Member,
            (MemberAction::Promote, _) => {
                return Err(GuildError::Conflict("only Members can be promoted".to_string()))
            }
            (MemberAction::Demote, _) => {
                return Err(GuildError::Conflict("only Officers can be demoted".to_string()))
            }
        };
        Ok(member.clone())
    }

    pub fn kick_member(&mut self, actor: &str, target: &str) -> GuildResult<Member> {
        self.require_manager(actor)?;
        if actor == target {
            return Err(GuildError::Conflict("cannot kick yourself".to_string()));
        }
        let idx = self
            .members
            .iter()
            .position(|m| m.id == target)
            .ok_or_else(|| GuildError::not_found("member", target))?;
        if self.members[idx].role == Role::GuildMaster {
            return Err(GuildError::Forbidden("cannot kick the Guild Master".to_string()));
        }
        Ok(self.members.remove(idx))
    }

    pub fn create_quest(&mut self, actor: &str, draft: NewQuest) -> GuildResult<Quest> {
        self.require_manager(actor)?;
        let quest = Quest {
            id: new_id("quest"),
            title: require_text("title", &draft.title)?,
            description: draft.description,
            reward: draft.reward,
            claimed_by: Vec::new(),
        };
        self.quests.push(quest.clone());
        Ok(quest)
    }

    pub fn claim_quest(&mut self, actor: &str, quest_id: &str) -> GuildResult<Quest> {
        self.acting_member(actor)?;
        let quest = self
            .quests
            .iter_mut()
            .find(|q| q.id == quest_id)
            .ok_or_else(|| GuildError::not_found("quest", quest_id))?;
        if quest.claimed_by.iter().any(|id| id == actor) {
            return Err(GuildError::Conflict("quest already claimed".to_string()));
        }
        quest.claimed_by.push(actor.to_string());
        Ok(quest.clone())
    }

    pub fn donate(&mut self, actor: &str, donation: Donation) -> GuildResult<Treasury> {
        self.acting_member(actor)?;
        match donation {
            Donation::Token { symbol, amount } => {
                let symbol = require_text("symbol", &symbol)?.to_uppercase();
                if !amount.is_finite() || amount <= 0.0 {
                    return Err(GuildError::Invalid("amount must be positive".to_string()));
                }
                match self.treasury.tokens.iter_mut().find(|t| t.symbol == symbol) {
                    Some(token) => token.balance += amount,
                    None => self.treasury.tokens.push(TokenBalance {
                        symbol,
                        balance: amount,
                    }),
                }
            }
            Donation::Nft {
                id,
                name,
                image_url,
            } => {
                let id = require_text("id", &id)?;
                if self.treasury.nfts.iter().any(|n| n.id == id) {
                    return Err(GuildError::Conflict(format!("NFT {} already in treasury", id)));
                }
                self.treasury.nfts.push(TreasuryNft {
                    id,
                    name: require_text("name", &name)?,
                    image_url: image_url.unwrap_or_else(|| PLACEHOLDER_ITEM.to_string()),
                    owner_id: actor.to_string(),
                });
            }
        }
        Ok(self.treasury.clone())
    }

    /// Withdraw `amount` of `symbol` from the treasury. Treasury managers only.
    pub fn disburse(&mut self, actor: &str, symbol: &str, amount: f64) -> GuildResult<Treasury> {
        if !self.acting_member(actor)?.role.is_treasury_manager() {
            return Err(GuildError::Forbidden(
                "requires Guild Master or Treasury Manager".to_string(),
            ));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(GuildError::Invalid("amount must be positive".to_string()));
        }
        let symbol = require_text("symbol", symbol)?.to_uppercase();
        let token = self
            .treasury
            .tokens
            .iter_mut()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| GuildError::not_found("token", symbol.clone()))?;
        if token.balance < amount {
            return Err(GuildError::Conflict(format!(
                "insufficient {} balance: {} < {}",
                symbol, token.balance, amount
            )));
        }
        token.balance -= amount;
        Ok(self.treasury.clone())
    }

    pub fn create_team(&mut self, actor: &str, draft: NewTeam) -> GuildResult<Team> {
        self.require_manager(actor)?;
        let team = Team {
            id: new_id("team"),
            name: require_text("name", &draft.name)?,
            manager_id: actor.to_string(),
            scholar_id: None,
            applicants: Vec::new(),
            wallet_address: require_text("walletAddress", &draft.wallet_address)?,
            encrypted_password: draft.password,
            axies: draft.axies.into_axies(),
        };
        self.teams.push(team.clone());
        Ok(team)
    }

    pub fn apply_to_team(&mut self, actor: &str, team_id: &str) -> GuildResult<Team> {
        self.acting_member(actor)?;
        let team = self.team_mut(team_id)?;
        if team.manager_id == actor {
            return Err(GuildError::Conflict("managers cannot apply to their own team".to_string()));
        }
        if team.is_assigned() {
            return Err(GuildError::Conflict("team already has a scholar".to_string()));
        }
        if !team.applicants.iter().any(|id| id == actor) {
            team.applicants.push(actor.to_string());
        }
        Ok(team.clone())
    }

    pub fn assign_scholar(
        &mut self,
        actor: &str,
        team_id: &str,
        scholar_id: &str,
    ) -> GuildResult<Team> {
        self.require_manager(actor)?;
        let team = self.team_mut(team_id)?;
        if !team.applicants.iter().any(|id| id == scholar_id) {
            return Err(GuildError::Invalid(format!(
                "{} has not applied to this team",
                scholar_id
            )));
        }
        team.scholar_id = Some(scholar_id.to_string());
        team.applicants.clear();
        Ok(team.clone())
    }

    pub fn unassign_scholar(&mut self, actor: &str, team_id: &str) -> GuildResult<Team> {
        self.require_manager(actor)?;
        let team = self.team_mut(team_id)?;
        team.scholar_id = None;
        Ok(team.clone())
    }

    pub fn create_proposal(
        &mut self,
        actor: &str,
        draft: NewProposal,
        now: DateTime<Utc>,
    ) -> GuildResult<Proposal> {
        let proposer = self.acting_member(actor)?.name.clone();
        if !(0.0..=1.0).contains(&draft.quorum) {
            return Err(GuildError::Invalid("quorum must be between 0 and 1".to_string()));
        }
        if draft.window <= Duration::zero() {
            return Err(GuildError::Invalid("voting window must be positive".to_string()));
        }
        let expires_at = now
            .checked_add_signed(draft.window)
            .ok_or_else(|| GuildError::Invalid("voting window is too long".to_string()))?;
        let proposal = Proposal {
            id: new_id("prop"),
            title: require_text("title", &draft.title)?,
            description: draft.description,
            proposer,
            status: ProposalStatus::Active,
            created_at: now,
            expires_at,
            votes: Default::default(),
            quorum: draft.quorum,
        };
        self.proposals.push(proposal.clone());
        Ok(proposal)
    }

    pub fn vote(
        &mut self,
        actor: &str,
        proposal_id: &str,
        choice: VoteChoice,
        now: DateTime<Utc>,
    ) -> GuildResult<Proposal> {
        self.acting_member(actor)?;
        let proposal = self
            .proposals
            .iter_mut()
            .find(|p| p.id == proposal_id)
            .ok_or_else(|| GuildError::not_found("proposal", proposal_id))?;
        let status = proposal.effective_status(now);
        if status != ProposalStatus::Active {
            return Err(GuildError::Conflict(format!("proposal is {}", status.as_str())));
        }
        if proposal.votes.contains_key(actor) {
            return Err(GuildError::Conflict("already voted".to_string()));
        }
        proposal.votes.insert(actor.to_string(), choice);
        Ok(proposal.clone())
    }

    pub fn list_item(&mut self, actor: &str, draft: NewListing) -> GuildResult<MarketplaceItem> {
        let seller_name = self.acting_member(actor)?.name.clone();
        if !draft.price.amount.is_finite() || draft.price.amount <= 0.0 {
            return Err(GuildError::Invalid("price must be positive".to_string()));
        }
        let item = MarketplaceItem {
            id: new_id("item"),
            name: require_text("name", &draft.name)?,
            description: draft.description,
            price: Price {
                amount: draft.price.amount,
                symbol: require_text("symbol", &draft.price.symbol)?,
            },
            image_url: draft.image_url.unwrap_or_else(|| PLACEHOLDER_ITEM.to_string()),
            seller_id: actor.to_string(),
            seller_name,
            buyer_id: None,
            status: ItemStatus::Available,
        };
        self.marketplace.push(item.clone());
        Ok(item)
    }

    pub fn buy_item(&mut self, actor: &str, item_id: &str) -> GuildResult<MarketplaceItem> {
        self.acting_member(actor)?;
        let item = self
            .marketplace
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| GuildError::not_found("item", item_id))?;
        if item.seller_id == actor {
            return Err(GuildError::Conflict("cannot buy your own listing".to_string()));
        }
        if item.status == ItemStatus::Sold {
            return Err(GuildError::Conflict("item already sold".to_string()));
        }
        item.buyer_id = Some(actor.to_string());
        item.status = ItemStatus::Sold;
        Ok(item.clone())
    }

    pub fn post_message(
        &mut self,
        actor: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> GuildResult<ChatMessage> {
        let author = self.acting_member(actor)?;
        let message = ChatMessage {
            id: new_id("msg"),
            author_id: author.id.clone(),
            author: author.name.clone(),
            avatar_url: author.avatar_url.clone(),
            text: require_text("text", text)?,
            timestamp: now,
        };
        self.chat_messages.push(message.clone());
        Ok(message)
    }
}
