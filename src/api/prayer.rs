//! Per-member prayer streaks read from the streak contract.

use alloy::primitives::Address;
use axum::{
    extract::{Path, State},
    Json,
};
use futures_util::future::join_all;
use serde::Serialize;

use crate::blockchain::{BlockchainError, StreakContract};
use crate::guild::{GuildError, Member};
use crate::http::response::{ApiError, ApiResult};
use crate::http::server::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPrayerStatus {
    pub member_id: String,
    pub name: String,
    pub wallet_address: Address,
    /// `None` when the contract could not be read for this member.
    pub streak: Option<u64>,
    pub has_prayed_today: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn read_member(
    contract: &dyn StreakContract,
    member: &Member,
    wallet: Address,
) -> MemberPrayerStatus {
    let read = async {
        let status = contract.activation_status(wallet).await?;
        let streak = contract.streak(wallet).await?;
        Ok::<_, BlockchainError>((streak.current_streak_count, status.has_prayed_today))
    };

    let (streak, has_prayed_today, error) = match read.await {
        Ok((streak, prayed)) => (Some(streak), Some(prayed), None),
        Err(e) => {
            tracing::warn!(member = %member.id, wallet = %wallet, error = %e, "Streak read failed");
            (None, None, Some(e.to_string()))
        }
    };

    MemberPrayerStatus {
        member_id: member.id.clone(),
        name: member.name.clone(),
        wallet_address: wallet,
        streak,
        has_prayed_today,
        error,
    }
}

/// Streak and today's status for every member with a usable wallet.
pub async fn member_statuses(
    contract: &dyn StreakContract,
    members: &[Member],
) -> Vec<MemberPrayerStatus> {
    let reads = members.iter().filter_map(|m| {
        let wallet: Address = m.wallet_address.trim().parse().ok()?;
        Some(read_member(contract, m, wallet))
    });
    join_all(reads).await
}

pub async fn guild_prayer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<MemberPrayerStatus>>> {
    let guild = state
        .store
        .get(&id)
        .ok_or_else(|| GuildError::not_found("guild", &id))?;
    let contract = state
        .streaks
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("streak contract is not configured"))?;

    Ok(Json(member_statuses(contract.as_ref(), &guild.members).await))
}
