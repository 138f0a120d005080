//! Bindings for the prayer-streak contract.
//!
//! Only the three entry points the batch job uses are bound. The contract
//! itself is third party; nothing here models its state.

use alloy::primitives::{Address, TxHash};
use alloy::sol;
use async_trait::async_trait;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::transaction::{check_gas_price, wait_for_confirmation};
use crate::blockchain::types::{
    ActivationStatus, BlockchainError, BlockchainResult, ConfirmationStatus, StreakInfo,
};
use crate::blockchain::wallet::Wallet;

sol! {
    #[sol(rpc)]
    interface IAtiaBlessing {
        function activateStreak(address to) external;
        function getStreak(address user) external view returns (
            uint256 currentStreakCount,
            uint256 lastActivated,
            uint256 longestStreakCount,
            uint256 lostStreakCount
        );
        function getActivationStatus(address user) external view returns (
            bool isLostStreak,
            bool hasPrayedToday
        );
    }
}

/// Chain operations the batch runner needs.
#[async_trait]
pub trait StreakContract: Send + Sync {
    async fn activation_status(&self, user: Address) -> BlockchainResult<ActivationStatus>;

    async fn streak(&self, user: Address) -> BlockchainResult<StreakInfo>;

    /// Sign with `wallet`, submit `activateStreak(to)` and wait for the receipt.
    async fn activate_streak(&self, wallet: &Wallet, to: Address) -> BlockchainResult<TxHash>;
}

/// The deployed contract, reached through [`BlockchainClient`].
#[derive(Debug, Clone)]
pub struct AtiaContract {
    client: BlockchainClient,
    address: Address,
}

impl AtiaContract {
    pub fn new(client: BlockchainClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Bind to the contract address in the client's configuration.
    pub fn from_config(client: BlockchainClient) -> BlockchainResult<Self> {
        let address: Address = client.config().streak_contract.parse().map_err(|e| {
            BlockchainError::Config(format!("Invalid streak contract address: {}", e))
        })?;
        Ok(Self::new(client, address))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }
}

#[async_trait]
impl StreakContract for AtiaContract {
    async fn activation_status(&self, user: Address) -> BlockchainResult<ActivationStatus> {
        let address = self.address;
        let status = self
            .client
            .with_failover("getActivationStatus", |p| async move {
                IAtiaBlessing::new(address, p)
                    .getActivationStatus(user)
                    .call()
                    .await
            })
            .await?;

        Ok(ActivationStatus {
            is_lost_streak: status.isLostStreak,
            has_prayed_today: status.hasPrayedToday,
        })
    }

    async fn streak(&self, user: Address) -> BlockchainResult<StreakInfo> {
        let address = self.address;
        let streak = self
            .client
            .with_failover("getStreak", |p| async move {
                IAtiaBlessing::new(address, p).getStreak(user).call().await
            })
            .await?;

        Ok(StreakInfo {
            current_streak_count: streak.currentStreakCount.saturating_to(),
            last_activated: streak.lastActivated.saturating_to(),
            longest_streak_count: streak.longestStreakCount.saturating_to(),
            lost_streak_count: streak.lostStreakCount.saturating_to(),
        })
    }

    async fn activate_streak(&self, wallet: &Wallet, to: Address) -> BlockchainResult<TxHash> {
        check_gas_price(&self.client).await?;

        let provider = self.client.signing_provider(wallet);
        let contract = IAtiaBlessing::new(self.address, provider);

        let pending = contract
            .activateStreak(to)
            .send()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("activateStreak submission failed: {}", e)))?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(
            tx_hash = %tx_hash,
            manager = %wallet.address(),
            scholar = %to,
            "activateStreak submitted"
        );

        let timeout_secs = self.client.config().confirmation_timeout_secs;
        match wait_for_confirmation(&self.client, tx_hash, timeout_secs).await? {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::info!(tx_hash = %tx_hash, block = block_number, "activateStreak confirmed");
                Ok(tx_hash)
            }
            ConfirmationStatus::Failed(reason) => Err(BlockchainError::Reverted(format!(
                "{} ({})",
                reason, tx_hash
            ))),
        }
    }
}
