//! Submission guards and confirmation monitoring.

use alloy::primitives::TxHash;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Refuse to submit while gas is above the configured cap.
///
/// Returns the current gas price in wei.
pub async fn check_gas_price(client: &BlockchainClient) -> BlockchainResult<u128> {
    let gas_price = client.get_gas_price().await?;
    let gas_price_gwei = gas_price / 1_000_000_000;
    let max_gwei = client.config().max_gas_price_gwei;

    if gas_price_gwei > max_gwei as u128 {
        return Err(BlockchainError::GasPriceTooHigh {
            current_gwei: gas_price_gwei as u64,
            max_gwei,
        });
    }
    Ok(gas_price)
}

/// Poll for the receipt of `tx_hash` until it has the configured number of
/// confirmations or `timeout_secs` elapses.
pub async fn wait_for_confirmation(
    client: &BlockchainClient,
    tx_hash: TxHash,
    timeout_secs: u64,
) -> BlockchainResult<ConfirmationStatus> {
    let required_confirmations = client.confirmation_blocks();

    let result = timeout(Duration::from_secs(timeout_secs), async {
        let mut ticker = interval(RECEIPT_POLL_INTERVAL);

        loop {
            ticker.tick().await;

            let receipt = match client.get_transaction_receipt(tx_hash).await? {
                Some(r) => r,
                None => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
            };

            if !receipt.status() {
                return Ok(ConfirmationStatus::Failed(
                    "Transaction reverted".to_string(),
                ));
            }

            let current_block = client.get_block_number().await?;
            let tx_block = receipt.block_number.unwrap_or(current_block);
            // The inclusion block counts as the first confirmation.
            let confirmations = current_block.saturating_sub(tx_block) as u32 + 1;

            if confirmations >= required_confirmations {
                return Ok(ConfirmationStatus::Confirmed {
                    block_number: tx_block,
                });
            }

            tracing::debug!(
                tx_hash = %tx_hash,
                confirmations = confirmations,
                required = required_confirmations,
                "Waiting for confirmations"
            );
        }
    })
    .await;

    match result {
        Ok(status) => status,
        Err(_) => Err(BlockchainError::ConfirmationTimeout(timeout_secs)),
    }
}
