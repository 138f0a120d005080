//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Key source (env / keys file)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → contract.rs (streak reads, activateStreak)
//!     → transaction.rs (gas cap, receipt confirmation)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Graceful degradation when blockchain unreachable

pub mod client;
pub mod contract;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use contract::{AtiaContract, StreakContract};
pub use types::{
    ActivationStatus, BlockchainConfig, BlockchainError, BlockchainResult, ChainId, StreakInfo,
};
pub use wallet::Wallet;
