//! # Phantom Transfer Solana
//!
//! The Solana side of the demo: a [`NetworkConnection`] handle created once and
//! shared by every handler, the locally generated [`LocalAccount`], lamport
//! [`Lamports`] amounts and construction of the single-instruction transfer.

#![forbid(unsafe_code)]

pub mod account;
pub mod amount;
pub mod connection;
pub mod transfer;

pub use account::LocalAccount;
pub use amount::{Lamports, AIRDROP_SOL, LAMPORTS_PER_SOL, TRANSFER_SOL};
pub use connection::{
    parse_commitment, BlockhashConfirmation, BlockhashWithExpiry, ConfirmationSettings,
    ConfirmationStatus, NetworkConnection, SolanaConnection, DEFAULT_ENDPOINT,
};
pub use transfer::{build_transfer, decode_transfer, TransferSummary};

pub use solana_commitment_config::CommitmentConfig;
pub use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
