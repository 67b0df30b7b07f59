//! Network connection handle and signature confirmation.

use crate::amount::Lamports;
use async_trait::async_trait;
use phantom_transfer_error::{DemoError, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use std::time::Duration;

/// Endpoint of a local `solana-test-validator`.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8899";

/// A recent blockhash together with the last block height at which
/// transactions referencing it are still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashWithExpiry {
    /// The blockhash
    pub blockhash: Hash,
    /// Last block height at which the blockhash is valid
    pub last_valid_block_height: u64,
}

/// What to wait for: a signature, bounded by the validity window of a blockhash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashConfirmation {
    /// Signature of the transaction being confirmed
    pub signature: Signature,
    /// Blockhash used to bound the wait
    pub blockhash: Hash,
    /// Confirmation gives up once the chain passes this height
    pub last_valid_block_height: u64,
}

impl BlockhashConfirmation {
    /// Pairs a signature with a fetched blockhash
    pub fn new(signature: Signature, latest: BlockhashWithExpiry) -> Self {
        Self {
            signature,
            blockhash: latest.blockhash,
            last_valid_block_height: latest.last_valid_block_height,
        }
    }
}

/// Outcome of waiting for a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Reached the requested commitment
    Confirmed,
    /// Landed but the transaction failed
    Failed(String),
    /// The blockhash expired first
    Expired,
}

impl ConfirmationStatus {
    /// Returns true for [`ConfirmationStatus::Confirmed`]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmationStatus::Confirmed)
    }
}

/// Channel to a blockchain node, created once and shared read-only.
#[async_trait]
pub trait NetworkConnection: Send + Sync {
    /// Returns the endpoint URL
    fn endpoint(&self) -> &str;

    /// Returns the commitment used for queries and confirmation
    fn commitment(&self) -> CommitmentConfig;

    /// Requests a faucet credit and returns the airdrop signature
    async fn request_airdrop(&self, to: &Pubkey, lamports: Lamports) -> Result<Signature>;

    /// Fetches the latest blockhash and its validity window
    async fn get_latest_blockhash(&self) -> Result<BlockhashWithExpiry>;

    /// Waits until the signature reaches `commitment`, fails, or its blockhash expires
    async fn confirm_transaction(
        &self,
        strategy: BlockhashConfirmation,
        commitment: CommitmentConfig,
    ) -> Result<ConfirmationStatus>;

    /// Queries the balance of an address
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<Lamports>;

    /// Submits a signed transaction and waits until it confirms, fails or its blockhash expires
    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature>;
}

/// Polling behaviour of [`SolanaConnection::confirm_transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationSettings {
    /// Delay between signature status queries
    pub poll_interval: Duration,
    /// Upper bound on the whole wait
    pub timeout: Duration,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Parses a commitment level name.
///
/// # Errors
/// Returns [`DemoError::Config`] for anything other than `processed`, `confirmed` or `finalized`.
pub fn parse_commitment(level: &str) -> Result<CommitmentConfig> {
    match level.trim().to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(DemoError::Config(format!(
            "unknown commitment level '{other}'"
        ))),
    }
}

/// A [`NetworkConnection`] backed by the Solana RPC client.
pub struct SolanaConnection {
    rpc_client: RpcClient,
    endpoint: String,
    commitment: CommitmentConfig,
    confirmation: ConfirmationSettings,
}

impl SolanaConnection {
    /// Creates a connection with the default commitment level (`confirmed`).
    ///
    /// # Errors
    /// Returns an `Error` if the endpoint is not an http(s) URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::new_with_commitment(endpoint, CommitmentConfig::confirmed())
    }

    /// Creates a connection with a specified commitment level.
    ///
    /// # Errors
    /// Returns an `Error` if the endpoint is not an http(s) URL.
    pub fn new_with_commitment(endpoint: &str, commitment: CommitmentConfig) -> Result<Self> {
        let parsed = url::Url::parse(endpoint).map_err(|e| DemoError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DemoError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self::from_rpc_client(
            RpcClient::new_with_commitment(endpoint.to_string(), commitment),
            commitment,
        ))
    }

    pub(crate) fn from_rpc_client(rpc_client: RpcClient, commitment: CommitmentConfig) -> Self {
        Self {
            endpoint: rpc_client.url(),
            rpc_client,
            commitment,
            confirmation: ConfirmationSettings::default(),
        }
    }

    /// Overrides the confirmation polling behaviour
    pub fn with_confirmation(mut self, confirmation: ConfirmationSettings) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Returns the confirmation polling behaviour
    pub fn confirmation(&self) -> ConfirmationSettings {
        self.confirmation
    }

    /// Returns the underlying `RpcClient`.
    pub fn rpc_client(&self) -> &RpcClient {
        &self.rpc_client
    }

    async fn poll_confirmation(
        &self,
        signature: Signature,
        validity: Validity,
        commitment: CommitmentConfig,
    ) -> Result<ConfirmationStatus> {
        loop {
            let status = self
                .rpc_client
                .get_signature_status_with_commitment(&signature, commitment)
                .await
                .map_err(|e| DemoError::rpc("getSignatureStatuses", e))?;

            match status {
                Some(Ok(())) => return Ok(ConfirmationStatus::Confirmed),
                Some(Err(err)) => return Ok(ConfirmationStatus::Failed(err.to_string())),
                None => {}
            }

            if self.has_expired(validity, commitment).await? {
                return Ok(ConfirmationStatus::Expired);
            }

            tracing::trace!(%signature, ?validity, "Waiting for confirmation");
            tokio::time::sleep(self.confirmation.poll_interval).await;
        }
    }

    async fn has_expired(&self, validity: Validity, commitment: CommitmentConfig) -> Result<bool> {
        match validity {
            Validity::BlockHeight(last_valid_block_height) => {
                let block_height = self
                    .rpc_client
                    .get_block_height_with_commitment(commitment)
                    .await
                    .map_err(|e| DemoError::rpc("getBlockHeight", e))?;
                Ok(block_height > last_valid_block_height)
            }
            Validity::Blockhash(blockhash) => {
                let valid = self
                    .rpc_client
                    .is_blockhash_valid(&blockhash, commitment)
                    .await
                    .map_err(|e| DemoError::rpc("isBlockhashValid", e))?;
                Ok(!valid)
            }
        }
    }

    /// Polls under the overall confirmation timeout.
    async fn wait_for(
        &self,
        signature: Signature,
        validity: Validity,
        commitment: CommitmentConfig,
    ) -> Result<ConfirmationStatus> {
        let limit = self.confirmation.timeout;
        tokio::time::timeout(limit, self.poll_confirmation(signature, validity, commitment))
            .await
            .map_err(|_| DemoError::TransactionTimeout {
                seconds: limit.as_secs(),
            })?
    }
}

/// How long a pending signature is worth waiting for.
#[derive(Debug, Clone, Copy)]
enum Validity {
    /// Until the chain passes this height
    BlockHeight(u64),
    /// Until the node stops accepting this blockhash
    Blockhash(Hash),
}

#[async_trait]
impl NetworkConnection for SolanaConnection {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    async fn request_airdrop(&self, to: &Pubkey, lamports: Lamports) -> Result<Signature> {
        self.rpc_client
            .request_airdrop(to, lamports.get())
            .await
            .map_err(|e| DemoError::rpc("requestAirdrop", e))
    }

    async fn get_latest_blockhash(&self) -> Result<BlockhashWithExpiry> {
        let (blockhash, last_valid_block_height) = self
            .rpc_client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(|e| DemoError::rpc("getLatestBlockhash", e))?;
        Ok(BlockhashWithExpiry {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn confirm_transaction(
        &self,
        strategy: BlockhashConfirmation,
        commitment: CommitmentConfig,
    ) -> Result<ConfirmationStatus> {
        self.wait_for(
            strategy.signature,
            Validity::BlockHeight(strategy.last_valid_block_height),
            commitment,
        )
        .await
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<Lamports> {
        self.rpc_client
            .get_balance(pubkey)
            .await
            .map(Lamports)
            .map_err(|e| DemoError::rpc("getBalance", e))
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let signature = self
            .rpc_client
            .send_transaction(transaction)
            .await
            .map_err(|e| DemoError::TransactionFailed(e.to_string()))?;
        tracing::debug!(%signature, "Transaction submitted");

        let validity = Validity::Blockhash(transaction.message.recent_blockhash);
        match self.wait_for(signature, validity, self.commitment).await? {
            ConfirmationStatus::Confirmed => Ok(signature),
            ConfirmationStatus::Failed(reason) => Err(DemoError::TransactionFailed(reason)),
            ConfirmationStatus::Expired => Err(DemoError::BlockhashExpired {
                signature: signature.to_string(),
            }),
        }
    }
}


// ============================================================================
// Confirmation Tests (mock RPC sender)
// ============================================================================


// ============================================================================
// Integration Tests (require a running solana-test-validator)
// ============================================================================

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::amount::AIRDROP_SOL;
    use solana_sdk::signature::{Keypair, Signer};

    #[tokio::test]
    #[ignore = "Requires a local solana-test-validator"]
    async fn test_airdrop_and_confirm_local() {
        let connection = SolanaConnection::new(DEFAULT_ENDPOINT).unwrap();
        let keypair = Keypair::new();
        let amount = Lamports::from_sol(AIRDROP_SOL).unwrap();

        let signature = connection
            .request_airdrop(&keypair.pubkey(), amount)
            .await
            .unwrap();
        let latest = connection.get_latest_blockhash().await.unwrap();
        let status = connection
            .confirm_transaction(
                BlockhashConfirmation::new(signature, latest),
                CommitmentConfig::confirmed(),
            )
            .await
            .unwrap();
        assert!(status.is_confirmed());

        let balance = connection.get_balance(&keypair.pubkey()).await.unwrap();
        assert!(balance >= amount);
    }
}
