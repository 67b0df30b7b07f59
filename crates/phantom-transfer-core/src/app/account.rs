use super::state::{FundingReceipt, Status};
use super::DemoApp;
use phantom_transfer_error::{DemoError, Result};
use phantom_transfer_solana::{
    BlockhashConfirmation, CommitmentConfig, ConfirmationStatus, LocalAccount,
};
use std::sync::Arc;

impl DemoApp {
    /// Generates a new sender, airdrops to it and waits for the airdrop to confirm.
    ///
    /// The keypair is stored before any network call, replacing the previous
    /// sender. If a later step fails the new keypair stays set but unfunded.
    /// A result whose generation was overtaken by a newer creation is
    /// discarded with [`DemoError::Superseded`].
    pub async fn create_account(&self) -> Result<FundingReceipt> {
        let account = Arc::new(LocalAccount::generate());
        let pubkey = account.pubkey();
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.sender = Some(Arc::clone(&account));
            state.funded = false;
            state.status = Some(Status::Info(format!("Sender account: {pubkey}")));
            state.generation
        };
        tracing::info!(%pubkey, generation, "Sender account created");

        let result = self.fund(&account, generation).await;
        match &result {
            Ok(_) => {}
            Err(DemoError::Superseded { current, .. }) => {
                tracing::debug!(%pubkey, generation, current, "Discarding superseded funding result");
            }
            Err(err) => {
                tracing::error!(%pubkey, generation, error = %err, "Funding sender account failed");
                let mut state = self.state();
                if state.generation == generation {
                    state.status = Some(Status::Error(format!("Funding failed: {err}")));
                }
            }
        }
        result
    }

    async fn fund(&self, account: &LocalAccount, generation: u64) -> Result<FundingReceipt> {
        let pubkey = account.pubkey();
        let amount = self.settings.airdrop;
        tracing::info!(%pubkey, lamports = amount.get(), "Airdropping {amount} SOL to sender wallet");

        let signature = self.connection.request_airdrop(&pubkey, amount).await?;
        let latest = self.connection.get_latest_blockhash().await?;
        let status = self
            .connection
            .confirm_transaction(
                BlockhashConfirmation::new(signature, latest),
                CommitmentConfig::confirmed(),
            )
            .await?;

        match status {
            ConfirmationStatus::Confirmed => {}
            ConfirmationStatus::Failed(reason) => {
                return Err(DemoError::AirdropNotConfirmed {
                    signature: signature.to_string(),
                    reason,
                })
            }
            ConfirmationStatus::Expired => {
                return Err(DemoError::AirdropNotConfirmed {
                    signature: signature.to_string(),
                    reason: "blockhash expired".to_string(),
                })
            }
        }

        let balance = account.balance(self.connection.as_ref()).await?;
        tracing::info!(%pubkey, lamports = balance.get(), "Wallet Balance: {balance}");

        let mut state = self.state();
        if state.generation != generation {
            return Err(DemoError::Superseded {
                generation,
                current: state.generation,
            });
        }
        state.funded = true;
        state.status = Some(Status::Info(format!("Wallet Balance: {balance}")));

        Ok(FundingReceipt {
            pubkey,
            airdrop_signature: signature,
            balance,
            generation,
        })
    }
}
