use super::state::{Status, TransferReceipt};
use super::DemoApp;
use phantom_transfer_error::{DemoError, Result};
use phantom_transfer_solana::{build_transfer, LocalAccount, Pubkey};

impl DemoApp {
    /// Sends the configured amount from the local sender to the connected wallet.
    ///
    /// Without a sender or receiver nothing reaches the network. Failures are
    /// logged and returned; there is no retry and nothing to roll back.
    pub async fn transfer(&self) -> Result<TransferReceipt> {
        let (sender, receiver) = {
            let state = self.state();
            (state.sender.clone(), state.receiver)
        };

        let (sender, receiver) = match (sender, receiver) {
            (Some(sender), Some(receiver)) => (sender, receiver),
            (sender, _) => {
                let missing = if sender.is_none() {
                    "senderKeypair"
                } else {
                    "receiverPublicKey"
                };
                tracing::warn!(missing, "Missing senderKeypair or receiverPublicKey");
                let err = DemoError::MissingTransferParty { missing };
                self.set_status(Status::Error(err.to_string()));
                return Err(err);
            }
        };

        match self.submit_transfer(&sender, receiver).await {
            Ok(receipt) => {
                self.set_status(Status::Info(format!(
                    "Transferred {} SOL, signature {}",
                    receipt.amount, receipt.signature
                )));
                Ok(receipt)
            }
            Err(err) => {
                tracing::error!(error = %err, "Transfer failed");
                self.set_status(Status::Error(format!("Transfer failed: {err}")));
                Err(err)
            }
        }
    }

    async fn submit_transfer(&self, sender: &LocalAccount, to: Pubkey) -> Result<TransferReceipt> {
        let from = sender.pubkey();
        let amount = self.settings.transfer;

        let latest = self.connection.get_latest_blockhash().await?;
        let transaction = build_transfer(sender.keypair(), &to, amount, latest.blockhash);
        let signature = self
            .connection
            .send_and_confirm_transaction(&transaction)
            .await?;
        tracing::info!(%signature, %from, %to, lamports = amount.get(), "Transaction sent and confirmed");

        let sender_balance = self.connection.get_balance(&from).await?;
        let receiver_balance = self.connection.get_balance(&to).await?;
        tracing::info!(lamports = sender_balance.get(), "Sender Balance: {sender_balance}");
        tracing::info!(lamports = receiver_balance.get(), "Receiver Balance: {receiver_balance}");

        Ok(TransferReceipt {
            signature,
            from,
            to,
            amount,
            sender_balance,
            receiver_balance,
        })
    }
}
