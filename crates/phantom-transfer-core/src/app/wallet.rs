use super::state::Status;
use super::{DemoApp, DisconnectPolicy};
use crate::provider::ConnectOpts;
use phantom_transfer_error::{DemoError, Result};
use phantom_transfer_solana::Pubkey;

impl DemoApp {
    /// Asks the wallet to connect and stores its key as the receiver.
    ///
    /// Rejections are logged and leave the receiver untouched.
    pub async fn connect_wallet(&self) -> Result<Pubkey> {
        let Some(provider) = self.provider.clone() else {
            tracing::debug!("Connect requested without a provider");
            return Err(DemoError::ProviderNotFound);
        };

        match provider.connect(ConnectOpts::default()).await {
            Ok(response) => {
                let pubkey = response.public_key;
                tracing::info!(%pubkey, "Wallet account: {pubkey}");
                let mut state = self.state();
                state.receiver = Some(pubkey);
                state.status = Some(Status::Info(format!("Wallet account: {pubkey}")));
                Ok(pubkey)
            }
            Err(err) => {
                tracing::error!(error = %err, "Wallet connection failed");
                self.set_status(Status::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Asks the wallet to end its session.
    ///
    /// With [`DisconnectPolicy::RetainReceiver`] the stored receiver is left
    /// as it was, so the disconnect and transfer buttons stay visible.
    pub async fn disconnect_wallet(&self) -> Result<()> {
        let Some(provider) = self.provider.clone() else {
            tracing::debug!("Disconnect requested without a provider");
            return Err(DemoError::ProviderNotFound);
        };

        match provider.disconnect().await {
            Ok(()) => {
                let mut state = self.state();
                if self.settings.disconnect_policy == DisconnectPolicy::ClearReceiver {
                    state.receiver = None;
                }
                state.status = Some(Status::Info("Wallet disconnected".to_string()));
                tracing::info!(policy = ?self.settings.disconnect_policy, "Wallet disconnected");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Wallet disconnect failed");
                self.set_status(Status::Error(err.to_string()));
                Err(err)
            }
        }
    }
}
