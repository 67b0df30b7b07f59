//! The demo page: view state plus the four button handlers.
//!
//! Handlers take `&self` and may run concurrently. State lives behind a
//! mutex that is never held across an await, so a handler reads what it
//! needs, drops the lock, talks to the network or wallet, then re-locks to
//! apply its result.

mod account;
mod state;
mod transfer;
mod view;
mod wallet;

pub use state::{FundingReceipt, Status, TransferReceipt, ViewSnapshot, ViewState};
pub use view::{render, visible_actions, Action, InstallNotice, Screen, PHANTOM_INSTALL_URL};

use crate::provider::{
    detect_provider, EventHandler, HostEnvironment, ProviderEvent, ProviderEventPayload,
    WalletProvider,
};
use phantom_transfer_error::{DemoError, Result};
use phantom_transfer_solana::{Lamports, NetworkConnection, Pubkey, LAMPORTS_PER_SOL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What disconnecting does to the stored receiver key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectPolicy {
    /// Keep the receiver after the wallet disconnects (the page's long-standing behaviour)
    #[default]
    RetainReceiver,
    /// Clear the receiver so the connect button comes back
    ClearReceiver,
}

/// Fixed amounts and page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Faucet credit for a new account
    pub airdrop: Lamports,
    /// Amount moved per transfer
    pub transfer: Lamports,
    /// Disconnect behaviour
    pub disconnect_policy: DisconnectPolicy,
    /// Page heading
    pub title: String,
    /// Install link shown without a provider
    pub install_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            airdrop: Lamports(2 * LAMPORTS_PER_SOL),
            transfer: Lamports(LAMPORTS_PER_SOL),
            disconnect_policy: DisconnectPolicy::default(),
            title: "Module 2 Assessment".to_string(),
            install_url: PHANTOM_INSTALL_URL.to_string(),
        }
    }
}

/// Result of a dispatched button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new sender was created and funded
    AccountFunded(FundingReceipt),
    /// The wallet connected with this key
    WalletConnected(Pubkey),
    /// The wallet session ended
    WalletDisconnected,
    /// A transfer landed
    Transferred(TransferReceipt),
}

/// The demo page.
pub struct DemoApp {
    provider: Option<Arc<dyn WalletProvider>>,
    connection: Arc<dyn NetworkConnection>,
    settings: Settings,
    state: Mutex<ViewState>,
}

impl DemoApp {
    /// Builds the page and runs provider detection once.
    pub fn new(
        host: &HostEnvironment,
        connection: Arc<dyn NetworkConnection>,
        settings: Settings,
    ) -> Self {
        let provider = detect_provider(host);
        if let Some(provider) = &provider {
            provider.on(ProviderEvent::AccountChanged, account_change_logger());
        } else {
            tracing::info!(install_url = %settings.install_url, "No provider found");
        }

        let state = ViewState {
            provider_present: provider.is_some(),
            ..ViewState::default()
        };
        tracing::debug!(
            endpoint = connection.endpoint(),
            commitment = ?connection.commitment(),
            "Network connection ready"
        );

        Self {
            provider,
            connection,
            settings,
            state: Mutex::new(state),
        }
    }

    /// Returns the settings the page was built with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the detected provider, if any
    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.provider.as_ref()
    }

    /// Copies out the current state
    pub fn snapshot(&self) -> ViewSnapshot {
        self.state().snapshot()
    }

    /// Renders the current state
    pub fn render(&self) -> Screen {
        render(
            &self.snapshot(),
            &self.settings.title,
            &self.settings.install_url,
        )
    }

    /// Runs the handler behind a button, refusing buttons that are not rendered.
    pub async fn dispatch(&self, action: Action) -> Result<Outcome> {
        if !action.is_visible(&self.snapshot()) {
            return Err(DemoError::ActionUnavailable(action.label().to_string()));
        }
        match action {
            Action::CreateAccount => self.create_account().await.map(Outcome::AccountFunded),
            Action::ConnectWallet => self.connect_wallet().await.map(Outcome::WalletConnected),
            Action::DisconnectWallet => self
                .disconnect_wallet()
                .await
                .map(|()| Outcome::WalletDisconnected),
            Action::Transfer => self.transfer().await.map(Outcome::Transferred),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: Status) {
        self.state().status = Some(status);
    }
}

impl fmt::Debug for DemoApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoApp")
            .field("provider_present", &self.provider.is_some())
            .field("endpoint", &self.connection.endpoint())
            .field("settings", &self.settings)
            .field("state", &self.snapshot())
            .finish()
    }
}

fn account_change_logger() -> EventHandler {
    Arc::new(|payload: &ProviderEventPayload| {
        if let ProviderEventPayload::AccountChanged(account) = payload {
            match account {
                Some(pubkey) => tracing::info!(%pubkey, "Wallet account changed"),
                None => tracing::info!("Wallet account changed to none"),
            }
        }
    })
}
