use phantom_transfer_solana::{LocalAccount, Lamports, Pubkey, Signature};
use serde::Serialize;
use std::sync::Arc;

/// Last message shown under the buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Status {
    /// Progress or result
    Info(String),
    /// A caught failure
    Error(String),
}

impl Status {
    /// Returns the message text
    pub fn message(&self) -> &str {
        match self {
            Status::Info(message) | Status::Error(message) => message,
        }
    }

    /// Returns true for [`Status::Error`]
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// Everything the view holds. Nothing is persisted.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Whether a provider was detected at startup
    pub provider_present: bool,
    /// Key returned by the last successful connect
    pub receiver: Option<Pubkey>,
    /// Locally generated sender
    pub sender: Option<Arc<LocalAccount>>,
    /// Whether the current sender's airdrop was confirmed
    pub funded: bool,
    /// Last status line
    pub status: Option<Status>,
    /// Bumped on every account creation
    pub generation: u64,
}

impl ViewState {
    /// Copies out the parts the view renders
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            provider_present: self.provider_present,
            receiver: self.receiver,
            sender: self.sender.as_ref().map(|account| account.pubkey()),
            funded: self.funded,
            status: self.status.clone(),
            generation: self.generation,
        }
    }
}

/// A cheap copy of [`ViewState`] without key material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// Whether a provider was detected at startup
    pub provider_present: bool,
    /// Connected wallet key
    pub receiver: Option<Pubkey>,
    /// Sender public key
    pub sender: Option<Pubkey>,
    /// Whether the sender's airdrop was confirmed
    pub funded: bool,
    /// Last status line
    pub status: Option<Status>,
    /// Current account generation
    pub generation: u64,
}

impl ViewSnapshot {
    /// Provider present, receiver set and sender set
    pub fn can_transfer(&self) -> bool {
        self.provider_present && self.receiver.is_some() && self.sender.is_some()
    }
}

/// Outcome of a successful account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingReceipt {
    /// The new sender
    pub pubkey: Pubkey,
    /// Airdrop signature
    pub airdrop_signature: Signature,
    /// Balance after confirmation
    pub balance: Lamports,
    /// Generation the account was created in
    pub generation: u64,
}

/// Outcome of a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Signature proving inclusion
    pub signature: Signature,
    /// Sender
    pub from: Pubkey,
    /// Receiver
    pub to: Pubkey,
    /// Amount moved
    pub amount: Lamports,
    /// Sender balance after the transfer
    pub sender_balance: Lamports,
    /// Receiver balance after the transfer
    pub receiver_balance: Lamports,
}
