//! Scriptable wallet provider.

use async_trait::async_trait;
use phantom_transfer_core::provider::{
    ConnectOpts, ConnectResponse, DisplayEncoding, EventHandler, ProviderEvent,
    ProviderEventPayload, SignedMessage, WalletProvider,
};
use phantom_transfer_error::{DemoError, Result};
use phantom_transfer_solana::{LocalAccount, Pubkey, Signer, Transaction};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A [`WalletProvider`] holding a fixed keypair that approves or rejects on command.
pub struct MockWallet {
    account: LocalAccount,
    phantom: bool,
    reject: AtomicBool,
    connected: AtomicBool,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    handlers: Mutex<Vec<(ProviderEvent, EventHandler)>>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWallet {
    /// A Phantom-flavoured wallet that approves every request
    pub fn new() -> Self {
        Self {
            account: LocalAccount::generate(),
            phantom: true,
            reject: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// A wallet whose user declines every prompt
    pub fn rejecting() -> Self {
        let wallet = Self::new();
        wallet.set_reject(true);
        wallet
    }

    /// A wallet injected under the Phantom key that is not Phantom
    pub fn not_phantom() -> Self {
        Self {
            phantom: false,
            ..Self::new()
        }
    }

    /// Switches between approving and rejecting
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// The wallet address
    pub fn address(&self) -> Pubkey {
        self.account.pubkey()
    }

    /// Number of `connect` calls
    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of `disconnect` calls
    pub fn disconnect_calls(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Fires `accountChanged` as if the user switched accounts
    pub fn emit_account_changed(&self, account: Option<Pubkey>) {
        self.emit(ProviderEventPayload::AccountChanged(account));
    }

    fn emit(&self, payload: ProviderEventPayload) {
        let handlers: Vec<EventHandler> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(event, _)| *event == payload.event())
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(&payload);
        }
    }

    fn check(&self) -> Result<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(DemoError::WalletNotConnected);
        }
        if self.reject.load(Ordering::SeqCst) {
            return Err(DemoError::UserRejected("User rejected the request.".to_string()));
        }
        Ok(())
    }

    fn sign_in_place(&self, transaction: &mut Transaction) -> Result<()> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[self.account.keypair()], blockhash)
            .map_err(|e| DemoError::SigningError(e.to_string()))
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn is_phantom(&self) -> bool {
        self.phantom
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.connected
            .load(Ordering::SeqCst)
            .then(|| self.account.pubkey())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self, _opts: ConnectOpts) -> Result<ConnectResponse> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.reject.load(Ordering::SeqCst) {
            return Err(DemoError::UserRejected("User rejected the request.".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        let public_key = self.account.pubkey();
        self.emit(ProviderEventPayload::Connect(public_key));
        Ok(ConnectResponse { public_key })
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.connected.swap(false, Ordering::SeqCst) {
            self.emit(ProviderEventPayload::Disconnect);
        }
        Ok(())
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        self.check()?;
        self.sign_in_place(&mut transaction)?;
        Ok(transaction)
    }

    async fn sign_all_transactions(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
        self.check()?;
        transactions
            .into_iter()
            .map(|mut tx| self.sign_in_place(&mut tx).map(|()| tx))
            .collect()
    }

    async fn sign_message(&self, message: &[u8], _display: DisplayEncoding) -> Result<SignedMessage> {
        self.check()?;
        Ok(SignedMessage {
            signature: self.account.keypair().sign_message(message),
            public_key: self.account.pubkey(),
        })
    }

    fn on(&self, event: ProviderEvent, handler: EventHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((event, handler));
    }
}
