//! A keypair-backed [`WalletProvider`].
//!
//! Outside a browser there is no extension to inject, so the CLI injects this
//! wallet instead. It holds its own key and asks an [`Approver`] wherever the
//! extension would show its approval popup.

use crate::provider::{
    ConnectOpts, ConnectResponse, DisplayEncoding, EventHandler, ProviderEvent,
    ProviderEventPayload, SignedMessage, WalletProvider,
};
use async_trait::async_trait;
use phantom_transfer_error::{DemoError, Result};
use phantom_transfer_solana::{LocalAccount, Pubkey, Signer, Transaction};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What the wallet is about to do on the user's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalRequest {
    /// Share the public key with the site
    Connect,
    /// Sign this many transactions
    SignTransactions(usize),
    /// Sign a message of this many bytes
    SignMessage(usize),
}

impl fmt::Display for ApprovalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalRequest::Connect => write!(f, "Connect this site to your wallet?"),
            ApprovalRequest::SignTransactions(1) => write!(f, "Approve 1 transaction?"),
            ApprovalRequest::SignTransactions(n) => write!(f, "Approve {n} transactions?"),
            ApprovalRequest::SignMessage(len) => write!(f, "Sign a {len}-byte message?"),
        }
    }
}

/// Stands in for the extension's approval popup.
pub trait Approver: Send + Sync {
    /// Returns true if the user approves
    fn approve(&self, request: ApprovalRequest) -> bool;
}

/// Approves everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Approver for AutoApprove {
    fn approve(&self, _request: ApprovalRequest) -> bool {
        true
    }
}

/// Rejects everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReject;

impl Approver for AlwaysReject {
    fn approve(&self, _request: ApprovalRequest) -> bool {
        false
    }
}

#[derive(Default)]
struct Session {
    connected: bool,
    trusted: bool,
    handlers: Vec<(ProviderEvent, EventHandler)>,
}

/// Wallet holding its own keypair.
pub struct KeystoreWallet {
    account: LocalAccount,
    approver: Arc<dyn Approver>,
    session: Mutex<Session>,
}

impl KeystoreWallet {
    /// Creates a wallet around an existing account
    pub fn new(account: LocalAccount, approver: Arc<dyn Approver>) -> Self {
        Self {
            account,
            approver,
            session: Mutex::new(Session::default()),
        }
    }

    /// Creates a wallet with a freshly generated key
    pub fn generate(approver: Arc<dyn Approver>) -> Self {
        Self::new(LocalAccount::generate(), approver)
    }

    /// The wallet's key, whether or not a session is open
    pub fn address(&self) -> Pubkey {
        self.account.pubkey()
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, payload: ProviderEventPayload) {
        let handlers: Vec<EventHandler> = self
            .session()
            .handlers
            .iter()
            .filter(|(event, _)| *event == payload.event())
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(&payload);
        }
    }

    fn ensure_approved(&self, request: ApprovalRequest) -> Result<()> {
        if !self.session().connected {
            return Err(DemoError::WalletNotConnected);
        }
        if self.approver.approve(request) {
            Ok(())
        } else {
            Err(DemoError::UserRejected(request.to_string()))
        }
    }

    fn sign_in_place(&self, transaction: &mut Transaction) -> Result<()> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[self.account.keypair()], blockhash)
            .map_err(|e| DemoError::SigningError(e.to_string()))
    }
}

impl fmt::Debug for KeystoreWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreWallet")
            .field("address", &self.address())
            .field("connected", &self.session().connected)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for KeystoreWallet {
    fn is_phantom(&self) -> bool {
        true
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.session().connected.then(|| self.account.pubkey())
    }

    fn is_connected(&self) -> bool {
        self.session().connected
    }

    async fn connect(&self, opts: ConnectOpts) -> Result<ConnectResponse> {
        let trusted = self.session().trusted;
        if opts.only_if_trusted && !trusted {
            return Err(DemoError::UserRejected("site is not trusted".to_string()));
        }
        if !trusted && !self.approver.approve(ApprovalRequest::Connect) {
            return Err(DemoError::UserRejected(ApprovalRequest::Connect.to_string()));
        }

        {
            let mut session = self.session();
            session.connected = true;
            session.trusted = true;
        }
        let public_key = self.account.pubkey();
        tracing::debug!(%public_key, "Keystore wallet connected");
        self.emit(ProviderEventPayload::Connect(public_key));
        Ok(ConnectResponse { public_key })
    }

    async fn disconnect(&self) -> Result<()> {
        self.session().connected = false;
        tracing::debug!("Keystore wallet disconnected");
        self.emit(ProviderEventPayload::Disconnect);
        Ok(())
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        self.ensure_approved(ApprovalRequest::SignTransactions(1))?;
        self.sign_in_place(&mut transaction)?;
        Ok(transaction)
    }

    async fn sign_all_transactions(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>> {
        self.ensure_approved(ApprovalRequest::SignTransactions(transactions.len()))?;
        transactions
            .into_iter()
            .map(|mut tx| self.sign_in_place(&mut tx).map(|()| tx))
            .collect()
    }

    async fn sign_message(&self, message: &[u8], display: DisplayEncoding) -> Result<SignedMessage> {
        self.ensure_approved(ApprovalRequest::SignMessage(message.len()))?;
        let encoding = &display;
        tracing::trace!(display = ?encoding, len = message.len(), "Signing message");
        Ok(SignedMessage {
            signature: self.account.keypair().sign_message(message),
            public_key: self.account.pubkey(),
        })
    }

    fn on(&self, event: ProviderEvent, handler: EventHandler) {
        self.session().handlers.push((event, handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderRequest, ProviderResponse, RequestParams};
    use phantom_transfer_solana::{build_transfer, Hash, Lamports};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn approving() -> KeystoreWallet {
        KeystoreWallet::generate(Arc::new(AutoApprove))
    }

    #[tokio::test]
    async fn test_connect_exposes_public_key() {
        let wallet = approving();
        assert!(wallet.public_key().is_none());

        let response = wallet.connect(ConnectOpts::default()).await.unwrap();
        assert_eq!(response.public_key, wallet.address());
        assert_eq!(wallet.public_key(), Some(wallet.address()));
        assert!(wallet.is_connected());
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let wallet = KeystoreWallet::generate(Arc::new(AlwaysReject));
        let err = wallet.connect(ConnectOpts::default()).await.unwrap_err();
        assert!(err.is_user_rejection());
        assert!(!wallet.is_connected());
    }

    #[tokio::test]
    async fn test_only_if_trusted_requires_prior_approval() {
        let wallet = approving();
        let eager = ConnectOpts {
            only_if_trusted: true,
        };
        assert!(wallet.connect(eager).await.is_err());

        wallet.connect(ConnectOpts::default()).await.unwrap();
        wallet.disconnect().await.unwrap();
        assert!(wallet.connect(eager).await.is_ok());
    }

    #[tokio::test]
    async fn test_events_fire_for_subscribed_kind_only() {
        let wallet = approving();
        let connects = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connects);
        wallet.on(
            ProviderEvent::Connect,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        wallet.connect(ConnectOpts::default()).await.unwrap();
        wallet.disconnect().await.unwrap();
        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_requires_connection() {
        let wallet = approving();
        let err = wallet.sign_message(b"hello", DisplayEncoding::Utf8).await.unwrap_err();
        assert!(matches!(err, DemoError::WalletNotConnected));
    }

    #[tokio::test]
    async fn test_sign_message_verifies() {
        let wallet = approving();
        wallet.connect(ConnectOpts::default()).await.unwrap();

        let signed = wallet.sign_message(b"hello", DisplayEncoding::Utf8).await.unwrap();
        assert_eq!(signed.public_key, wallet.address());
        assert!(signed.signature.verify(wallet.address().as_ref(), b"hello"));
    }

    #[tokio::test]
    async fn test_request_dispatches_to_sign_transaction() {
        let wallet = approving();
        wallet.connect(ConnectOpts::default()).await.unwrap();

        let payer = LocalAccount::generate();
        let tx = build_transfer(
            payer.keypair(),
            &wallet.address(),
            Lamports(10),
            Hash::new_from_array([1u8; 32]),
        );

        // Not a signer of this transaction, so signing must fail cleanly.
        let err = wallet
            .request(ProviderRequest::SignTransaction(tx))
            .await
            .unwrap_err();
        assert!(matches!(err, DemoError::SigningError(_)));

        let disconnect = ProviderRequest::from_name("disconnect", RequestParams::None).unwrap();
        let response = wallet.request(disconnect).await.unwrap();
        assert!(matches!(response, ProviderResponse::Disconnected));
        assert!(!wallet.is_connected());
    }
}
