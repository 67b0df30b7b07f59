//! Injected wallet capability and provider detection.
//!
//! A browser wallet extension injects an object into the page's global scope.
//! Here the host is an explicit [`HostEnvironment`] handed to the app at
//! startup, and the injected object is anything implementing [`WalletProvider`].

use async_trait::async_trait;
use phantom_transfer_error::{DemoError, Result};
use phantom_transfer_solana::{Pubkey, Signature, Transaction};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Global name under which Phantom injects itself.
pub const PHANTOM_GLOBAL: &str = "solana";

/// Options for [`WalletProvider::connect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOpts {
    /// Only connect if the site was previously approved, without prompting
    pub only_if_trusted: bool,
}

/// Result of a successful connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectResponse {
    /// The wallet's public key
    pub public_key: Pubkey,
}

/// How a message is shown to the user when asked to sign it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayEncoding {
    /// Show as text
    #[default]
    Utf8,
    /// Show as hex bytes
    Hex,
}

impl FromStr for DisplayEncoding {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "utf8" => Ok(DisplayEncoding::Utf8),
            "hex" => Ok(DisplayEncoding::Hex),
            other => Err(DemoError::Other(format!("unknown display encoding '{other}'"))),
        }
    }
}

/// A signed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedMessage {
    /// The signature
    pub signature: Signature,
    /// Key that produced it
    pub public_key: Pubkey,
}

/// Events a provider can notify subscribers about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEvent {
    /// Session established
    Connect,
    /// Session torn down
    Disconnect,
    /// The user switched accounts inside the wallet
    AccountChanged,
}

impl ProviderEvent {
    /// Returns the event's wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEvent::Connect => "connect",
            ProviderEvent::Disconnect => "disconnect",
            ProviderEvent::AccountChanged => "accountChanged",
        }
    }
}

impl fmt::Display for ProviderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data delivered with a [`ProviderEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEventPayload {
    /// Connected with this key
    Connect(Pubkey),
    /// Disconnected
    Disconnect,
    /// New account, or `None` if the wallet no longer exposes one
    AccountChanged(Option<Pubkey>),
}

impl ProviderEventPayload {
    /// Returns the event this payload belongs to
    pub fn event(&self) -> ProviderEvent {
        match self {
            ProviderEventPayload::Connect(_) => ProviderEvent::Connect,
            ProviderEventPayload::Disconnect => ProviderEvent::Disconnect,
            ProviderEventPayload::AccountChanged(_) => ProviderEvent::AccountChanged,
        }
    }
}

/// Callback registered with [`WalletProvider::on`].
pub type EventHandler = Arc<dyn Fn(&ProviderEventPayload) + Send + Sync>;

/// Method names accepted by [`WalletProvider::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    /// `connect`
    Connect,
    /// `disconnect`
    Disconnect,
    /// `signTransaction`
    SignTransaction,
    /// `signAllTransactions`
    SignAllTransactions,
    /// `signMessage`
    SignMessage,
}

impl RequestMethod {
    /// Returns the method's wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Connect => "connect",
            RequestMethod::Disconnect => "disconnect",
            RequestMethod::SignTransaction => "signTransaction",
            RequestMethod::SignAllTransactions => "signAllTransactions",
            RequestMethod::SignMessage => "signMessage",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "connect" => Ok(RequestMethod::Connect),
            "disconnect" => Ok(RequestMethod::Disconnect),
            "signTransaction" => Ok(RequestMethod::SignTransaction),
            "signAllTransactions" => Ok(RequestMethod::SignAllTransactions),
            "signMessage" => Ok(RequestMethod::SignMessage),
            other => Err(DemoError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// A request through the generic [`WalletProvider::request`] entry point.
#[derive(Debug, Clone)]
pub enum ProviderRequest {
    /// See [`WalletProvider::connect`]
    Connect(ConnectOpts),
    /// See [`WalletProvider::disconnect`]
    Disconnect,
    /// See [`WalletProvider::sign_transaction`]
    SignTransaction(Transaction),
    /// See [`WalletProvider::sign_all_transactions`]
    SignAllTransactions(Vec<Transaction>),
    /// See [`WalletProvider::sign_message`]
    SignMessage {
        /// Raw message bytes
        message: Vec<u8>,
        /// How to show it
        display: DisplayEncoding,
    },
}

/// Parameters accompanying a method name in [`ProviderRequest::new`].
#[derive(Debug, Clone, Default)]
pub enum RequestParams {
    /// No parameters
    #[default]
    None,
    /// Options for `connect`
    Connect(ConnectOpts),
    /// The transaction for `signTransaction`
    Transaction(Transaction),
    /// The batch for `signAllTransactions`
    Transactions(Vec<Transaction>),
    /// The payload for `signMessage`
    Message {
        /// Raw message bytes
        message: Vec<u8>,
        /// How to show it
        display: DisplayEncoding,
    },
}

impl ProviderRequest {
    /// Pairs a method with its parameters.
    ///
    /// # Errors
    /// Returns [`DemoError::UnsupportedMethod`] when the parameters do not fit the method.
    pub fn new(method: RequestMethod, params: RequestParams) -> Result<Self> {
        match (method, params) {
            (RequestMethod::Connect, RequestParams::None) => {
                Ok(ProviderRequest::Connect(ConnectOpts::default()))
            }
            (RequestMethod::Connect, RequestParams::Connect(opts)) => Ok(ProviderRequest::Connect(opts)),
            (RequestMethod::Disconnect, RequestParams::None) => Ok(ProviderRequest::Disconnect),
            (RequestMethod::SignTransaction, RequestParams::Transaction(tx)) => {
                Ok(ProviderRequest::SignTransaction(tx))
            }
            (RequestMethod::SignAllTransactions, RequestParams::Transactions(txs)) => {
                Ok(ProviderRequest::SignAllTransactions(txs))
            }
            (RequestMethod::SignMessage, RequestParams::Message { message, display }) => {
                Ok(ProviderRequest::SignMessage { message, display })
            }
            (method, params) => Err(DemoError::UnsupportedMethod(format!(
                "{method} does not take {params:?}"
            ))),
        }
    }

    /// Like [`ProviderRequest::new`], taking the method's wire name
    pub fn from_name(method: &str, params: RequestParams) -> Result<Self> {
        Self::new(method.parse()?, params)
    }

    /// Returns the method this request invokes
    pub fn method(&self) -> RequestMethod {
        match self {
            ProviderRequest::Connect(_) => RequestMethod::Connect,
            ProviderRequest::Disconnect => RequestMethod::Disconnect,
            ProviderRequest::SignTransaction(_) => RequestMethod::SignTransaction,
            ProviderRequest::SignAllTransactions(_) => RequestMethod::SignAllTransactions,
            ProviderRequest::SignMessage { .. } => RequestMethod::SignMessage,
        }
    }
}

/// Reply to a [`ProviderRequest`].
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    /// Reply to `connect`
    Connected(ConnectResponse),
    /// Reply to `disconnect`
    Disconnected,
    /// Reply to `signTransaction`
    Transaction(Transaction),
    /// Reply to `signAllTransactions`
    Transactions(Vec<Transaction>),
    /// Reply to `signMessage`
    Message(SignedMessage),
}

/// The capability object a wallet extension injects into the host.
///
/// Key storage, approval UI and signing all happen on the wallet's side; the
/// demo only ever talks to it through this interface.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Capability marker identifying a Phantom-compatible provider
    fn is_phantom(&self) -> bool;

    /// Key of the connected account, `None` before connect
    fn public_key(&self) -> Option<Pubkey>;

    /// Returns true while a session is established
    fn is_connected(&self) -> bool;

    /// Asks the user to approve a connection
    async fn connect(&self, opts: ConnectOpts) -> Result<ConnectResponse>;

    /// Tears down the session
    async fn disconnect(&self) -> Result<()>;

    /// Signs a single transaction
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction>;

    /// Signs several transactions behind one prompt
    async fn sign_all_transactions(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>>;

    /// Signs an arbitrary message
    async fn sign_message(&self, message: &[u8], display: DisplayEncoding) -> Result<SignedMessage>;

    /// Subscribes to an event
    fn on(&self, event: ProviderEvent, handler: EventHandler);

    /// Generic entry point covering the same method set as the typed operations
    async fn request(&self, request: ProviderRequest) -> Result<ProviderResponse> {
        tracing::debug!(method = %request.method(), "Provider request");
        match request {
            ProviderRequest::Connect(opts) => self.connect(opts).await.map(ProviderResponse::Connected),
            ProviderRequest::Disconnect => self
                .disconnect()
                .await
                .map(|()| ProviderResponse::Disconnected),
            ProviderRequest::SignTransaction(tx) => self
                .sign_transaction(tx)
                .await
                .map(ProviderResponse::Transaction),
            ProviderRequest::SignAllTransactions(txs) => self
                .sign_all_transactions(txs)
                .await
                .map(ProviderResponse::Transactions),
            ProviderRequest::SignMessage { message, display } => self
                .sign_message(&message, display)
                .await
                .map(ProviderResponse::Message),
        }
    }
}

/// The objects a host exposes globally, keyed by name.
#[derive(Clone, Default)]
pub struct HostEnvironment {
    injected: HashMap<String, Arc<dyn WalletProvider>>,
}

impl HostEnvironment {
    /// A host with nothing injected
    pub fn empty() -> Self {
        Self::default()
    }

    /// Injects a provider under `name`
    pub fn with_injected(mut self, name: impl Into<String>, provider: Arc<dyn WalletProvider>) -> Self {
        self.injected.insert(name.into(), provider);
        self
    }

    /// Injects a provider under [`PHANTOM_GLOBAL`]
    pub fn with_phantom(self, provider: Arc<dyn WalletProvider>) -> Self {
        self.with_injected(PHANTOM_GLOBAL, provider)
    }

    /// Looks up an injected object
    pub fn get(&self, name: &str) -> Option<Arc<dyn WalletProvider>> {
        self.injected.get(name).cloned()
    }
}

impl fmt::Debug for HostEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostEnvironment")
            .field("injected", &self.injected.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Single synchronous check for a Phantom provider; no retries.
pub fn detect_provider(host: &HostEnvironment) -> Option<Arc<dyn WalletProvider>> {
    let provider = host.get(PHANTOM_GLOBAL)?;
    if provider.is_phantom() {
        tracing::debug!("Phantom provider detected");
        Some(provider)
    } else {
        tracing::debug!(global = PHANTOM_GLOBAL, "Injected object lacks the Phantom capability marker");
        None
    }
}
