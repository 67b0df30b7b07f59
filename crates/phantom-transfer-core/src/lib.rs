//! # Phantom Transfer Core
//!
//! A page that creates a funded keypair on a local test validator, connects an
//! injected wallet and sends SOL from the keypair to that wallet.
//!
//! - [`provider`] - the injected wallet capability and its detection
//! - [`keystore`] - a keypair-backed wallet to inject where no extension exists
//! - [`app`] - view state, rendering and the four button handlers
//!
//! ## Example
//!
//! ```ignore
//! use phantom_transfer_core::prelude::*;
//!
//! let host = HostEnvironment::empty().with_phantom(Arc::new(wallet));
//! let connection = Arc::new(SolanaConnection::new(DEFAULT_ENDPOINT)?);
//! let app = DemoApp::new(&host, connection, Settings::default());
//!
//! app.create_account().await?;
//! app.connect_wallet().await?;
//! let receipt = app.transfer().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod keystore;
pub mod provider;

pub use app::{
    Action, DemoApp, DisconnectPolicy, FundingReceipt, Outcome, Screen, Settings, Status,
    TransferReceipt, ViewSnapshot,
};
pub use keystore::{AlwaysReject, ApprovalRequest, Approver, AutoApprove, KeystoreWallet};
pub use provider::{detect_provider, HostEnvironment, WalletProvider, PHANTOM_GLOBAL};

/// Commonly used items
pub mod prelude {
    pub use crate::app::{Action, DemoApp, DisconnectPolicy, Outcome, Settings};
    pub use crate::keystore::{AutoApprove, KeystoreWallet};
    pub use crate::provider::{HostEnvironment, WalletProvider};
    pub use phantom_transfer_error::{DemoError, Result};
    pub use phantom_transfer_solana::{SolanaConnection, DEFAULT_ENDPOINT};
    pub use std::sync::Arc;
}
