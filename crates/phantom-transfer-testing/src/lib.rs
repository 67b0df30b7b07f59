//! # Phantom Transfer Testing
//!
//! Test doubles for the demo: an in-memory [`MockNetwork`] ledger, a
//! scriptable [`MockWallet`], harness helpers and proptest strategies over
//! button clicks.

#![forbid(unsafe_code)]

pub mod network;
pub mod wallet;

pub use network::{CallCounts, MockNetwork, MOCK_FEE_LAMPORTS};
pub use wallet::MockWallet;

use phantom_transfer_core::{Action, DemoApp, HostEnvironment, Settings};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Harness
// ============================================================================

/// An app wired to mocks, with handles kept for assertions.
pub struct Harness {
    /// The app under test
    pub app: DemoApp,
    /// Ledger behind the app
    pub network: Arc<MockNetwork>,
    /// Injected wallet, if any
    pub wallet: Option<Arc<MockWallet>>,
}

impl Harness {
    /// App with an approving Phantom wallet and default settings
    pub fn new() -> Self {
        Self::with_wallet(MockWallet::new(), Settings::default())
    }

    /// App with the given wallet injected under the Phantom key
    pub fn with_wallet(wallet: MockWallet, settings: Settings) -> Self {
        let wallet = Arc::new(wallet);
        let network = Arc::new(MockNetwork::new());
        let host = HostEnvironment::empty().with_phantom(wallet.clone());
        let app = DemoApp::new(&host, network.clone(), settings);
        Self {
            app,
            network,
            wallet: Some(wallet),
        }
    }

    /// App on a host with nothing injected
    pub fn without_wallet() -> Self {
        let network = Arc::new(MockNetwork::new());
        let app = DemoApp::new(&HostEnvironment::empty(), network.clone(), Settings::default());
        Self {
            app,
            network,
            wallet: None,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// Any single button click
pub fn action_strategy() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

/// A run of up to `max_len` clicks
pub fn action_sequence(max_len: usize) -> impl Strategy<Value = Vec<Action>> {
    prop::collection::vec(action_strategy(), 0..=max_len)
}
