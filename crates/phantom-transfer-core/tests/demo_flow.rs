//! End-to-end runs of the demo page against the in-memory ledger.

use phantom_transfer_core::{
    Action, DemoApp, DisconnectPolicy, HostEnvironment, Outcome, Settings, WalletProvider,
};
use phantom_transfer_error::DemoError;
use phantom_transfer_solana::{decode_transfer, Lamports, LAMPORTS_PER_SOL};
use phantom_transfer_testing::{action_sequence, Harness, MockNetwork, MockWallet, MOCK_FEE_LAMPORTS};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_create_connect_transfer() {
    let harness = Harness::new();
    let app = &harness.app;
    let wallet = harness.wallet.clone().unwrap();

    let funding = app.create_account().await.unwrap();
    assert_eq!(funding.balance, Lamports(2 * LAMPORTS_PER_SOL));
    assert_eq!(funding.generation, 1);

    let receiver = app.connect_wallet().await.unwrap();
    assert_eq!(receiver, wallet.address());
    assert!(app.render().shows(Action::Transfer));

    let receipt = app.transfer().await.unwrap();
    assert_eq!(receipt.from, funding.pubkey);
    assert_eq!(receipt.to, wallet.address());
    assert_eq!(receipt.amount, Lamports(LAMPORTS_PER_SOL));
    assert_eq!(
        receipt.sender_balance,
        Lamports(LAMPORTS_PER_SOL - MOCK_FEE_LAMPORTS)
    );
    assert_eq!(receipt.receiver_balance, Lamports(LAMPORTS_PER_SOL));

    let submitted = harness.network.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].message.instructions.len(), 1);
    let summary = decode_transfer(&submitted[0]).unwrap();
    assert_eq!(summary.from, funding.pubkey);
    assert_eq!(summary.to, wallet.address());
    assert_eq!(summary.lamports, Lamports(LAMPORTS_PER_SOL));
}

#[tokio::test]
async fn test_disconnect_retains_receiver_by_default() {
    let harness = Harness::new();
    let app = &harness.app;

    app.connect_wallet().await.unwrap();
    app.disconnect_wallet().await.unwrap();

    let view = app.snapshot();
    assert!(view.receiver.is_some());
    assert!(!harness.wallet.as_ref().unwrap().is_connected());
    let screen = app.render();
    assert!(screen.shows(Action::DisconnectWallet));
    assert!(!screen.shows(Action::ConnectWallet));
}

#[tokio::test]
async fn test_disconnect_clears_receiver_when_configured() {
    let settings = Settings {
        disconnect_policy: DisconnectPolicy::ClearReceiver,
        ..Settings::default()
    };
    let harness = Harness::with_wallet(MockWallet::new(), settings);
    let app = &harness.app;

    app.create_account().await.unwrap();
    app.connect_wallet().await.unwrap();
    app.disconnect_wallet().await.unwrap();

    assert!(app.snapshot().receiver.is_none());
    let screen = app.render();
    assert!(screen.shows(Action::ConnectWallet));
    assert!(!screen.shows(Action::Transfer));
}

#[tokio::test]
async fn test_create_replaces_sender() {
    let harness = Harness::new();
    let app = &harness.app;

    let first = app.create_account().await.unwrap();
    let second = app.create_account().await.unwrap();

    assert_ne!(first.pubkey, second.pubkey);
    assert_eq!(app.snapshot().sender, Some(second.pubkey));
    assert_eq!(app.snapshot().generation, 2);
    assert_eq!(harness.network.calls().airdrops.load(std::sync::atomic::Ordering::SeqCst), 2);
}

// ============================================================================
// Preconditions
// ============================================================================

#[tokio::test]
async fn test_transfer_without_sender_makes_no_calls() {
    let harness = Harness::new();
    harness.app.connect_wallet().await.unwrap();

    let err = harness.app.transfer().await.unwrap_err();
    assert!(matches!(
        err,
        DemoError::MissingTransferParty { missing: "senderKeypair" }
    ));
    assert_eq!(harness.network.calls().total(), 0);
}

#[tokio::test]
async fn test_transfer_without_receiver_makes_no_calls() {
    let harness = Harness::new();
    harness.app.create_account().await.unwrap();
    let before = harness.network.calls().total();

    let err = harness.app.transfer().await.unwrap_err();
    assert!(matches!(
        err,
        DemoError::MissingTransferParty { missing: "receiverPublicKey" }
    ));
    assert_eq!(harness.network.calls().total(), before);
    assert!(harness.app.snapshot().status.unwrap().is_error());
}

#[tokio::test]
async fn test_dispatch_refuses_hidden_button() {
    let harness = Harness::new();

    let err = harness.app.dispatch(Action::Transfer).await.unwrap_err();
    assert!(matches!(err, DemoError::ActionUnavailable(_)));
    let err = harness.app.dispatch(Action::DisconnectWallet).await.unwrap_err();
    assert!(matches!(err, DemoError::ActionUnavailable(_)));
    assert_eq!(harness.network.calls().total(), 0);
}

#[tokio::test]
async fn test_dispatch_runs_visible_buttons() {
    let harness = Harness::new();

    let outcome = harness.app.dispatch(Action::CreateAccount).await.unwrap();
    assert!(matches!(outcome, Outcome::AccountFunded(_)));
    let outcome = harness.app.dispatch(Action::ConnectWallet).await.unwrap();
    assert!(matches!(outcome, Outcome::WalletConnected(_)));
    let outcome = harness.app.dispatch(Action::Transfer).await.unwrap();
    assert!(matches!(outcome, Outcome::Transferred(_)));
    let outcome = harness.app.dispatch(Action::DisconnectWallet).await.unwrap();
    assert_eq!(outcome, Outcome::WalletDisconnected);
}

// ============================================================================
// Wallet failures
// ============================================================================

#[tokio::test]
async fn test_rejected_connect_leaves_receiver_unset() {
    let harness = Harness::with_wallet(MockWallet::rejecting(), Settings::default());

    let err = harness.app.connect_wallet().await.unwrap_err();
    assert!(err.is_user_rejection());

    let view = harness.app.snapshot();
    assert!(view.receiver.is_none());
    assert!(view.status.unwrap().is_error());
    assert!(harness.app.render().shows(Action::ConnectWallet));
}

#[tokio::test]
async fn test_no_provider_shows_install_notice() {
    let harness = Harness::without_wallet();

    let screen = harness.app.render();
    assert!(screen.install_notice.is_some());
    assert_eq!(screen.buttons, vec![Action::CreateAccount]);

    let err = harness.app.connect_wallet().await.unwrap_err();
    assert!(matches!(err, DemoError::ProviderNotFound));
}

#[tokio::test]
async fn test_non_phantom_injection_is_ignored() {
    let network = Arc::new(MockNetwork::new());
    let host = HostEnvironment::empty().with_phantom(Arc::new(MockWallet::not_phantom()));
    let app = DemoApp::new(&host, network, Settings::default());

    assert!(app.provider().is_none());
    assert!(app.render().install_notice.is_some());
}

#[tokio::test]
async fn test_account_changed_does_not_touch_state() {
    let harness = Harness::new();
    let wallet = harness.wallet.clone().unwrap();
    harness.app.connect_wallet().await.unwrap();
    let before = harness.app.snapshot();

    wallet.emit_account_changed(Some(MockWallet::new().address()));
    wallet.emit_account_changed(None);

    assert_eq!(harness.app.snapshot(), before);
}

// ============================================================================
// Network failures
// ============================================================================

#[tokio::test]
async fn test_airdrop_failure_leaves_unfunded_sender() {
    let harness = Harness::new();
    harness.network.fail_airdrops("airdrop limit reached");

    let err = harness.app.create_account().await.unwrap_err();
    assert!(err.is_retryable());

    let view = harness.app.snapshot();
    assert!(view.sender.is_some());
    assert!(!view.funded);
    assert!(view.status.unwrap().is_error());
}

#[tokio::test]
async fn test_unconfirmed_airdrop_is_an_error() {
    let harness = Harness::new();
    harness
        .network
        .force_confirmation(phantom_transfer_solana::ConfirmationStatus::Expired);

    let err = harness.app.create_account().await.unwrap_err();
    assert!(matches!(err, DemoError::AirdropNotConfirmed { .. }));
    assert!(!harness.app.snapshot().funded);
}

#[tokio::test]
async fn test_failed_send_reports_error() {
    let harness = Harness::new();
    harness.app.create_account().await.unwrap();
    harness.app.connect_wallet().await.unwrap();
    harness.network.fail_sends("node is behind");

    let err = harness.app.transfer().await.unwrap_err();
    assert!(matches!(err, DemoError::TransactionFailed(_)));
    assert!(harness.app.snapshot().status.unwrap().is_error());
}

#[tokio::test]
async fn test_expired_transfer_is_retryable() {
    let harness = Harness::new();
    let funding = harness.app.create_account().await.unwrap();
    let receiver = harness.app.connect_wallet().await.unwrap();
    harness
        .network
        .force_confirmation(phantom_transfer_solana::ConfirmationStatus::Expired);

    let err = harness.app.transfer().await.unwrap_err();
    assert!(matches!(err, DemoError::BlockhashExpired { .. }));
    assert!(err.is_retryable());
    assert_eq!(harness.network.balance_of(&funding.pubkey), funding.balance);
    assert_eq!(harness.network.balance_of(&receiver), Lamports::ZERO);
    assert!(harness.app.snapshot().status.unwrap().is_error());
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_overlapping_creations_keep_the_latest() {
    let harness = Harness::new();
    let gate = harness.network.gate_confirmations();
    let network = harness.network.clone();

    let release = async move {
        while network.waiting_confirmations() < 2 {
            tokio::task::yield_now().await;
        }
        gate.add_permits(2);
    };

    let (first, second, ()) = tokio::join!(
        harness.app.create_account(),
        harness.app.create_account(),
        release
    );

    assert!(matches!(
        first,
        Err(DemoError::Superseded { generation: 1, current: 2 })
    ));
    let second = second.unwrap();
    let view = harness.app.snapshot();
    assert!(view.funded);
    assert_eq!(view.sender, Some(second.pubkey));
    assert!(!view.status.unwrap().is_error());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_transfer_visible_iff_all_parties_known(actions in action_sequence(10)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let harness = Harness::new();
            let mut submissions = 0;

            for action in actions {
                let visible = harness.app.render().shows(action);
                if visible && action == Action::Transfer {
                    submissions += 1;
                }
                match harness.app.dispatch(action).await {
                    Err(DemoError::ActionUnavailable(_)) => prop_assert!(!visible),
                    _ => prop_assert!(visible),
                }

                let view = harness.app.snapshot();
                let all_known = view.provider_present && view.receiver.is_some() && view.sender.is_some();
                prop_assert_eq!(harness.app.render().shows(Action::Transfer), all_known);
            }

            prop_assert_eq!(harness.network.calls().sends(), submissions);
            Ok(())
        })?;
    }
}
