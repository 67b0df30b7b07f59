//! In-memory stand-in for a local validator.

use async_trait::async_trait;
use phantom_transfer_error::{DemoError, Result};
use phantom_transfer_solana::{
    decode_transfer, BlockhashConfirmation, BlockhashWithExpiry, CommitmentConfig,
    ConfirmationStatus, Hash, Lamports, NetworkConnection, Pubkey, Signature, Transaction,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// Fee charged per transaction signature.
pub const MOCK_FEE_LAMPORTS: u64 = 5_000;

/// Blocks a blockhash stays valid for.
const BLOCKHASH_VALIDITY: u64 = 150;

/// How many times each network operation was called.
#[derive(Debug, Default)]
pub struct CallCounts {
    /// `request_airdrop`
    pub airdrops: AtomicUsize,
    /// `get_latest_blockhash`
    pub blockhashes: AtomicUsize,
    /// `confirm_transaction`
    pub confirmations: AtomicUsize,
    /// `get_balance`
    pub balances: AtomicUsize,
    /// `send_and_confirm_transaction`
    pub sends: AtomicUsize,
}

impl CallCounts {
    /// Sum over all operations
    pub fn total(&self) -> usize {
        [
            &self.airdrops,
            &self.blockhashes,
            &self.confirmations,
            &self.balances,
            &self.sends,
        ]
        .iter()
        .map(|count| count.load(Ordering::SeqCst))
        .sum()
    }

    /// Number of submitted transactions
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<Pubkey, u64>,
    landed: HashSet<Signature>,
    submitted: Vec<Transaction>,
    block_height: u64,
    next_id: u64,
}

impl Ledger {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
struct Failures {
    airdrop: Option<String>,
    send: Option<String>,
    confirmation: Option<ConfirmationStatus>,
}

/// A [`NetworkConnection`] over an in-memory ledger.
///
/// Airdrops credit immediately, transfers debit amount plus
/// [`MOCK_FEE_LAMPORTS`], and every call is counted.
pub struct MockNetwork {
    endpoint: String,
    ledger: Mutex<Ledger>,
    failures: Mutex<Failures>,
    confirm_gate: Mutex<Option<Arc<Semaphore>>>,
    waiting: AtomicUsize,
    calls: CallCounts,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNetwork {
    /// An empty ledger
    pub fn new() -> Self {
        Self {
            endpoint: "mock://local-validator".to_string(),
            ledger: Mutex::new(Ledger::default()),
            failures: Mutex::new(Failures::default()),
            confirm_gate: Mutex::new(None),
            waiting: AtomicUsize::new(0),
            calls: CallCounts::default(),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn failures(&self) -> MutexGuard<'_, Failures> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Call counters
    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    /// Sets a balance directly
    pub fn set_balance(&self, pubkey: Pubkey, lamports: Lamports) {
        self.ledger().balances.insert(pubkey, lamports.get());
    }

    /// Balance without counting a call
    pub fn balance_of(&self, pubkey: &Pubkey) -> Lamports {
        Lamports(self.ledger().balances.get(pubkey).copied().unwrap_or(0))
    }

    /// Every transaction passed to `send_and_confirm_transaction`
    pub fn submitted(&self) -> Vec<Transaction> {
        self.ledger().submitted.clone()
    }

    /// Makes every airdrop request fail
    pub fn fail_airdrops(&self, reason: impl Into<String>) {
        self.failures().airdrop = Some(reason.into());
    }

    /// Makes every submission fail
    pub fn fail_sends(&self, reason: impl Into<String>) {
        self.failures().send = Some(reason.into());
    }

    /// Forces the outcome of every confirmation, including the wait inside a send
    pub fn force_confirmation(&self, status: ConfirmationStatus) {
        self.failures().confirmation = Some(status);
    }

    /// Holds every confirmation until permits are added to the returned semaphore
    pub fn gate_confirmations(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self
            .confirm_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&gate));
        gate
    }

    /// Number of confirmations currently held by the gate
    pub fn waiting_confirmations(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    fn unique_signature(ledger: &mut Ledger) -> Signature {
        let mut bytes = [0u8; 64];
        bytes[..8].copy_from_slice(&ledger.next_id().to_le_bytes());
        Signature::from(bytes)
    }

    fn apply_transfer(ledger: &mut Ledger, transaction: &Transaction) -> Result<Signature> {
        transaction
            .verify()
            .map_err(|e| DemoError::TransactionFailed(format!("signature verification failed: {e}")))?;
        let summary = decode_transfer(transaction)
            .ok_or_else(|| DemoError::TransactionFailed("unsupported transaction".to_string()))?;

        let fee = MOCK_FEE_LAMPORTS * transaction.signatures.len() as u64;
        let debit = summary.lamports.get() + fee;
        let available = ledger.balances.get(&summary.from).copied().unwrap_or(0);
        if available < debit {
            return Err(DemoError::TransactionFailed(format!(
                "insufficient funds: have {available}, need {debit}"
            )));
        }

        ledger.balances.insert(summary.from, available - debit);
        *ledger.balances.entry(summary.to).or_insert(0) += summary.lamports.get();

        let signature = transaction.signatures[0];
        ledger.landed.insert(signature);
        ledger.block_height += 1;
        Ok(signature)
    }
}

#[async_trait]
impl NetworkConnection for MockNetwork {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn commitment(&self) -> CommitmentConfig {
        CommitmentConfig::confirmed()
    }

    async fn request_airdrop(&self, to: &Pubkey, lamports: Lamports) -> Result<Signature> {
        self.calls.airdrops.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failures().airdrop.clone() {
            return Err(DemoError::rpc("requestAirdrop", reason));
        }

        let mut ledger = self.ledger();
        *ledger.balances.entry(*to).or_insert(0) += lamports.get();
        let signature = Self::unique_signature(&mut ledger);
        ledger.landed.insert(signature);
        ledger.block_height += 1;
        Ok(signature)
    }

    async fn get_latest_blockhash(&self) -> Result<BlockhashWithExpiry> {
        self.calls.blockhashes.fetch_add(1, Ordering::SeqCst);
        let mut ledger = self.ledger();
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&ledger.next_id().to_le_bytes());
        Ok(BlockhashWithExpiry {
            blockhash: Hash::new_from_array(bytes),
            last_valid_block_height: ledger.block_height + BLOCKHASH_VALIDITY,
        })
    }

    async fn confirm_transaction(
        &self,
        strategy: BlockhashConfirmation,
        _commitment: CommitmentConfig,
    ) -> Result<ConfirmationStatus> {
        self.calls.confirmations.fetch_add(1, Ordering::SeqCst);

        let gate = self
            .confirm_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(gate) = gate {
            self.waiting.fetch_add(1, Ordering::SeqCst);
            let permit = gate
                .acquire()
                .await
                .map_err(|e| DemoError::Other(e.to_string()))?;
            permit.forget();
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }

        if let Some(status) = self.failures().confirmation.clone() {
            return Ok(status);
        }
        if self.ledger().landed.contains(&strategy.signature) {
            Ok(ConfirmationStatus::Confirmed)
        } else {
            Ok(ConfirmationStatus::Expired)
        }
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<Lamports> {
        self.calls.balances.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance_of(pubkey))
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.calls.sends.fetch_add(1, Ordering::SeqCst);
        let mut ledger = self.ledger();
        ledger.submitted.push(transaction.clone());
        if let Some(reason) = self.failures().send.clone() {
            return Err(DemoError::TransactionFailed(reason));
        }
        let signature = transaction.signatures.first().copied().unwrap_or_default();
        match self.failures().confirmation.clone() {
            Some(ConfirmationStatus::Expired) => Err(DemoError::BlockhashExpired {
                signature: signature.to_string(),
            }),
            Some(ConfirmationStatus::Failed(reason)) => Err(DemoError::TransactionFailed(reason)),
            _ => Self::apply_transfer(&mut ledger, transaction),
        }
    }
}
