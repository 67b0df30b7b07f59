//! Construction of the single value-transfer transaction.

use crate::amount::Lamports;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use solana_system_interface::instruction as system_instruction;

/// Discriminant of `SystemInstruction::Transfer` in its bincode encoding.
const TRANSFER_DISCRIMINANT: u32 = 2;

/// Builds a transaction holding exactly one system transfer from `sender` to
/// `to`, paid and signed by `sender`.
pub fn build_transfer(
    sender: &Keypair,
    to: &Pubkey,
    amount: Lamports,
    recent_blockhash: Hash,
) -> Transaction {
    let from = sender.pubkey();
    let ix = system_instruction::transfer(&from, to, amount.get());
    Transaction::new_signed_with_payer(&[ix], Some(&from), &[sender], recent_blockhash)
}

/// The parties and amount of a single-transfer transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    /// Debited account
    pub from: Pubkey,
    /// Credited account
    pub to: Pubkey,
    /// Amount moved
    pub lamports: Lamports,
}

/// Reads back a transaction produced by [`build_transfer`].
///
/// Returns `None` unless the transaction holds exactly one system-program
/// transfer instruction.
pub fn decode_transfer(transaction: &Transaction) -> Option<TransferSummary> {
    let message = &transaction.message;
    let [ix] = message.instructions.as_slice() else {
        return None;
    };

    let program = message.account_keys.get(usize::from(ix.program_id_index))?;
    if *program != solana_system_interface::program::ID {
        return None;
    }

    let discriminant = u32::from_le_bytes(ix.data.get(0..4)?.try_into().ok()?);
    if discriminant != TRANSFER_DISCRIMINANT {
        return None;
    }
    let lamports = u64::from_le_bytes(ix.data.get(4..12)?.try_into().ok()?);

    let from = message.account_keys.get(usize::from(*ix.accounts.first()?))?;
    let to = message.account_keys.get(usize::from(*ix.accounts.get(1)?))?;

    Some(TransferSummary {
        from: *from,
        to: *to,
        lamports: Lamports(lamports),
    })
}
