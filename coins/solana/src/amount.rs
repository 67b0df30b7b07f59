//! Lamport amounts.
//!
//! A lamport is the smallest indivisible unit of SOL. Amounts are carried as
//! lamports everywhere and only divided by [`LAMPORTS_PER_SOL`] for display.

use phantom_transfer_error::{DemoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// SOL requested from the faucet for a freshly created account.
pub const AIRDROP_SOL: u64 = 2;

/// SOL moved by a single transfer.
pub const TRANSFER_SOL: u64 = 1;

/// An amount of native currency in lamports.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Lamports(pub u64);

impl Lamports {
    /// Zero lamports
    pub const ZERO: Lamports = Lamports(0);

    /// Scales a whole number of SOL to lamports.
    ///
    /// # Errors
    /// Returns [`DemoError::AmountOverflow`] if the scaled value does not fit in a `u64`.
    pub fn from_sol(sol: u64) -> Result<Self> {
        sol.checked_mul(LAMPORTS_PER_SOL)
            .map(Lamports)
            .ok_or_else(|| DemoError::AmountOverflow(format!("{sol} SOL")))
    }

    /// Returns the raw lamport count
    pub fn get(self) -> u64 {
        self.0
    }

    /// Returns the value in SOL
    pub fn as_sol(self) -> f64 {
        self.0 as f64 / LAMPORTS_PER_SOL as f64
    }

    /// Checked addition
    pub fn checked_add(self, other: Lamports) -> Option<Lamports> {
        self.0.checked_add(other.0).map(Lamports)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Lamports) -> Option<Lamports> {
        self.0.checked_sub(other.0).map(Lamports)
    }

    /// Checks if the amount is zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Lamports {
    fn from(value: u64) -> Self {
        Lamports(value)
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sol())
    }
}
