use crate::amount::Lamports;
use crate::connection::NetworkConnection;
use phantom_transfer_error::{DemoError, Result};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::fmt;
use std::path::Path;

/// A locally generated signing identity, wrapping a Keypair from the Solana SDK.
///
/// The account lives for the session only. Nothing here persists key material;
/// reading from a keypair file exists so the stand-in wallet can reuse a key
/// created with `solana-keygen new`.
pub struct LocalAccount {
    keypair: Keypair,
}

impl LocalAccount {
    /// Generates a fresh keypair from the operating system's secure RNG.
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    /// Creates a new `LocalAccount` from a 64-byte array.
    ///
    /// # Errors
    /// Returns an `Error` if the byte array cannot be converted to a valid `Keypair`.
    pub fn from_bytes(bytes: [u8; 64]) -> Result<Self> {
        let keypair = Keypair::try_from(&bytes[..])
            .map_err(|e| DemoError::InvalidKeypair(format!("Failed to create keypair from bytes: {e}")))?;
        Ok(Self { keypair })
    }

    /// Reads a keypair file in the Solana CLI format (a JSON array of 64 bytes).
    ///
    /// # Errors
    /// Returns an `Error` if the file cannot be read or does not hold 64 bytes.
    pub fn from_keypair_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let bytes: Vec<u8> = serde_json::from_str(&contents)?;
        let bytes: [u8; 64] = bytes.try_into().map_err(|raw: Vec<u8>| {
            DemoError::InvalidKeypair(format!(
                "{} holds {} bytes, expected 64",
                path.display(),
                raw.len()
            ))
        })?;
        Self::from_bytes(bytes)
    }

    /// Returns the public key associated with the account.
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Returns the keypair for signing.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Retrieves the account's balance through the shared connection.
    ///
    /// # Errors
    /// Returns an `Error` if the balance query fails.
    pub async fn balance(&self, connection: &dyn NetworkConnection) -> Result<Lamports> {
        connection.get_balance(&self.pubkey()).await
    }
}

impl fmt::Debug for LocalAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAccount")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
