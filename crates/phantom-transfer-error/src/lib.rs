//! # Phantom Transfer Error
//!
//! Unified error types for the Phantom transfer demo. Every crate in the
//! workspace returns [`DemoError`] so that the view layer can log, classify and
//! surface failures in one place.
//!
//! ## Error Categories
//!
//! - Wallet capability errors (no injected provider, user rejection)
//! - Network/RPC errors (airdrop, blockhash, balance queries)
//! - Transaction errors (signing, submission, confirmation)
//! - Configuration and IO errors
//!
//! ## Example
//!
//! ```
//! use phantom_transfer_error::{DemoError, Result};
//!
//! fn require_receiver(receiver: Option<&str>) -> Result<&str> {
//!     receiver.ok_or(DemoError::MissingTransferParty {
//!         missing: "receiverPublicKey",
//!     })
//! }
//!
//! assert!(require_receiver(None).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use thiserror::Error;

/// The main error type for demo operations.
#[derive(Error, Debug)]
pub enum DemoError {
    // ============ Wallet Capability Errors ============
    /// No injected wallet exposing the expected capability marker
    #[error("No wallet provider found")]
    ProviderNotFound,

    /// The user declined the wallet prompt
    #[error("User rejected the request: {0}")]
    UserRejected(String),

    /// Operation requires a connected wallet session
    #[error("Wallet is not connected")]
    WalletNotConnected,

    /// Provider request method is not part of the supported method set
    #[error("Unsupported provider method: {0}")]
    UnsupportedMethod(String),

    // ============ Key Errors ============
    /// Invalid private key material
    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    /// Signing failed
    #[error("Failed to sign: {0}")]
    SigningError(String),

    // ============ Amount Errors ============
    /// Amount overflow during scaling or arithmetic
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    // ============ Transfer Preconditions ============
    /// A transfer was attempted without a sender keypair or receiver key
    #[error("Missing {missing}")]
    MissingTransferParty {
        /// Name of the missing party
        missing: &'static str,
    },

    /// The requested action is not available in the current view
    #[error("Action not available: {0}")]
    ActionUnavailable(String),

    /// A newer operation replaced this one before it completed
    #[error("Operation superseded (generation {generation}, current {current})")]
    Superseded {
        /// Generation of the stale operation
        generation: u64,
        /// Generation that replaced it
        current: u64,
    },

    // ============ Network Errors ============
    /// RPC request failed
    #[error("RPC request failed: {method} - {reason}")]
    RpcRequest {
        /// RPC method name
        method: String,
        /// Error reason
        reason: String,
    },

    /// Invalid RPC endpoint
    #[error("Invalid RPC endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// Endpoint URL
        url: String,
        /// Error reason
        reason: String,
    },

    /// Airdrop was submitted but never reached the requested commitment
    #[error("Airdrop {signature} not confirmed: {reason}")]
    AirdropNotConfirmed {
        /// Airdrop signature
        signature: String,
        /// Why confirmation failed
        reason: String,
    },

    // ============ Transaction Errors ============
    /// Transaction failed on chain
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The blockhash expired before the transaction was confirmed
    #[error("Blockhash expired before {signature} was confirmed")]
    BlockhashExpired {
        /// Transaction signature
        signature: String,
    },

    /// Transaction timed out
    #[error("Transaction timed out after {seconds}s waiting for confirmation")]
    TransactionTimeout {
        /// Timeout duration
        seconds: u64,
    },

    // ============ IO / Config Errors ============
    /// File IO error
    #[error("IO error: {0}")]
    Io(String),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ============ Generic ============
    /// Unknown/other error
    #[error("{0}")]
    Other(String),

    /// Wrapped error from external source
    #[error("External error: {message}")]
    External {
        /// Error message
        message: String,
    },
}

/// Convenient Result type using DemoError
pub type Result<T> = std::result::Result<T, DemoError>;

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Adds context to an error
    fn context(self, ctx: impl Into<String>) -> Result<T>;

    /// Adds context using a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: std::error::Error> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| DemoError::External {
            message: format!("{}: {}", ctx.into(), e),
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| DemoError::External {
            message: format!("{}: {}", f(), e),
        })
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, ctx: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| DemoError::Other(ctx.into()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.ok_or_else(|| DemoError::Other(f()))
    }
}

impl DemoError {
    /// Builds an [`DemoError::RpcRequest`] from any displayable cause
    pub fn rpc(method: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        DemoError::RpcRequest {
            method: method.into(),
            reason: reason.to_string(),
        }
    }
}

// ============ From implementations for common error types ============

impl From<std::io::Error> for DemoError {
    fn from(err: std::io::Error) -> Self {
        DemoError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DemoError {
    fn from(err: serde_json::Error) -> Self {
        DemoError::Json(err.to_string())
    }
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// Unknown error
    Unknown = 0,
    /// No provider injected
    ProviderNotFound = 1001,
    /// User rejected the prompt
    UserRejected = 1002,
    /// Wallet not connected
    WalletNotConnected = 1003,
    /// Invalid key material
    InvalidKey = 2001,
    /// Signing error
    SigningError = 2002,
    /// Missing transfer party
    MissingTransferParty = 3001,
    /// Superseded operation
    Superseded = 3002,
    /// RPC request error
    RpcRequest = 4001,
    /// Airdrop not confirmed
    AirdropNotConfirmed = 4002,
    /// Transaction failed
    TransactionFailed = 5001,
    /// Blockhash expired
    BlockhashExpired = 5002,
    /// Transaction timeout
    TransactionTimeout = 5003,
    /// Configuration error
    Config = 9001,
}

impl DemoError {
    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            DemoError::ProviderNotFound => ErrorCode::ProviderNotFound,
            DemoError::UserRejected(_) => ErrorCode::UserRejected,
            DemoError::WalletNotConnected => ErrorCode::WalletNotConnected,
            DemoError::InvalidKeypair(_) => ErrorCode::InvalidKey,
            DemoError::SigningError(_) => ErrorCode::SigningError,
            DemoError::MissingTransferParty { .. } => ErrorCode::MissingTransferParty,
            DemoError::Superseded { .. } => ErrorCode::Superseded,
            DemoError::RpcRequest { .. } => ErrorCode::RpcRequest,
            DemoError::AirdropNotConfirmed { .. } => ErrorCode::AirdropNotConfirmed,
            DemoError::TransactionFailed(_) => ErrorCode::TransactionFailed,
            DemoError::BlockhashExpired { .. } => ErrorCode::BlockhashExpired,
            DemoError::TransactionTimeout { .. } => ErrorCode::TransactionTimeout,
            DemoError::Config(_) | DemoError::InvalidEndpoint { .. } => ErrorCode::Config,
            _ => ErrorCode::Unknown,
        }
    }

    /// Returns true if retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DemoError::RpcRequest { .. }
                | DemoError::BlockhashExpired { .. }
                | DemoError::TransactionTimeout { .. }
        )
    }

    /// Returns true if the user declined a wallet prompt
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, DemoError::UserRejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DemoError::RpcRequest {
            method: "requestAirdrop".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("requestAirdrop"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_missing_party_display() {
        let err = DemoError::MissingTransferParty {
            missing: "senderKeypair",
        };
        assert_eq!(err.to_string(), "Missing senderKeypair");
        assert_eq!(err.code(), ErrorCode::MissingTransferParty);
    }

    #[test]
    fn test_retryable() {
        let timeout = DemoError::TransactionTimeout { seconds: 60 };
        assert!(timeout.is_retryable());

        let expired = DemoError::BlockhashExpired {
            signature: "abc".into(),
        };
        assert!(expired.is_retryable());

        assert!(!DemoError::UserRejected("closed".into()).is_retryable());
        assert!(!DemoError::ProviderNotFound.is_retryable());
    }

    #[test]
    fn test_user_rejection() {
        assert!(DemoError::UserRejected("denied".into()).is_user_rejection());
        assert!(!DemoError::WalletNotConnected.is_user_rejection());
    }

    #[test]
    fn test_rpc_helper() {
        let err = DemoError::rpc("getBalance", "timeout");
        assert_eq!(err.code(), ErrorCode::RpcRequest);
        assert_eq!(err.to_string(), "RPC request failed: getBalance - timeout");
    }

    #[test]
    fn test_error_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "file missing"));

        let with_ctx = result.context("Failed to read keypair");
        assert!(with_ctx.is_err());
        assert!(with_ctx.unwrap_err().to_string().contains("Failed to read keypair"));
    }

    #[test]
    fn test_option_context() {
        let missing: Option<u8> = None;
        let err = missing.with_context(|| "nothing here".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "nothing here");
    }

    #[test]
    fn test_from_json_error() {
        let parse: std::result::Result<Vec<u8>, _> = serde_json::from_str::<Vec<u8>>("not json");
        let err: DemoError = parse.unwrap_err().into();
        assert!(matches!(err, DemoError::Json(_)));
    }
}
