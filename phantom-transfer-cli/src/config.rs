//! Configuration

use crate::types::Cli;
use phantom_transfer_core::{DisconnectPolicy, Settings};
use phantom_transfer_error::{DemoError, ErrorContext, Result};
use phantom_transfer_solana::{
    parse_commitment, ConfirmationSettings, Lamports, SolanaConnection, AIRDROP_SOL,
    DEFAULT_ENDPOINT, TRANSFER_SOL,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_RPC_URL: &str = "PHANTOM_TRANSFER_RPC_URL";
pub const ENV_COMMITMENT: &str = "PHANTOM_TRANSFER_COMMITMENT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub rpc_url: String,
    pub commitment: String,
    pub airdrop_sol: u64,
    pub transfer_sol: u64,
    pub confirm_poll_ms: u64,
    pub confirm_timeout_secs: u64,
    pub disconnect_policy: DisconnectPolicy,
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair_path: Option<PathBuf>,
    pub auto_approve: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keypair_path: None,
            auto_approve: false,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        let confirmation = ConfirmationSettings::default();
        Self {
            rpc_url: DEFAULT_ENDPOINT.to_string(),
            commitment: "confirmed".to_string(),
            airdrop_sol: AIRDROP_SOL,
            transfer_sol: TRANSFER_SOL,
            confirm_poll_ms: confirmation.poll_interval.as_millis() as u64,
            confirm_timeout_secs: confirmation.timeout.as_secs(),
            disconnect_policy: DisconnectPolicy::default(),
            wallet: WalletConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&json)
            .map_err(|e| DemoError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Applies `PHANTOM_TRANSFER_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc_url = url;
        }
        if let Some(commitment) = lookup(ENV_COMMITMENT) {
            self.commitment = commitment;
        }
    }

    pub fn apply_flags(&mut self, cli: &Cli) {
        if let Some(url) = &cli.rpc_url {
            self.rpc_url = url.clone();
        }
        if cli.no_wallet {
            self.wallet.enabled = false;
        }
        if let Some(path) = &cli.wallet_keypair {
            self.wallet.keypair_path = Some(path.clone());
        }
        if cli.auto_approve {
            self.wallet.auto_approve = true;
        }
        if cli.clear_on_disconnect {
            self.disconnect_policy = DisconnectPolicy::ClearReceiver;
        }
    }

    /// Amounts and disconnect behaviour for the page
    pub fn settings(&self) -> Result<Settings> {
        Ok(Settings {
            airdrop: Lamports::from_sol(self.airdrop_sol).context("airdrop_sol")?,
            transfer: Lamports::from_sol(self.transfer_sol).context("transfer_sol")?,
            disconnect_policy: self.disconnect_policy,
            ..Settings::default()
        })
    }

    pub fn confirmation(&self) -> Result<ConfirmationSettings> {
        if self.confirm_poll_ms == 0 || self.confirm_timeout_secs == 0 {
            return Err(DemoError::Config(
                "confirm_poll_ms and confirm_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(ConfirmationSettings {
            poll_interval: Duration::from_millis(self.confirm_poll_ms),
            timeout: Duration::from_secs(self.confirm_timeout_secs),
        })
    }

    /// Opens the network connection described by this config
    pub fn connection(&self) -> Result<SolanaConnection> {
        let commitment = parse_commitment(&self.commitment)?;
        Ok(SolanaConnection::new_with_commitment(&self.rpc_url, commitment)?
            .with_confirmation(self.confirmation()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DemoConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.disconnect_policy, DisconnectPolicy::RetainReceiver);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phantom_transfer.json");
        std::fs::write(&path, "{ rpc_url: ").unwrap();

        let err = DemoConfig::load(&path).unwrap_err();
        assert!(matches!(err, DemoError::Config(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phantom_transfer.json");
        let mut config = DemoConfig::default();
        config.transfer_sol = 3;
        config.disconnect_policy = DisconnectPolicy::ClearReceiver;
        config.save(&path).unwrap();

        assert_eq!(DemoConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phantom_transfer.json");
        std::fs::write(&path, r#"{"airdrop_sol": 5, "disconnect_policy": "clear_receiver"}"#).unwrap();

        let config = DemoConfig::load(&path).unwrap();
        assert_eq!(config.airdrop_sol, 5);
        assert_eq!(config.transfer_sol, TRANSFER_SOL);
        assert_eq!(config.disconnect_policy, DisconnectPolicy::ClearReceiver);
        assert!(config.wallet.enabled);
    }

    #[test]
    fn test_precedence_file_env_flags() {
        let mut config = DemoConfig {
            rpc_url: "http://from-file:8899".to_string(),
            ..DemoConfig::default()
        };

        let env: HashMap<&str, &str> = [
            (ENV_RPC_URL, "http://from-env:8899"),
            (ENV_COMMITMENT, "finalized"),
        ]
        .into_iter()
        .collect();
        config.apply_env_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.rpc_url, "http://from-env:8899");
        assert_eq!(config.commitment, "finalized");

        let cli = Cli::parse_from([
            "phantom-transfer",
            "--rpc-url",
            "http://from-flag:8899",
            "--no-wallet",
            "--clear-on-disconnect",
        ]);
        config.apply_flags(&cli);
        assert_eq!(config.rpc_url, "http://from-flag:8899");
        assert_eq!(config.commitment, "finalized");
        assert!(!config.wallet.enabled);
        assert_eq!(config.disconnect_policy, DisconnectPolicy::ClearReceiver);
    }

    #[test]
    fn test_settings_from_config() {
        let config = DemoConfig {
            airdrop_sol: 4,
            ..DemoConfig::default()
        };
        let settings = config.settings().unwrap();
        assert_eq!(settings.airdrop, Lamports(4_000_000_000));
        assert_eq!(settings.transfer, Lamports(1_000_000_000));

        let overflow = DemoConfig {
            transfer_sol: u64::MAX,
            ..DemoConfig::default()
        };
        assert!(overflow.settings().is_err());
    }

    #[test]
    fn test_connection_rejects_bad_values() {
        let bad_commitment = DemoConfig {
            commitment: "eventually".to_string(),
            ..DemoConfig::default()
        };
        assert!(bad_commitment.connection().is_err());

        let zero_poll = DemoConfig {
            confirm_poll_ms: 0,
            ..DemoConfig::default()
        };
        assert!(zero_poll.confirmation().is_err());
    }
}
