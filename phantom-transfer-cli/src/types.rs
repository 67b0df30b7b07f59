//! CLI Types

use clap::Parser;
use std::path::PathBuf;

/// Command-line flags. Each one overrides the config file and environment.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "phantom-transfer")]
#[command(about = "Create a funded Solana account and send SOL to a connected wallet", long_about = None)]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "phantom_transfer.json")]
    pub config: PathBuf,

    /// RPC endpoint of the validator
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Start without an injected wallet
    #[arg(long)]
    pub no_wallet: bool,

    /// Keypair file (Solana CLI format) for the injected wallet
    #[arg(long)]
    pub wallet_keypair: Option<PathBuf>,

    /// Approve wallet prompts without asking
    #[arg(long)]
    pub auto_approve: bool,

    /// Forget the wallet key when it disconnects
    #[arg(long)]
    pub clear_on_disconnect: bool,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    pub save_config: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliResponse {
    Continue,
    Exit,
}
