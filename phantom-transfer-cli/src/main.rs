//! Phantom Transfer CLI
//!
//! Terminal rendition of the demo page. Each visible button becomes a numbered
//! menu entry; a keystore wallet is injected in place of the browser extension.

mod config;
mod logging;
mod types;

use anyhow::Context;
use clap::Parser;
use config::DemoConfig;
use phantom_transfer_core::{
    Action, ApprovalRequest, Approver, AutoApprove, DemoApp, HostEnvironment, KeystoreWallet,
    Outcome, Screen,
};
use phantom_transfer_solana::LocalAccount;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use types::{Cli, CliResponse};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let _ = dotenvy::dotenv();
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = DemoConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.apply_env();
    config.apply_flags(&cli);
    if cli.save_config {
        config.save(&cli.config)?;
        tracing::info!(path = %cli.config.display(), "Saved configuration");
    }

    let settings = config.settings()?;
    let connection = Arc::new(config.connection()?);
    tracing::info!(endpoint = %config.rpc_url, commitment = %config.commitment, "Using validator");

    let host = build_host(&config)?;
    let app = DemoApp::new(&host, connection, settings);

    loop {
        let screen = app.render();
        print_screen(&screen);

        print!("\nYour choice: ");
        io::stdout().flush()?;
        let mut choice = String::new();
        if io::stdin().read_line(&mut choice)? == 0 {
            break;
        }

        match handle_choice(&app, &screen, choice.trim()).await {
            CliResponse::Exit => break,
            CliResponse::Continue => continue,
        }
    }

    println!("\nBye!");
    Ok(())
}

fn build_host(config: &DemoConfig) -> anyhow::Result<HostEnvironment> {
    if !config.wallet.enabled {
        return Ok(HostEnvironment::empty());
    }

    let approver: Arc<dyn Approver> = if config.wallet.auto_approve {
        Arc::new(AutoApprove)
    } else {
        Arc::new(TerminalApprover)
    };
    let wallet = match &config.wallet.keypair_path {
        Some(path) => {
            let account = LocalAccount::from_keypair_file(path)
                .with_context(|| format!("reading wallet keypair {}", path.display()))?;
            KeystoreWallet::new(account, approver)
        }
        None => KeystoreWallet::generate(approver),
    };
    tracing::info!(wallet = %wallet.address(), "Injected keystore wallet");

    Ok(HostEnvironment::empty().with_phantom(Arc::new(wallet)))
}

fn print_screen(screen: &Screen) {
    println!("\n{}", screen.title);
    println!("{}", "═".repeat(screen.title.chars().count()));

    if let Some(label) = &screen.sender_label {
        println!("{label}");
    }
    if let Some(notice) = &screen.install_notice {
        println!("{notice}");
    }
    println!();
    for (index, action) in screen.buttons.iter().enumerate() {
        println!("  [{}] {}", index + 1, action.label());
    }
    println!("  [q] Quit");

    if let Some(status) = &screen.status {
        let marker = if status.is_error() { "✗" } else { "✓" };
        println!("\n{marker} {}", status.message());
    }
}

async fn handle_choice(app: &DemoApp, screen: &Screen, choice: &str) -> CliResponse {
    if choice.eq_ignore_ascii_case("q") {
        return CliResponse::Exit;
    }

    let Some(action) = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| screen.buttons.get(index).copied())
    else {
        println!("Unknown choice '{choice}'");
        return CliResponse::Continue;
    };

    match app.dispatch(action).await {
        Ok(outcome) => print_outcome(action, &outcome),
        Err(e) => eprintln!("Error: {e}"),
    }
    CliResponse::Continue
}

fn print_outcome(action: Action, outcome: &Outcome) {
    match outcome {
        Outcome::AccountFunded(receipt) => {
            println!("Sender {} funded with {} SOL", receipt.pubkey, receipt.balance);
        }
        Outcome::WalletConnected(pubkey) => println!("Connected to {pubkey}"),
        Outcome::WalletDisconnected => println!("Disconnected"),
        Outcome::Transferred(receipt) => {
            println!("Signature: {}", receipt.signature);
            println!("Sender Balance: {} SOL", receipt.sender_balance);
            println!("Receiver Balance: {} SOL", receipt.receiver_balance);
        }
    }
    tracing::debug!(?action, "Button handled");
}

/// Asks on the terminal wherever the extension would pop up.
struct TerminalApprover;

impl Approver for TerminalApprover {
    fn approve(&self, request: ApprovalRequest) -> bool {
        print!("\n[wallet] {request} (y/N): ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}
