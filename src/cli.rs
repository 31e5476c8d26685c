//! `dewallet` command-line surface: argument definitions, secret prompts and
//! command dispatch over a [`WalletManager`].

use anyhow::Context;
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::core::config::WalletConfig;
use crate::core::domain::{TokenDescriptor, TransactionIntent, TxReceipt, NATIVE_SYMBOL};
use crate::core::wallet::seed_phrase_hash;
use crate::core::wallet_manager::WalletManager;
use crate::security::SecretString;

/// Passphrase source for non-interactive use.
pub const PASSPHRASE_ENV: &str = "DEWALLET_PASSPHRASE";
/// Seed phrase source for `import` and `recover` in non-interactive use.
pub const SEED_PHRASE_ENV: &str = "DEWALLET_SEED_PHRASE";

#[derive(Debug, Parser)]
#[command(name = "dewallet", about = "Self-custodial Ethereum wallet", version, disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show whether a wallet exists and its address
    Status,
    /// Generate a new wallet and store it encrypted
    Create {
        /// Mnemonic length (12 or 24)
        #[arg(long)]
        words: Option<usize>,
        /// Print the seed phrase even when stdout is not a terminal
        #[arg(long)]
        show_seed: bool,
    },
    /// Restore a wallet from its seed phrase
    Import,
    /// Show ETH and token balances
    Balance,
    /// Transfer ETH or a configured token through the DeWallet contract
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = NATIVE_SYMBOL)]
        token: String,
    },
    /// Quote the fee for an ETH transfer
    EstimateFee {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Register the wallet's seed hash with the contract
    Register,
    /// Initiate recovery for a seed phrase
    Recover,
    /// Encrypt a plaintext record left by an earlier version
    Migrate,
    /// Write the seed phrase to a file readable only by the owner
    ExportSeed {
        #[arg(long)]
        output: PathBuf,
    },
    /// Delete the stored wallet
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Read a secret from `env_var`, or prompt for it on stderr and read one line from stdin.
pub fn read_secret(env_var: &str, prompt: &str) -> anyhow::Result<SecretString> {
    if let Ok(value) = std::env::var(env_var) {
        return Ok(SecretString::new(value));
    }
    if io::stdin().is_terminal() {
        eprint!("{}: ", prompt);
        io::stderr().flush().ok();
    }
    let mut line = SecretString::new(String::new());
    io::stdin().lock().read_line(&mut line).context("failed to read from stdin")?;
    let trimmed = SecretString::new(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string());
    if trimmed.is_empty() {
        anyhow::bail!("no input given; set {} or type it at the prompt", env_var);
    }
    Ok(trimmed)
}

fn read_passphrase() -> anyhow::Result<SecretString> {
    read_secret(PASSPHRASE_ENV, "Passphrase")
}

/// Write `contents` to `path` with owner-only permissions.
pub fn write_private_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;

    // Try to set restrictive permissions on unix-like systems (600).
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    {
        tracing::warn!(path = %path.display(), "Could not enforce owner-only permissions on this platform. Secure the file manually.");
    }
    Ok(())
}

fn print_tokens(tokens: &[TokenDescriptor]) {
    for t in tokens {
        println!("{:<6} {:>24}  {} ({})", t.symbol, t.balance, t.price, t.change);
    }
}

fn print_receipt(receipt: &TxReceipt) {
    println!("tx: {}", receipt.tx_hash);
    if let Some(block) = receipt.block_number {
        println!("block: {}", block);
    }
    if let Some(gas) = &receipt.gas_used {
        println!("gas used: {}", gas);
    }
}

/// Build the manager for `command` and run it.
pub async fn run(cli: Cli, config: WalletConfig) -> anyhow::Result<()> {
    let manager = WalletManager::from_config(config)?;
    execute(&manager, cli.command).await
}

pub async fn execute(manager: &WalletManager, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Status => {
            let status = manager.status().await?;
            println!("network: {}", status.network);
            match (&status.address, status.has_wallet) {
                (Some(address), true) => println!("wallet: {}", address),
                _ if status.legacy_record => {
                    println!("wallet: legacy record found, run `dewallet migrate`")
                }
                _ => println!("wallet: none"),
            }
        }
        Commands::Create { words, show_seed } => {
            let passphrase = read_passphrase()?;
            let created = manager.create_wallet(&passphrase, words).await?;
            println!("address: {}", created.address);
            if show_seed || io::stdout().is_terminal() {
                println!();
                println!("Write down this seed phrase and keep it offline. `dewallet export-seed` can write it out later:");
                println!("{}", created.mnemonic.as_str());
                println!();
            } else {
                tracing::info!(mnemonic = "<hidden>", "Seed phrase not printed to a non-terminal; use `dewallet export-seed`");
            }
            drop(created);

            if let Err(e) = manager.refresh_balance().await {
                eprintln!("warning: could not fetch balance: {}", e);
            } else {
                println!("balance: {} ETH", manager.cached_native_balance());
            }
        }
        Commands::Import => {
            let phrase = read_secret(SEED_PHRASE_ENV, "Seed phrase")?;
            let passphrase = read_passphrase()?;
            let address = manager.import_wallet(&phrase, &passphrase).await?;
            println!("address: {}", address);
        }
        Commands::Balance => {
            let address = manager.wallet_address().await?;
            manager.verify_network().await?;
            println!("address: {}", address);
            match manager.refresh_balance().await {
                Ok(tokens) => print_tokens(&tokens),
                Err(e) => {
                    if let Some(tokens) = manager.cached_balance() {
                        print_tokens(&tokens);
                    }
                    return Err(e.into());
                }
            }
        }
        Commands::Send { to, amount, token } => {
            let intent = TransactionIntent::token(to, amount, token);
            manager.validate_intent(&intent)?;
            manager.verify_network().await?;
            let passphrase = read_passphrase()?;
            let receipt = manager.send(intent, &passphrase).await?;
            println!("Transaction confirmed");
            print_receipt(&receipt);
        }
        Commands::EstimateFee { to, amount } => {
            manager.validate_intent(&TransactionIntent::native(to.as_str(), amount.as_str()))?;
            manager.verify_network().await?;
            let fee = manager.estimate_fee(&to, &amount).await?;
            println!("estimated fee: {} ETH", fee);
        }
        Commands::Register => {
            manager.session().require_wallet().await?;
            manager.verify_network().await?;
            let passphrase = read_passphrase()?;
            let receipt = manager.register(&passphrase).await?;
            println!("Wallet registered");
            print_receipt(&receipt);
        }
        Commands::Recover => {
            manager.session().require_wallet().await?;
            let phrase = read_secret(SEED_PHRASE_ENV, "Seed phrase to recover")?;
            seed_phrase_hash(&phrase)?;
            manager.verify_network().await?;
            let passphrase = read_passphrase()?;
            let receipt = manager.initiate_recovery(&phrase, &passphrase).await?;
            println!("Recovery initiated");
            print_receipt(&receipt);
        }
        Commands::Migrate => {
            if !manager.store().has_legacy_record().await? {
                println!("Nothing to migrate");
                return Ok(());
            }
            let passphrase = read_passphrase()?;
            manager.migrate_legacy(&passphrase).await?;
            println!("Wallet record encrypted");
        }
        Commands::ExportSeed { output } => {
            let passphrase = read_passphrase()?;
            let phrase = manager.export_seed_phrase(&passphrase).await?;
            write_private_file(&output, phrase.as_bytes())?;
            tracing::warn!(path = %output.display(), "Seed phrase exported in plaintext");
            println!("Seed phrase written to {}", output.display());
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to delete the wallet without --yes");
            }
            manager.clear_wallet().await?;
            println!("Wallet removed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let cli = Cli::parse_from(["dewallet", "send", "--to", "0xabc", "--amount", "1.5"]);
        match cli.command {
            Commands::Send { to, amount, token } => {
                assert_eq!(to, "0xabc");
                assert_eq!(amount, "1.5");
                assert_eq!(token, "ETH");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_create_words() {
        let cli = Cli::parse_from(["dewallet", "create", "--words", "24"]);
        assert!(matches!(cli.command, Commands::Create { words: Some(24), show_seed: false }));
    }

    #[test]
    fn test_clear_requires_flag() {
        let cli = Cli::parse_from(["dewallet", "clear"]);
        assert!(matches!(cli.command, Commands::Clear { yes: false }));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("dewallet-seed-phrase.txt");
        write_private_file(&path, b"secret words").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read(&path).unwrap(), b"secret words");
    }
}
