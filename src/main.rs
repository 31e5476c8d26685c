// src/main.rs
//! `dewallet` entry point.
use anyhow::Result;
use clap::Parser;
use dewallet::cli::{self, Cli};
use dewallet::core::config::WalletConfig;
use dewallet::WalletError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("warning: logging disabled: {}", e);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        if e.downcast_ref::<WalletError>().is_some_and(WalletError::is_retryable) {
            eprintln!("hint: the RPC endpoint did not answer; check the network settings and try again");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = WalletConfig::load()?;
    tracing::debug!("dewallet v{}", env!("CARGO_PKG_VERSION"));
    cli::run(cli, config).await
}

// Logs go to stderr so stdout carries only command output.
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
