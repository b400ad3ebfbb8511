//! SVE inspection CLI
//!
//! Derives addresses, reads wrapper state and previews lock bundles. Nothing
//! is signed or submitted.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use solana_sdk::instruction::Instruction;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sve_sdk::{
    config::SdkConfig,
    core::{parse_pubkey, WrapperData},
    protocol::PdaBuilder,
    LockArgs, SveClient,
};

#[derive(Parser)]
#[command(name = "sve")]
#[command(about = "SVE vote-escrow wrapper tooling")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Override the RPC endpoint
    #[arg(long)]
    rpc_url: Option<String>,

    /// Wallet acting as payer and default authority
    #[arg(short, long)]
    wallet: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive protocol addresses
    Address {
        #[command(subcommand)]
        target: AddressTarget,
    },
    /// Inspect wrappers
    Wrapper {
        #[command(subcommand)]
        action: WrapperAction,
    },
    /// Preview the bundle locking wrapper tokens
    Lock {
        /// Wrapper mint
        #[arg(long)]
        mint: String,
        #[arg(long)]
        amount: u64,
        /// Lock duration in seconds
        #[arg(long)]
        duration: u64,
        /// Escrow owner; defaults to the wallet
        #[arg(long)]
        owner: Option<String>,
    },
}

#[derive(Subcommand)]
enum AddressTarget {
    /// Wrapper account of a wrapper mint
    Wrapper {
        #[arg(long)]
        mint: String,
    },
    /// Escrow of an owner in a locker
    Escrow {
        #[arg(long)]
        locker: String,
        #[arg(long)]
        owner: String,
    },
}

#[derive(Subcommand)]
enum WrapperAction {
    /// Fetch and print a wrapper record
    Show {
        #[arg(long)]
        mint: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = match &cli.config {
        Some(path) => SdkConfig::load(path)?,
        None => SdkConfig::default(),
    };
    if let Some(url) = cli.rpc_url {
        config = config.with_rpc_url(url);
    }
    let wallet = cli.wallet.as_deref().map(parse_pubkey).transpose()?;

    let output = match cli.command {
        Command::Address { target } => {
            let pda = PdaBuilder::new(Arc::new(config.programs.clone()));
            match target {
                AddressTarget::Wrapper { mint } => {
                    let (address, bump) = pda.sve(&parse_pubkey(&mint)?)?;
                    json!({ "address": address.to_string(), "bump": bump })
                }
                AddressTarget::Escrow { locker, owner } => {
                    let (address, bump) = pda.escrow(&parse_pubkey(&locker)?, &parse_pubkey(&owner)?)?;
                    json!({ "address": address.to_string(), "bump": bump })
                }
            }
        }
        Command::Wrapper {
            action: WrapperAction::Show { mint },
        } => {
            info!("Reading wrapper from {}", config.rpc_url);
            let client = SveClient::from_config(&config, wallet.unwrap_or_default())?;
            let wrapper = client.fetch_wrapper_by_mint(&parse_pubkey(&mint)?).await?;
            wrapper_json(&wrapper)
        }
        Command::Lock {
            mint,
            amount,
            duration,
            owner,
        } => {
            let owner = match owner {
                Some(owner) => parse_pubkey(&owner)?,
                None => wallet.context("either --owner or --wallet is required")?,
            };
            let client = SveClient::from_config(&config, wallet.unwrap_or(owner))?;
            let tx = client
                .lock(LockArgs {
                    wrapper_mint: parse_pubkey(&mint)?,
                    amount,
                    duration,
                    user_authority: Some(owner),
                    payer: None,
                })
                .await?;
            info!("Lock bundle has {} instructions", tx.len());
            json!({
                "instructions": tx.instructions.iter().map(instruction_json).collect::<Vec<_>>(),
                "signers": tx.signer_pubkeys().iter().map(|k| k.to_string()).collect::<Vec<_>>(),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sve_sdk=info,sve=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn wrapper_json(wrapper: &WrapperData) -> serde_json::Value {
    json!({
        "mint": wrapper.mint.to_string(),
        "bump": wrapper.bump,
        "min_lock_duration": wrapper.min_lock_duration,
        "underlying_mint": wrapper.underlying_mint.to_string(),
        "yi_mint": wrapper.yi_mint.to_string(),
        "yi": wrapper.yi.to_string(),
        "yi_tokens": wrapper.yi_tokens.to_string(),
        "locker": wrapper.locker.to_string(),
    })
}

fn instruction_json(ix: &Instruction) -> serde_json::Value {
    let accounts: Vec<_> = ix
        .accounts
        .iter()
        .map(|meta| {
            json!({
                "pubkey": meta.pubkey.to_string(),
                "is_signer": meta.is_signer,
                "is_writable": meta.is_writable,
            })
        })
        .collect();
    json!({
        "program_id": ix.program_id.to_string(),
        "accounts": accounts,
        "data_len": ix.data.len(),
    })
}
