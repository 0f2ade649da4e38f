//! `iceberg_tasks` command-line entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ethers::types::Address;
use iceberg_amm::{parse_decimals, SqrtPriceX96};
use iceberg_config::load_config;
use iceberg_tasks::report::render_permissions;
use iceberg_tasks::tasks::parse_address;
use iceberg_tasks::{format_pool_id, pool_id, ChainClient, DecimalOverrides, Tasks};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "iceberg_tasks")]
#[command(about = "Tasks for the Iceberg confidential limit-order pool")]
struct Args {
    /// Configuration file path (defaults to config/iceberg.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overlay, e.g. `sepolia` for config/environments/sepolia.toml
    #[arg(short, long)]
    environment: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the pool price and print both exchange rates
    GetExchangeRate {
        /// Convert this sqrtPriceX96 instead of reading the pool
        #[arg(long, value_parser = parse_sqrt_price)]
        sqrt_price: Option<SqrtPriceX96>,

        /// token0 decimals, overriding config and chain
        #[arg(long, value_parser = parse_decimals)]
        decimals0: Option<u8>,

        /// token1 decimals, overriding config and chain
        #[arg(long, value_parser = parse_decimals)]
        decimals1: Option<u8>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the Iceberg hook permission flags
    #[command(alias = "get-iceberg-premissions")]
    GetIcebergPermissions {
        #[arg(long)]
        json: bool,
    },

    /// Print public balances and encrypted balance handles
    GetTokenBalances {
        /// Account to query; defaults to the configured account
        #[arg(long, value_parser = parse_account)]
        account: Option<Address>,

        #[arg(long)]
        json: bool,
    },

    /// Submit an Iceberg order
    PlaceIcebergOrder,

    /// Print the pool id derived from the configured pool key
    PoolId,
}

fn parse_sqrt_price(input: &str) -> Result<SqrtPriceX96, String> {
    input.parse().map_err(|e| format!("{}", e))
}

fn parse_account(input: &str) -> Result<Address, String> {
    parse_address("--account", input).map_err(|e| format!("{:#}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so task output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&args.log_level))
                .context("Invalid log level")?,
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_deref(), args.environment.as_deref())
        .context("Failed to load configuration")?;
    info!(
        "Environment: {}",
        args.environment.as_deref().unwrap_or("default")
    );

    match args.command {
        Command::PoolId => {
            println!("{}", format_pool_id(&pool_id(&config)?));
            return Ok(());
        }
        _ => {}
    }

    let chain = ChainClient::new(
        &config.network.rpc_url,
        parse_address("contracts.state_view", &config.contracts.state_view)?,
        parse_address("contracts.iceberg", &config.contracts.iceberg)?,
    )?;
    let chain_id = config.network.chain_id;
    let offline = matches!(
        args.command,
        Command::GetExchangeRate {
            sqrt_price: Some(_),
            ..
        } | Command::PlaceIcebergOrder
    );
    if !offline {
        chain.check_chain_id(chain_id).await?;
    }

    let tasks = Tasks::new(config, chain)?;

    match args.command {
        Command::GetExchangeRate {
            sqrt_price,
            decimals0,
            decimals1,
            json,
        } => {
            let overrides = DecimalOverrides {
                decimals0,
                decimals1,
            };
            let report = tasks.exchange_rate(sqrt_price, overrides).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
        Command::GetIcebergPermissions { json } => {
            let permissions = tasks.hook_permissions().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&permissions)?);
            } else {
                print!("{}", render_permissions(&permissions));
            }
        }
        Command::GetTokenBalances { account, json } => {
            let report = tasks.token_balances(account).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
        Command::PlaceIcebergOrder => println!("{}", tasks.place_iceberg_order()),
        Command::PoolId => {}
    }

    Ok(())
}
