//! # Iceberg Task Configuration
//!
//! Centralized configuration for the Iceberg pool tasks: RPC endpoint,
//! contract addresses, the pool key and the arithmetic precision used for
//! price conversion.
//!
//! ## Sources (later sources win)
//!
//! 1. Built-in Sepolia deployment defaults ([`deployment`])
//! 2. `config/iceberg.toml` (or the path given on the command line)
//! 3. `config/environments/<env>.toml`
//! 4. `ICEBERG__<SECTION>__<KEY>` environment variables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use iceberg_config::load_config;
//!
//! let config = load_config(None, Some("sepolia"))?;
//! println!("state view: {}", config.contracts.state_view);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod deployment;
pub mod task_config;

pub use task_config::{
    load_config, AccountConfig, ContractsConfig, NetworkConfig, PoolConfig, PricingConfig,
    TaskConfig,
};
