//! Task Configuration Module
//!
//! Provides configuration loading for the Iceberg tasks. Supports loading
//! from TOML files with environment-specific overrides and `ICEBERG__`
//! prefixed environment variables.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use iceberg_amm::{DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::deployment::sepolia;

/// Default location of the task configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/iceberg.toml";

/// Prefix for environment overrides, e.g. `ICEBERG__NETWORK__RPC_URL`
pub const ENV_PREFIX: &str = "ICEBERG";

/// Largest value a `uint24` pool fee can hold
const MAX_POOL_FEE: u32 = 0x00FF_FFFF;

/// Main task configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct TaskConfig {
    pub network: NetworkConfig,
    pub contracts: ContractsConfig,
    pub pool: PoolConfig,
    pub pricing: PricingConfig,
    pub account: AccountConfig,
}

/// RPC connection settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
}

/// Deployed contract addresses (hex strings)
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ContractsConfig {
    pub state_view: String,
    pub iceberg: String,
    pub token0: String,
    pub token1: String,
}

/// Pool key parameters; currencies and hook come from [`ContractsConfig`]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PoolConfig {
    /// Fee in hundredths of a bip
    pub fee: u32,
    pub tick_spacing: i32,
    /// Explicit pool id, overriding the one derived from the pool key
    pub id: Option<String>,
}

/// Price conversion settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    /// Significant digits kept by the reciprocal rate
    pub precision: u64,
    /// Token decimals; read from the token contracts when unset
    pub decimals0: Option<u8>,
    pub decimals1: Option<u8>,
}

/// Account used by balance queries
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AccountConfig {
    pub private_key: Option<String>,
    pub address: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: sepolia::RPC_URL.to_string(),
            chain_id: sepolia::CHAIN_ID,
        }
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            state_view: sepolia::STATE_VIEW.to_string(),
            iceberg: sepolia::ICEBERG.to_string(),
            token0: sepolia::TOKEN0.to_string(),
            token1: sepolia::TOKEN1.to_string(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            fee: sepolia::POOL_FEE,
            tick_spacing: sepolia::TICK_SPACING,
            id: None,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            decimals0: None,
            decimals1: None,
        }
    }
}

impl TaskConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let defaults = Config::try_from(&TaskConfig::default())
            .context("Failed to serialize default configuration")?;

        // An explicitly requested file must exist, the default one may not
        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(File::from(base).required(base_path.is_some()));

        if base.exists() {
            info!("Loading task config: {:?}", base);
        } else {
            debug!("No config file at {:?}, using built-in defaults", base);
        }

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = environment_path(base, env);
            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (ICEBERG__SECTION__KEY)
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Expand `${VAR}` references in endpoint and credential values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        let expanded = shellexpand::env(&self.network.rpc_url)
            .context("Failed to expand RPC URL")?;
        self.network.rpc_url = expanded.to_string();

        if let Some(key) = &self.account.private_key {
            let expanded = shellexpand::env(key).context("Failed to expand private key")?;
            self.account.private_key = Some(expanded.to_string());
        }

        Ok(())
    }

    /// Reject settings no task can work with
    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_url.trim().is_empty() {
            bail!("network.rpc_url must not be empty");
        }
        if self.network.chain_id == 0 {
            bail!("network.chain_id must be non-zero");
        }
        if self.pool.fee > MAX_POOL_FEE {
            bail!(
                "pool.fee {} does not fit in a uint24 (max {})",
                self.pool.fee,
                MAX_POOL_FEE
            );
        }
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.pricing.precision) {
            bail!(
                "pricing.precision {} is outside {}..={} digits",
                self.pricing.precision,
                MIN_PRECISION,
                MAX_PRECISION
            );
        }
        Ok(())
    }
}

/// Convenience function to load, expand and validate configuration
pub fn load_config(base_path: Option<&Path>, environment: Option<&str>) -> Result<TaskConfig> {
    let mut config = TaskConfig::load(base_path, environment)?;
    config.expand_env_vars()?;
    config.validate()?;
    Ok(config)
}

/// Location of an environment overlay next to the given base file
pub fn environment_path(base: &Path, environment: &str) -> PathBuf {
    base.parent()
        .unwrap_or(Path::new("."))
        .join("environments")
        .join(format!("{}.toml", environment))
}
