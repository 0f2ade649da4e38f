//! Task runners behind the `iceberg_tasks` subcommands

use anyhow::{Context, Result};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use iceberg_amm::{AssetDecimals, PriceConfig, PriceConversion, SqrtPriceX96};
use iceberg_config::TaskConfig;
use tracing::{debug, info};

use crate::chain::PoolReader;
use crate::permissions::HookPermissions;
use crate::pool_key::{format_pool_id, parse_pool_id, PoolId, PoolKey};
use crate::report::{BalanceReport, ExchangeRateReport, PoolStateReport};

/// Printed by `place-iceberg-order`
pub const ORDER_MAINTENANCE_NOTICE: &str =
    "place-iceberg-order is under maintenance, no order was submitted";

/// Decimals given on the command line, taking priority over configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecimalOverrides {
    pub decimals0: Option<u8>,
    pub decimals1: Option<u8>,
}

pub fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .with_context(|| format!("{} is not a valid address: '{}'", field, value))
}

/// Pool key built from the configured tokens, hook and pool parameters
pub fn pool_key(config: &TaskConfig) -> Result<PoolKey> {
    let key = PoolKey::new(
        parse_address("contracts.token0", &config.contracts.token0)?,
        parse_address("contracts.token1", &config.contracts.token1)?,
        config.pool.fee,
        config.pool.tick_spacing,
        parse_address("contracts.iceberg", &config.contracts.iceberg)?,
    )?;
    Ok(key)
}

/// Configured pool id, or the one derived from [`pool_key`]
pub fn pool_id(config: &TaskConfig) -> Result<PoolId> {
    match &config.pool.id {
        Some(id) => Ok(parse_pool_id(id)?),
        None => Ok(pool_key(config)?.id()),
    }
}

/// Account for balance queries: explicit, then configured, then derived from the key
pub fn resolve_account(config: &TaskConfig, explicit: Option<Address>) -> Result<Address> {
    if let Some(account) = explicit {
        return Ok(account);
    }
    if let Some(address) = &config.account.address {
        return parse_address("account.address", address);
    }
    if let Some(key) = &config.account.private_key {
        let wallet = key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .context("account.private_key is not a valid secp256k1 key")?;
        return Ok(wallet.address());
    }
    anyhow::bail!(
        "No account configured; pass --account or set account.address or account.private_key"
    )
}

pub struct Tasks<C> {
    config: TaskConfig,
    chain: C,
    engine: PriceConversion,
}

impl<C: PoolReader> Tasks<C> {
    pub fn new(config: TaskConfig, chain: C) -> Result<Self> {
        let price_config = PriceConfig::new(config.pricing.precision)
            .context("Invalid pricing.precision")?;

        Ok(Self {
            config,
            chain,
            engine: PriceConversion::new(price_config),
        })
    }

    /// Read the pool price and convert it both ways
    ///
    /// With a supplied `sqrt_price` nothing is read from the chain, so both
    /// decimals must come from `overrides` or the configuration.
    pub async fn exchange_rate(
        &self,
        sqrt_price: Option<SqrtPriceX96>,
        overrides: DecimalOverrides,
    ) -> Result<ExchangeRateReport> {
        let id = pool_id(&self.config)?;

        let (sqrt_price, pool_state, decimals) = match sqrt_price {
            Some(price) => {
                info!("Using supplied sqrtPriceX96 {}", price);
                (price, None, self.configured_decimals(overrides)?)
            }
            None => {
                info!("Reading pool state for {}", format_pool_id(&id));
                let slot0 = self.chain.slot0(id).await?;
                let state = PoolStateReport::from(&slot0);
                let decimals = self.decimals(overrides).await?;
                (slot0.sqrt_price_x96, Some(state), decimals)
            }
        };
        debug!("Converting with decimals {}", decimals);

        let scaled = self
            .engine
            .derive_exchange_rate(&sqrt_price, decimals)
            .context("Failed to derive exchange rate")?;

        Ok(ExchangeRateReport::new(
            format_pool_id(&id),
            pool_state,
            &scaled,
        ))
    }

    pub async fn hook_permissions(&self) -> Result<HookPermissions> {
        info!("Reading hook permissions from {}", self.config.contracts.iceberg);
        self.chain.hook_permissions().await
    }

    pub async fn token_balances(&self, account: Option<Address>) -> Result<BalanceReport> {
        let account = resolve_account(&self.config, account)?;
        let token0 = parse_address("contracts.token0", &self.config.contracts.token0)?;
        let token1 = parse_address("contracts.token1", &self.config.contracts.token1)?;

        info!("Reading balances of {:?}", account);
        let balance0 = self.chain.token_balance(token0, account).await?;
        let balance1 = self.chain.token_balance(token1, account).await?;

        Ok(BalanceReport {
            account,
            token0: balance0.into(),
            token1: balance1.into(),
        })
    }

    pub fn place_iceberg_order(&self) -> &'static str {
        ORDER_MAINTENANCE_NOTICE
    }

    /// Decimals from the command line or configuration only
    fn configured_decimals(&self, overrides: DecimalOverrides) -> Result<AssetDecimals> {
        let decimals0 = overrides
            .decimals0
            .or(self.config.pricing.decimals0)
            .context("token0 decimals are unknown; pass --decimals0 or set pricing.decimals0")?;
        let decimals1 = overrides
            .decimals1
            .or(self.config.pricing.decimals1)
            .context("token1 decimals are unknown; pass --decimals1 or set pricing.decimals1")?;
        Ok(AssetDecimals::new(decimals0, decimals1))
    }

    /// Decimals from the command line, then configuration, then the token contracts
    async fn decimals(&self, overrides: DecimalOverrides) -> Result<AssetDecimals> {
        let decimals0 = match overrides.decimals0.or(self.config.pricing.decimals0) {
            Some(value) => value,
            None => {
                let token = parse_address("contracts.token0", &self.config.contracts.token0)?;
                self.chain.token_decimals(token).await?
            }
        };
        let decimals1 = match overrides.decimals1.or(self.config.pricing.decimals1) {
            Some(value) => value,
            None => {
                let token = parse_address("contracts.token1", &self.config.contracts.token1)?;
                self.chain.token_decimals(token).await?
            }
        };
        Ok(AssetDecimals::new(decimals0, decimals1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Slot0, TokenBalance};
    use async_trait::async_trait;
    use ethers::types::U256;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SEPOLIA_SQRT_PRICE: &str = "81616034954994713222607626487";
    const SEPOLIA_POOL_ID: &str =
        "0x3feaace03479a4b14999b3300f3555b4c275b4263363791788f76677cf834e59";

    #[derive(Default)]
    struct MockReader {
        decimals_calls: AtomicUsize,
    }

    #[async_trait]
    impl PoolReader for MockReader {
        async fn slot0(&self, pool_id: PoolId) -> Result<Slot0> {
            assert_eq!(format_pool_id(&pool_id), SEPOLIA_POOL_ID);
            Ok(Slot0 {
                sqrt_price_x96: SEPOLIA_SQRT_PRICE.parse()?,
                tick: 1187,
                protocol_fee: 0,
                lp_fee: 3000,
            })
        }

        async fn token_decimals(&self, _token: Address) -> Result<u8> {
            self.decimals_calls.fetch_add(1, Ordering::SeqCst);
            Ok(18)
        }

        async fn hook_permissions(&self) -> Result<HookPermissions> {
            let mut flags = [false; 14];
            flags[6] = true;
            Ok(HookPermissions::from_flags(flags))
        }

        async fn token_balance(&self, token: Address, _account: Address) -> Result<TokenBalance> {
            let token0 = parse_address("token0", iceberg_config::deployment::sepolia::TOKEN0)?;
            let public = if token == token0 {
                U256::from(5u64)
            } else {
                U256::from(7u64)
            };
            Ok(TokenBalance {
                public,
                encrypted_handle: U256::from(1u64),
            })
        }
    }

    /// Reader for tasks that must never touch the chain
    struct Unreachable;

    #[async_trait]
    impl PoolReader for Unreachable {
        async fn slot0(&self, _pool_id: PoolId) -> Result<Slot0> {
            anyhow::bail!("RPC getSlot0() attempted")
        }

        async fn token_decimals(&self, _token: Address) -> Result<u8> {
            anyhow::bail!("RPC decimals() attempted")
        }

        async fn hook_permissions(&self) -> Result<HookPermissions> {
            anyhow::bail!("RPC getHookPermissions() attempted")
        }

        async fn token_balance(&self, _token: Address, _account: Address) -> Result<TokenBalance> {
            anyhow::bail!("RPC balanceOf() attempted")
        }
    }

    fn tasks(config: TaskConfig) -> Tasks<MockReader> {
        Tasks::new(config, MockReader::default()).unwrap()
    }

    #[test]
    fn test_default_pool_id_matches_deployment() {
        let id = pool_id(&TaskConfig::default()).unwrap();
        assert_eq!(format_pool_id(&id), SEPOLIA_POOL_ID);

        let mut config = TaskConfig::default();
        config.pool.id = Some(format!("0x{}", "11".repeat(32)));
        assert_eq!(pool_id(&config).unwrap(), [0x11; 32]);

        config.pool.id = Some("0x11".to_string());
        assert!(pool_id(&config).is_err());
    }

    #[test]
    fn test_rejects_low_precision() {
        let mut config = TaskConfig::default();
        config.pricing.precision = 10;
        assert!(Tasks::new(config, MockReader::default()).is_err());
    }

    #[tokio::test]
    async fn test_exchange_rate_reads_chain() {
        let tasks = tasks(TaskConfig::default());
        let report = tasks
            .exchange_rate(None, DecimalOverrides::default())
            .await
            .unwrap();

        assert_eq!(report.pool_id, SEPOLIA_POOL_ID);
        assert_eq!(report.pool_state.as_ref().unwrap().tick, 1187);
        assert_eq!(report.token0_in_token1_smallest_unit, "1061186745504384975");
        assert_eq!(report.token1_in_token0_smallest_unit, "942341208308908205");
        assert_eq!(tasks.chain.decimals_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exchange_rate_with_supplied_price_and_decimals() {
        let mut config = TaskConfig::default();
        config.pricing.decimals0 = Some(18);
        let tasks = tasks(config);

        let overrides = DecimalOverrides {
            decimals0: None,
            decimals1: Some(18),
        };
        let report = tasks
            .exchange_rate(Some(SEPOLIA_SQRT_PRICE.parse().unwrap()), overrides)
            .await
            .unwrap();

        assert!(report.pool_state.is_none());
        assert_eq!(report.token0_in_token1, "1.061186745504384975");
        assert_eq!(tasks.chain.decimals_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_supplied_price_never_reads_chain() {
        let price: SqrtPriceX96 = SEPOLIA_SQRT_PRICE.parse().unwrap();
        let tasks = Tasks::new(TaskConfig::default(), Unreachable).unwrap();

        // without configured decimals the supplied price cannot be converted
        let err = tasks
            .exchange_rate(Some(price.clone()), DecimalOverrides::default())
            .await
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("--decimals0"), "{}", message);
        assert!(!message.contains("RPC"), "{}", message);

        let only_token0 = DecimalOverrides {
            decimals0: Some(18),
            decimals1: None,
        };
        let err = tasks
            .exchange_rate(Some(price.clone()), only_token0)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("--decimals1"));

        let both = DecimalOverrides {
            decimals0: Some(18),
            decimals1: Some(18),
        };
        let report = tasks.exchange_rate(Some(price), both).await.unwrap();
        assert!(report.pool_state.is_none());
        assert_eq!(report.token1_in_token0_smallest_unit, "942341208308908205");
    }

    #[tokio::test]
    async fn test_zero_price_fails() {
        let tasks = tasks(TaskConfig::default());
        let overrides = DecimalOverrides {
            decimals0: Some(18),
            decimals1: Some(18),
        };
        let result = tasks.exchange_rate(Some(SqrtPriceX96::from(0u128)), overrides).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_hook_permissions_pass_through() {
        let permissions = tasks(TaskConfig::default()).hook_permissions().await.unwrap();
        assert!(permissions.before_swap);
        assert!(!permissions.after_swap);
    }

    #[tokio::test]
    async fn test_token_balances_for_explicit_account() {
        let tasks = tasks(TaskConfig::default());
        let report = tasks.token_balances(Some(Address::zero())).await.unwrap();

        assert_eq!(report.account, Address::zero());
        assert_eq!(report.token0.public, "5");
        assert_eq!(report.token1.public, "7");
    }

    #[test]
    fn test_resolve_account_order() {
        let mut config = TaskConfig::default();
        assert!(resolve_account(&config, None).is_err());

        // Hardhat's first development key
        config.account.private_key =
            Some("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string());
        let derived = resolve_account(&config, None).unwrap();
        assert_eq!(
            derived,
            parse_address("a", "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
        );

        config.account.address = Some("0x00000000000000000000000000000000000000aa".to_string());
        let configured = resolve_account(&config, None).unwrap();
        assert_eq!(configured, Address::from_low_u64_be(0xaa));

        assert_eq!(
            resolve_account(&config, Some(Address::zero())).unwrap(),
            Address::zero()
        );
    }

    #[test]
    fn test_place_order_reports_maintenance() {
        let tasks = tasks(TaskConfig::default());
        assert!(tasks.place_iceberg_order().contains("under maintenance"));
    }
}
