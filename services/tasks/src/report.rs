//! Human readable and JSON task output

use std::fmt;

use ethers::types::{Address, U256};
use iceberg_amm::{AssetDecimals, ScaledRate};
use serde::Serialize;

use crate::chain::{Slot0, TokenBalance};
use crate::permissions::HookPermissions;

/// Width of the longest permission name, used to align the listing
const PERMISSION_LABEL_WIDTH: usize = 31;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStateReport {
    pub sqrt_price_x96: String,
    pub tick: i32,
    pub protocol_fee: u32,
    pub lp_fee: u32,
}

impl From<&Slot0> for PoolStateReport {
    fn from(slot0: &Slot0) -> Self {
        Self {
            sqrt_price_x96: slot0.sqrt_price_x96.to_string(),
            tick: slot0.tick,
            protocol_fee: slot0.protocol_fee,
            lp_fee: slot0.lp_fee,
        }
    }
}

/// Result of the `get-exchange-rate` task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateReport {
    pub pool_id: String,
    /// Absent when the price was supplied on the command line
    pub pool_state: Option<PoolStateReport>,
    pub decimals: AssetDecimals,
    pub token0_in_token1: String,
    pub token1_in_token0: String,
    pub token0_in_token1_smallest_unit: String,
    pub token1_in_token0_smallest_unit: String,
}

impl ExchangeRateReport {
    pub fn new(pool_id: String, pool_state: Option<PoolStateReport>, scaled: &ScaledRate) -> Self {
        Self {
            pool_id,
            pool_state,
            decimals: scaled.decimals,
            token0_in_token1: scaled.rate0in1_fixed(),
            token1_in_token0: scaled.rate1in0_fixed(),
            token0_in_token1_smallest_unit: scaled.rate0in1.to_string(),
            token1_in_token0_smallest_unit: scaled.rate1in0.to_string(),
        }
    }
}

impl fmt::Display for ExchangeRateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(state) = &self.pool_state {
            writeln!(f)?;
            writeln!(f, "---- Current Pool State ----")?;
            writeln!(f, "sqrtPriceX96 : {}", state.sqrt_price_x96)?;
            writeln!(f, "tick         : {}", state.tick)?;
            writeln!(f, "protocolFee  : {}", state.protocol_fee)?;
            writeln!(f, "lpFee        : {}", state.lp_fee)?;
            writeln!(f)?;
        }

        writeln!(
            f,
            "price of token0 in value of token1 : {}",
            self.token0_in_token1
        )?;
        writeln!(
            f,
            "price of token1 in value of token0 : {}",
            self.token1_in_token0
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "price of token0 in value of token1 in lowest decimal : {}",
            self.token0_in_token1_smallest_unit
        )?;
        writeln!(
            f,
            "price of token1 in value of token0 in lowest decimal : {}",
            self.token1_in_token0_smallest_unit
        )
    }
}

/// Result of the `get-token-balances` task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub account: Address,
    pub token0: TokenBalanceReport,
    pub token1: TokenBalanceReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceReport {
    pub public: String,
    pub encrypted_handle: String,
}

impl From<TokenBalance> for TokenBalanceReport {
    fn from(balance: TokenBalance) -> Self {
        Self {
            public: balance.public.to_string(),
            encrypted_handle: format_handle(balance.encrypted_handle),
        }
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "account : {:?}", self.account)?;
        writeln!(f)?;
        writeln!(f, "user token0 public balance : {}", self.token0.public)?;
        writeln!(f, "user token1 public balance : {}", self.token1.public)?;
        writeln!(f)?;
        writeln!(
            f,
            "user token0 encrypted balance handle : {}",
            self.token0.encrypted_handle
        )?;
        writeln!(
            f,
            "user token1 encrypted balance handle : {}",
            self.token1.encrypted_handle
        )
    }
}

/// `-- Iceberg Hook Permissions --` listing
pub fn render_permissions(permissions: &HookPermissions) -> String {
    let mut out = String::from("-- Iceberg Hook Permissions --\n");
    for (name, enabled) in permissions.entries() {
        out.push_str(&format!(
            "{:<width$} : {}\n",
            name,
            enabled,
            width = PERMISSION_LABEL_WIDTH
        ));
    }
    out
}

fn format_handle(handle: U256) -> String {
    let mut word = [0u8; 32];
    handle.to_big_endian(&mut word);
    format!("0x{}", hex::encode(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iceberg_amm::{PriceConversion, SqrtPriceX96};

    fn sepolia_report(with_state: bool) -> ExchangeRateReport {
        let price: SqrtPriceX96 = "81616034954994713222607626487".parse().unwrap();
        let scaled = PriceConversion::default()
            .derive_exchange_rate(&price, AssetDecimals::new(18, 18))
            .unwrap();
        let state = with_state.then(|| {
            PoolStateReport::from(&Slot0 {
                sqrt_price_x96: price.clone(),
                tick: 594,
                protocol_fee: 0,
                lp_fee: 3000,
            })
        });
        ExchangeRateReport::new("0x3fea".to_string(), state, &scaled)
    }

    #[test]
    fn test_render_exchange_rate_lines() {
        let text = sepolia_report(true).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines.contains(&"---- Current Pool State ----"));
        assert!(lines.contains(&"sqrtPriceX96 : 81616034954994713222607626487"));
        assert!(lines.contains(&"tick         : 594"));
        assert!(lines.contains(&"lpFee        : 3000"));
        assert!(lines.contains(&"price of token0 in value of token1 : 1.061186745504384975"));
        assert!(lines.contains(&"price of token1 in value of token0 : 0.942341208308908205"));
        assert!(lines.contains(
            &"price of token0 in value of token1 in lowest decimal : 1061186745504384975"
        ));
        assert!(lines.contains(
            &"price of token1 in value of token0 in lowest decimal : 942341208308908205"
        ));
    }

    #[test]
    fn test_render_without_pool_state() {
        let text = sepolia_report(false).to_string();
        assert!(!text.contains("Current Pool State"));
        assert!(text.starts_with("price of token0 in value of token1 : "));
    }

    #[test]
    fn test_exchange_rate_json() {
        let json = serde_json::to_value(sepolia_report(true)).unwrap();
        assert_eq!(json["token0InToken1"], "1.061186745504384975");
        assert_eq!(json["token1InToken0SmallestUnit"], "942341208308908205");
        assert_eq!(json["decimals"]["decimals0"], 18);
        assert_eq!(json["poolState"]["lpFee"], 3000);
    }

    #[test]
    fn test_render_permissions_aligned() {
        let mut flags = [false; 14];
        flags[6] = true;
        let text = render_permissions(&HookPermissions::from_flags(flags));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "-- Iceberg Hook Permissions --");
        assert_eq!(lines[1], "beforeInitialize                : false");
        assert_eq!(lines[7], "beforeSwap                      : true");
        assert_eq!(lines[14], "afterRemoveLiquidityReturnDelta : false");
    }

    #[test]
    fn test_render_balances() {
        let report = BalanceReport {
            account: Address::zero(),
            token0: TokenBalance {
                public: U256::from(1_000u64),
                encrypted_handle: U256::from(0xabu64),
            }
            .into(),
            token1: TokenBalance {
                public: U256::zero(),
                encrypted_handle: U256::zero(),
            }
            .into(),
        };
        let text = report.to_string();

        assert!(text.contains("user token0 public balance : 1000"));
        assert!(text.contains("user token1 public balance : 0"));
        assert!(text.contains(&format!(
            "user token0 encrypted balance handle : 0x{}ab",
            "0".repeat(62)
        )));
    }
}
