//! sqrtPriceX96 to exchange rate conversion
//!
//! Pure and synchronous. Callers pass the precision and the token decimals
//! on every call, so one engine value can serve any number of pools.

use crate::decimals::AssetDecimals;
use crate::error::{PriceError, Result, MAX_PRECISION, MIN_PRECISION};
use crate::exchange_rate::{ExchangeRate, ScaledRate};
use crate::sqrt_price::SqrtPriceX96;

/// Significant digits used when nothing else is configured
pub const DEFAULT_PRECISION: u64 = 50;

/// Arithmetic settings for the conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceConfig {
    precision: u64,
}

impl PriceConfig {
    /// Reject precisions that cannot carry a squared uint160 price, and
    /// precisions above [`MAX_PRECISION`]
    pub fn new(precision: u64) -> Result<Self> {
        if precision < MIN_PRECISION {
            return Err(PriceError::PrecisionOverflow {
                requested: precision,
                minimum: MIN_PRECISION,
            });
        }
        if precision > MAX_PRECISION {
            return Err(PriceError::invalid(format!(
                "precision of {} significant digits exceeds the maximum of {}",
                precision, MAX_PRECISION
            )));
        }
        Ok(Self { precision })
    }

    /// Minimum significant digits kept by the reciprocal rate
    pub fn precision(&self) -> u64 {
        self.precision
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Price conversion engine
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceConversion {
    config: PriceConfig,
}

impl PriceConversion {
    pub fn new(config: PriceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> PriceConfig {
        self.config
    }

    /// Both directions of the pool price in whole units
    ///
    /// A zero price fails the whole call with [`PriceError::DivisionByZero`];
    /// the forward ratio alone is still available from
    /// [`SqrtPriceX96::price_ratio`].
    pub fn exchange_rate(
        &self,
        sqrt_price_x96: &SqrtPriceX96,
        decimals: AssetDecimals,
    ) -> Result<ExchangeRate> {
        if sqrt_price_x96.is_zero() {
            return Err(PriceError::DivisionByZero(
                "sqrtPriceX96 is zero, token1 has no price in token0",
            ));
        }

        ExchangeRate::from_price_ratio(
            &sqrt_price_x96.price_ratio(),
            decimals,
            self.config.precision,
        )
    }

    /// Both directions floored into the quote asset's smallest unit
    pub fn derive_exchange_rate(
        &self,
        sqrt_price_x96: &SqrtPriceX96,
        decimals: AssetDecimals,
    ) -> Result<ScaledRate> {
        self.exchange_rate(sqrt_price_x96, decimals)?.scaled()
    }
}

/// One-shot form of [`PriceConversion::derive_exchange_rate`]
pub fn derive_exchange_rate(
    sqrt_price_x96: &SqrtPriceX96,
    decimals: AssetDecimals,
    config: PriceConfig,
) -> Result<ScaledRate> {
    PriceConversion::new(config).derive_exchange_rate(sqrt_price_x96, decimals)
}
