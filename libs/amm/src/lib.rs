//! # Iceberg AMM Library - Exact Pool Price Conversion
//!
//! ## Purpose
//!
//! Converts a Uniswap v4 pool's `sqrtPriceX96` into human readable exchange
//! rates for both directions of the pair, and into integer rates expressed in
//! each quote asset's smallest unit. Token decimals are applied as an exact
//! power-of-ten rebase, so pools between assets with different decimal counts
//! (WETH/USDC) price correctly.
//!
//! ## Integration Points
//!
//! - **Input Sources**: `sqrtPriceX96` from `StateView.getSlot0`, token decimals
//!   from configuration or ERC-20 `decimals()`
//! - **Output Destinations**: task reports, order sizing for the Iceberg hook
//! - **Precision**: exact squared ratio, reciprocal truncated to a configured
//!   number of significant digits (minimum 40)
//!
//! ## Arithmetic
//!
//! - `price_ratio = sqrt² / 2^192` is computed without any rounding
//! - `rate0in1 = price_ratio / 10^(decimals1 - decimals0)` is an exact shift
//! - `rate1in0 = 1 / rate0in1` is truncated, never rounded
//! - smallest-unit forms are `floor(rate * 10^decimals)`
//!
//! No floating point is used at any step.
//!
//! ## Example
//!
//! ```rust
//! use iceberg_amm::{AssetDecimals, PriceConversion, SqrtPriceX96};
//!
//! let sqrt_price: SqrtPriceX96 = "81616034954994713222607626487".parse()?;
//! let scaled = PriceConversion::default()
//!     .derive_exchange_rate(&sqrt_price, AssetDecimals::new(18, 18))?;
//!
//! assert_eq!(scaled.rate0in1_fixed(), "1.061186745504384975");
//! assert_eq!(scaled.rate1in0.to_string(), "942341208308908205");
//! # Ok::<(), iceberg_amm::PriceError>(())
//! ```

pub mod decimals;
pub mod engine;
pub mod error;
pub mod exchange_rate;
pub mod sqrt_price;

pub use decimals::{parse_decimals, AssetDecimals};
pub use engine::{derive_exchange_rate, PriceConfig, PriceConversion, DEFAULT_PRECISION};
pub use error::{PriceError, MAX_PRECISION, MIN_PRECISION};
pub use exchange_rate::{format_fixed, ExchangeRate, ScaledRate};
pub use sqrt_price::SqrtPriceX96;

/// Arbitrary precision types used in the public API
pub use bigdecimal::BigDecimal;
pub use num_bigint::BigUint;
