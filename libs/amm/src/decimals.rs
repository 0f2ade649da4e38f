//! Token decimal configuration and rebasing between smallest and whole units

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::{PriceError, Result};

/// Decimal places of the two pool assets (ERC-20 `decimals()` is a `uint8`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetDecimals {
    pub decimals0: u8,
    pub decimals1: u8,
}

impl AssetDecimals {
    pub const fn new(decimals0: u8, decimals1: u8) -> Self {
        Self {
            decimals0,
            decimals1,
        }
    }

    /// Same pool seen with token0 and token1 exchanged
    pub const fn swapped(self) -> Self {
        Self::new(self.decimals1, self.decimals0)
    }

    /// `decimals1 - decimals0`, the power of ten separating the two units
    pub fn exponent(self) -> i64 {
        i64::from(self.decimals1) - i64::from(self.decimals0)
    }

    /// `10^decimals1 / 10^decimals0`, exact
    pub fn decimal_factor(self) -> BigDecimal {
        BigDecimal::new(BigInt::from(1u8), -self.exponent())
    }

    /// Move a smallest-unit ratio into whole-unit terms: `ratio / decimal_factor`
    pub fn rebase(self, ratio: &BigDecimal) -> BigDecimal {
        let (digits, scale) = ratio.as_bigint_and_exponent();
        BigDecimal::new(digits, scale + self.exponent())
    }
}

impl TryFrom<(i64, i64)> for AssetDecimals {
    type Error = PriceError;

    fn try_from((decimals0, decimals1): (i64, i64)) -> Result<Self> {
        Ok(Self::new(
            checked_decimals("decimals0", decimals0)?,
            checked_decimals("decimals1", decimals1)?,
        ))
    }
}

fn checked_decimals(name: &str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        PriceError::invalid(format!("{} must be within 0..=255, got {}", name, value))
    })
}

/// Parse a single decimal count such as a CLI argument
pub fn parse_decimals(input: &str) -> Result<u8> {
    let value = i64::from_str(input.trim()).map_err(|_| {
        PriceError::invalid(format!("decimal count '{}' is not an integer", input.trim()))
    })?;
    checked_decimals("decimals", value)
}

impl fmt::Display for AssetDecimals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.decimals0, self.decimals1)
    }
}
