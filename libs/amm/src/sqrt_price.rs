//! Uniswap sqrtPriceX96 fixed-point values
//!
//! A pool stores `sqrt(price) * 2^96` in a `uint160`. The raw price of token0
//! in token1 (both in smallest units) is therefore `sqrt² / 2^192`. Because the
//! denominator is a power of two the quotient has a finite decimal expansion,
//! so it is computed exactly as `sqrt² * 5^192 / 10^192`.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::{Num, Zero};

use crate::error::{PriceError, Result};

/// Number of fractional bits in the Q64.96 encoding
pub const RESOLUTION: u32 = 96;

/// Width of the on-chain `uint160` slot
pub const MAX_BITS: u64 = 160;

/// 2^96 as a decimal string, handy for tests and log output
pub const Q96_STR: &str = "79228162514264337593543950336";

/// Square-root price encoded with 96 fractional bits
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SqrtPriceX96(BigUint);

impl SqrtPriceX96 {
    /// Wrap a raw integer, rejecting anything that does not fit a `uint160`
    pub fn new(value: BigUint) -> Result<Self> {
        if value.bits() > MAX_BITS {
            return Err(PriceError::invalid(format!(
                "sqrtPriceX96 uses {} bits, at most {} allowed",
                value.bits(),
                MAX_BITS
            )));
        }
        Ok(Self(value))
    }

    /// Build from big-endian bytes such as an ABI-decoded `uint256` word
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        Self::new(BigUint::from_bytes_be(bytes))
    }

    /// `2^96`, the encoding of a 1:1 price
    pub fn one() -> Self {
        Self(BigUint::from(1u8) << RESOLUTION)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Raw price of token0 denominated in token1, `(sqrt / 2^96)^2`, exact
    pub fn price_ratio(&self) -> BigDecimal {
        let squared = &self.0 * &self.0;
        let numerator = squared * BigUint::from(5u8).pow(2 * RESOLUTION);
        BigDecimal::new(BigInt::from(numerator), i64::from(2 * RESOLUTION)).normalized()
    }
}

impl From<u128> for SqrtPriceX96 {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl FromStr for SqrtPriceX96 {
    type Err = PriceError;

    /// Accepts a decimal integer or a `0x`-prefixed hex integer
    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.starts_with('-') {
            return Err(PriceError::invalid(format!(
                "sqrtPriceX96 must be non-negative, got '{}'",
                trimmed
            )));
        }

        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => BigUint::from_str_radix(hex, 16),
            None => BigUint::from_str_radix(trimmed.trim_start_matches('+'), 10),
        };

        let value = parsed.map_err(|_| {
            PriceError::invalid(format!("'{}' is not an unsigned integer", trimmed))
        })?;
        Self::new(value)
    }
}

impl fmt::Display for SqrtPriceX96 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_encodes_unit_price() {
        let one = SqrtPriceX96::one();
        assert_eq!(one.to_string(), Q96_STR);
        assert_eq!(one.price_ratio(), BigDecimal::from(1));
    }

    #[test]
    fn test_price_ratio_is_exact() {
        // sqrt = 2^95 -> ratio = 1/4
        let half: SqrtPriceX96 = SqrtPriceX96::from(1u128 << 95);
        assert_eq!(half.price_ratio(), BigDecimal::from_str("0.25").unwrap());

        // sqrt = 3 -> ratio = 9 / 2^192, which needs all 192 fractional digits
        let tiny = SqrtPriceX96::from(3u128);
        let (digits, scale) = tiny.price_ratio().as_bigint_and_exponent();
        assert_eq!(scale, 192);
        assert_eq!(digits, BigInt::from(9u8) * BigInt::from(5u8).pow(192));
    }

    #[test]
    fn test_parse_decimal_and_hex() {
        let decimal: SqrtPriceX96 = "79228162514264337593543950336".parse().unwrap();
        let hex: SqrtPriceX96 = "0x1000000000000000000000000".parse().unwrap();
        assert_eq!(decimal, hex);
        assert_eq!(decimal, SqrtPriceX96::one());
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert!(matches!(
            "-1".parse::<SqrtPriceX96>(),
            Err(PriceError::InvalidInput(_))
        ));
        assert!(matches!(
            "1.5".parse::<SqrtPriceX96>(),
            Err(PriceError::InvalidInput(_))
        ));
        assert!(matches!(
            "".parse::<SqrtPriceX96>(),
            Err(PriceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_values_wider_than_uint160() {
        let max = (BigUint::from(1u8) << 160u32) - 1u8;
        assert!(SqrtPriceX96::new(max.clone()).is_ok());
        assert!(matches!(
            SqrtPriceX96::new(max + 1u8),
            Err(PriceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_be_bytes_matches_abi_word() {
        let mut word = [0u8; 32];
        word[19] = 1; // 2^96 in a big-endian uint256
        assert_eq!(SqrtPriceX96::from_be_bytes(&word).unwrap(), SqrtPriceX96::one());
    }

    #[test]
    fn test_zero_price_ratio_is_zero() {
        let zero = SqrtPriceX96::from(0u128);
        assert!(zero.is_zero());
        assert!(zero.price_ratio().is_zero());
    }
}
