//! Exchange rates between the two pool assets
//!
//! `ExchangeRate` holds both directions in whole units with arbitrary
//! precision. `ScaledRate` holds the same figures floored into the smallest
//! unit of each quote asset, which is what gets compared against on-chain
//! amounts.

use std::cmp::max;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint, Sign};

use crate::decimals::AssetDecimals;
use crate::error::{PriceError, Result, MAX_PRECISION};

/// Both directions of a pool price in whole units
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRate {
    /// Units of token1 paid for one whole token0
    pub rate0in1: BigDecimal,
    /// Units of token0 paid for one whole token1
    pub rate1in0: BigDecimal,
    pub decimals: AssetDecimals,
}

/// Exchange rates floored into the smallest unit of the quote asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledRate {
    /// `floor(rate0in1 * 10^decimals1)`
    pub rate0in1: BigUint,
    /// `floor(rate1in0 * 10^decimals0)`
    pub rate1in0: BigUint,
    pub decimals: AssetDecimals,
}

impl ExchangeRate {
    /// Build both directions from a raw smallest-unit ratio of token0 in token1
    ///
    /// `precision` is the minimum number of significant digits kept by the
    /// reciprocal. The reciprocal is truncated, never rounded, and always keeps
    /// at least `decimals0` fractional digits so flooring it into token0 units
    /// gives the exact answer.
    pub fn from_price_ratio(
        ratio: &BigDecimal,
        decimals: AssetDecimals,
        precision: u64,
    ) -> Result<Self> {
        if ratio.sign() == Sign::Minus {
            return Err(PriceError::invalid("price ratio must be non-negative"));
        }

        let rate0in1 = decimals.rebase(ratio);
        let rate1in0 = reciprocal(&rate0in1, precision, i64::from(decimals.decimals0))?;

        Ok(Self {
            rate0in1,
            rate1in0,
            decimals,
        })
    }

    /// The same pool with token0 and token1 exchanged
    pub fn inverse(&self) -> Self {
        Self {
            rate0in1: self.rate1in0.clone(),
            rate1in0: self.rate0in1.clone(),
            decimals: self.decimals.swapped(),
        }
    }

    /// Floor both rates into the quote asset's smallest unit
    pub fn scaled(&self) -> Result<ScaledRate> {
        Ok(ScaledRate {
            rate0in1: scale_to_smallest_unit(&self.rate0in1, self.decimals.decimals1)?,
            rate1in0: scale_to_smallest_unit(&self.rate1in0, self.decimals.decimals0)?,
            decimals: self.decimals,
        })
    }
}

impl ScaledRate {
    /// `rate0in1` rendered with `decimals1` fractional digits
    pub fn rate0in1_fixed(&self) -> String {
        format_fixed(&self.rate0in1, self.decimals.decimals1)
    }

    /// `rate1in0` rendered with `decimals0` fractional digits
    pub fn rate1in0_fixed(&self) -> String {
        format_fixed(&self.rate1in0, self.decimals.decimals0)
    }
}

/// `1 / value`, truncated, with at least `precision` significant digits and
/// at least `min_scale` fractional digits
///
/// `precision` above [`MAX_PRECISION`] is rejected.
pub fn reciprocal(value: &BigDecimal, precision: u64, min_scale: i64) -> Result<BigDecimal> {
    match value.sign() {
        Sign::NoSign => return Err(PriceError::DivisionByZero("reciprocal of a zero rate")),
        Sign::Minus => return Err(PriceError::invalid("rate must be positive")),
        Sign::Plus => {}
    }

    // value = digits * 10^-scale, so 1 / value = 10^scale / digits
    let (digits, scale) = value.as_bigint_and_exponent();
    if precision > MAX_PRECISION {
        return Err(PriceError::invalid(format!(
            "precision of {} significant digits exceeds the maximum of {}",
            precision, MAX_PRECISION
        )));
    }
    let digit_count = i64::try_from(digits.magnitude().to_str_radix(10).len())
        .map_err(|_| PriceError::invalid("rate has too many digits"))?;
    let precision = i64::try_from(precision)
        .map_err(|_| PriceError::invalid(format!("precision {} is out of range", precision)))?;

    // The quotient lands near 10^(scale - digit_count), so this many
    // fractional digits leaves at least `precision` significant ones.
    let wanted = precision
        .checked_add(digit_count)
        .and_then(|digits| digits.checked_sub(scale))
        .ok_or_else(|| PriceError::invalid("reciprocal scale is out of range"))?;
    let result_scale = max(min_scale, wanted);
    let exponent = scale
        .checked_add(result_scale)
        .ok_or_else(|| PriceError::invalid("reciprocal scale is out of range"))?;
    let numerator = ten_pow(exponent)?;

    Ok(BigDecimal::new(numerator / digits, result_scale))
}

/// `floor(rate * 10^decimals)`; negative rates are rejected
pub fn scale_to_smallest_unit(rate: &BigDecimal, decimals: u8) -> Result<BigUint> {
    if rate.sign() == Sign::Minus {
        return Err(PriceError::invalid("cannot scale a negative rate"));
    }

    let (digits, scale) = rate.as_bigint_and_exponent();
    let shift = i64::from(decimals)
        .checked_sub(scale)
        .ok_or_else(|| PriceError::invalid("rate scale is out of range"))?;
    let scaled = if shift >= 0 {
        digits * ten_pow(shift)?
    } else {
        // BigInt division truncates toward zero, which is floor for non-negative values
        let shift = shift
            .checked_neg()
            .ok_or_else(|| PriceError::invalid("rate scale is out of range"))?;
        digits / ten_pow(shift)?
    };

    Ok(scaled.into_parts().1)
}

/// Render a smallest-unit integer as a fixed-point string with `decimals` places
pub fn format_fixed(scaled: &BigUint, decimals: u8) -> String {
    let digits = scaled.to_str_radix(10);
    let places = usize::from(decimals);
    if places == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = places + 1);
    let (whole, fraction) = padded.split_at(padded.len() - places);
    format!("{}.{}", whole, fraction)
}

fn ten_pow(exponent: i64) -> Result<BigInt> {
    let exponent = u32::try_from(exponent).map_err(|_| {
        PriceError::invalid(format!("power of ten 10^{} is out of range", exponent))
    })?;
    Ok(BigInt::from(10u8).pow(exponent))
}
