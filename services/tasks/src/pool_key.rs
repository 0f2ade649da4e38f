//! Uniswap v4 pool keys and pool ids
//!
//! A v4 pool is identified by `keccak256(abi.encode(PoolKey))`, the value
//! `StateView.getSlot0` expects.

use ethers::abi::{self, Token};
use ethers::types::{Address, I256, U256};
use ethers::utils::keccak256;
use thiserror::Error;

/// Largest fee representable in a `uint24`
pub const MAX_FEE: u32 = 0x00FF_FFFF;
/// Tick spacing bounds enforced by the v4 pool manager
pub const MIN_TICK_SPACING: i32 = 1;
pub const MAX_TICK_SPACING: i32 = 32767;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolKeyError {
    #[error("currency0 {currency0:?} must sort below currency1 {currency1:?}")]
    CurrencyOrder { currency0: Address, currency1: Address },

    #[error("fee {0} does not fit in a uint24")]
    FeeOutOfRange(u32),

    #[error("tick spacing {0} outside 1..=32767")]
    TickSpacingOutOfRange(i32),

    #[error("invalid pool id '{0}': expected 32 hex-encoded bytes")]
    InvalidPoolId(String),
}

/// 32-byte pool identifier
pub type PoolId = [u8; 32];

/// Parameters that identify a v4 pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    /// Fee in hundredths of a bip
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

impl PoolKey {
    pub fn new(
        currency0: Address,
        currency1: Address,
        fee: u32,
        tick_spacing: i32,
        hooks: Address,
    ) -> Result<Self, PoolKeyError> {
        if currency0 >= currency1 {
            return Err(PoolKeyError::CurrencyOrder {
                currency0,
                currency1,
            });
        }
        if fee > MAX_FEE {
            return Err(PoolKeyError::FeeOutOfRange(fee));
        }
        if !(MIN_TICK_SPACING..=MAX_TICK_SPACING).contains(&tick_spacing) {
            return Err(PoolKeyError::TickSpacingOutOfRange(tick_spacing));
        }

        Ok(Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        })
    }

    /// `keccak256(abi.encode(currency0, currency1, fee, tickSpacing, hooks))`
    pub fn id(&self) -> PoolId {
        let encoded = abi::encode(&[
            Token::Address(self.currency0),
            Token::Address(self.currency1),
            Token::Uint(U256::from(self.fee)),
            Token::Int(I256::from(self.tick_spacing).into_raw()),
            Token::Address(self.hooks),
        ]);
        keccak256(encoded)
    }
}

/// Parse a `0x`-prefixed 32-byte hex pool id
pub fn parse_pool_id(input: &str) -> Result<PoolId, PoolKeyError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    hex::decode(digits)
        .ok()
        .and_then(|bytes| PoolId::try_from(bytes.as_slice()).ok())
        .ok_or_else(|| PoolKeyError::InvalidPoolId(trimmed.to_string()))
}

pub fn format_pool_id(id: &PoolId) -> String {
    format!("0x{}", hex::encode(id))
}
