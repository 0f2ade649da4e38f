//! Iceberg hook permission flags
//!
//! `getHookPermissions()` returns a `Hooks.Permissions` struct of 14 static
//! booleans, which ABI-encodes exactly like 14 separate `bool` return values.

use anyhow::{bail, Context, Result};
use ethers::abi::{self, ParamType, Token};
use serde::Serialize;

/// Solidity signature of the permissions getter
pub const GET_HOOK_PERMISSIONS: &str = "getHookPermissions()";

/// Flag names in ABI order
pub const PERMISSION_NAMES: [&str; 14] = [
    "beforeInitialize",
    "afterInitialize",
    "beforeAddLiquidity",
    "beforeRemoveLiquidity",
    "afterAddLiquidity",
    "afterRemoveLiquidity",
    "beforeSwap",
    "afterSwap",
    "beforeDonate",
    "afterDonate",
    "beforeSwapReturnDelta",
    "afterSwapReturnDelta",
    "afterAddLiquidityReturnDelta",
    "afterRemoveLiquidityReturnDelta",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookPermissions {
    pub before_initialize: bool,
    pub after_initialize: bool,
    pub before_add_liquidity: bool,
    pub before_remove_liquidity: bool,
    pub after_add_liquidity: bool,
    pub after_remove_liquidity: bool,
    pub before_swap: bool,
    pub after_swap: bool,
    pub before_donate: bool,
    pub after_donate: bool,
    pub before_swap_return_delta: bool,
    pub after_swap_return_delta: bool,
    pub after_add_liquidity_return_delta: bool,
    pub after_remove_liquidity_return_delta: bool,
}

impl HookPermissions {
    /// Decode the raw `eth_call` return data
    pub fn decode(data: &[u8]) -> Result<Self> {
        let types = vec![ParamType::Bool; PERMISSION_NAMES.len()];
        let tokens = abi::decode(&types, data)
            .context("Failed to decode getHookPermissions() return data")?;

        let mut flags = [false; 14];
        for (slot, token) in flags.iter_mut().zip(tokens) {
            match token {
                Token::Bool(value) => *slot = value,
                other => bail!("Unexpected token in hook permissions: {:?}", other),
            }
        }
        Ok(Self::from_flags(flags))
    }

    pub fn from_flags(flags: [bool; 14]) -> Self {
        let [
            before_initialize,
            after_initialize,
            before_add_liquidity,
            before_remove_liquidity,
            after_add_liquidity,
            after_remove_liquidity,
            before_swap,
            after_swap,
            before_donate,
            after_donate,
            before_swap_return_delta,
            after_swap_return_delta,
            after_add_liquidity_return_delta,
            after_remove_liquidity_return_delta,
        ] = flags;

        Self {
            before_initialize,
            after_initialize,
            before_add_liquidity,
            before_remove_liquidity,
            after_add_liquidity,
            after_remove_liquidity,
            before_swap,
            after_swap,
            before_donate,
            after_donate,
            before_swap_return_delta,
            after_swap_return_delta,
            after_add_liquidity_return_delta,
            after_remove_liquidity_return_delta,
        }
    }

    /// Flags in ABI order, matching [`PERMISSION_NAMES`]
    pub fn flags(&self) -> [bool; 14] {
        [
            self.before_initialize,
            self.after_initialize,
            self.before_add_liquidity,
            self.before_remove_liquidity,
            self.after_add_liquidity,
            self.after_remove_liquidity,
            self.before_swap,
            self.after_swap,
            self.before_donate,
            self.after_donate,
            self.before_swap_return_delta,
            self.after_swap_return_delta,
            self.after_add_liquidity_return_delta,
            self.after_remove_liquidity_return_delta,
        ]
    }

    /// `(name, enabled)` pairs in ABI order
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, bool)> {
        PERMISSION_NAMES.into_iter().zip(self.flags())
    }
}
