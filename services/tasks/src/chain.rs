//! On-chain reads used by the tasks
//!
//! Everything here is a thin pass-through to the RPC provider. The
//! [`PoolReader`] trait is the seam the task runners depend on, so they can be
//! exercised without a node.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::abi::parse_abi;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use iceberg_amm::SqrtPriceX96;
use tracing::{debug, warn};

use crate::permissions::{HookPermissions, GET_HOOK_PERMISSIONS};
use crate::pool_key::{format_pool_id, PoolId};

/// Human readable ABI of the Uniswap v4 `StateView` lens
pub const STATE_VIEW_ABI: &[&str] = &[
    "function getSlot0(bytes32 poolId) external view returns (uint160 sqrtPriceX96, int24 tick, uint24 protocolFee, uint24 lpFee)",
];

// HybridFHERC20 keeps a public ERC-20 balance next to an encrypted one
abigen!(
    HybridFheErc20,
    r#"[
        function balanceOf(address account) external view returns (uint256)
        function encBalances(address account) external view returns (uint256)
        function decimals() external view returns (uint8)
    ]"#
);

/// Current pool state as returned by `StateView.getSlot0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: SqrtPriceX96,
    pub tick: i32,
    pub protocol_fee: u32,
    pub lp_fee: u32,
}

/// Public balance and encrypted balance handle of one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalance {
    pub public: U256,
    /// Ciphertext handle; unsealing it requires the CoFHE service
    pub encrypted_handle: U256,
}

/// Read access to the pool, its tokens and the Iceberg hook
#[async_trait]
pub trait PoolReader: Send + Sync {
    async fn slot0(&self, pool_id: PoolId) -> Result<Slot0>;

    async fn token_decimals(&self, token: Address) -> Result<u8>;

    async fn hook_permissions(&self) -> Result<HookPermissions>;

    async fn token_balance(&self, token: Address, account: Address) -> Result<TokenBalance>;
}

/// JSON-RPC backed [`PoolReader`]
pub struct ChainClient {
    provider: Arc<Provider<Http>>,
    state_view: Address,
    iceberg: Address,
}

impl ChainClient {
    pub fn new(rpc_url: &str, state_view: Address, iceberg: Address) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("Invalid RPC URL: {}", rpc_url))?;

        Ok(Self {
            provider: Arc::new(provider),
            state_view,
            iceberg,
        })
    }

    /// Warn when the node serves a different chain than configured
    pub async fn check_chain_id(&self, expected: u64) -> Result<()> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .context("Failed to query chain id")?;

        if chain_id != U256::from(expected) {
            warn!(
                "RPC endpoint reports chain id {}, configuration expects {}",
                chain_id, expected
            );
        }
        Ok(())
    }

    fn token(&self, address: Address) -> HybridFheErc20<Provider<Http>> {
        HybridFheErc20::new(address, Arc::clone(&self.provider))
    }
}

#[async_trait]
impl PoolReader for ChainClient {
    async fn slot0(&self, pool_id: PoolId) -> Result<Slot0> {
        debug!("getSlot0({}) on {:?}", format_pool_id(&pool_id), self.state_view);

        let abi = parse_abi(STATE_VIEW_ABI).context("Invalid StateView ABI")?;
        let state_view = Contract::new(self.state_view, abi, Arc::clone(&self.provider));

        let (sqrt_price, tick, protocol_fee, lp_fee): (U256, i32, u32, u32) = state_view
            .method("getSlot0", pool_id)?
            .call()
            .await
            .context("StateView.getSlot0 call failed")?;

        let mut word = [0u8; 32];
        sqrt_price.to_big_endian(&mut word);

        Ok(Slot0 {
            sqrt_price_x96: SqrtPriceX96::from_be_bytes(&word)?,
            tick,
            protocol_fee,
            lp_fee,
        })
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        self.token(token)
            .decimals()
            .call()
            .await
            .with_context(|| format!("decimals() call failed for {:?}", token))
    }

    async fn hook_permissions(&self) -> Result<HookPermissions> {
        let calldata = ethers::utils::id(GET_HOOK_PERMISSIONS).to_vec();
        let tx: TypedTransaction = TransactionRequest::new()
            .to(self.iceberg)
            .data(calldata)
            .into();

        let output = self
            .provider
            .call(&tx, None)
            .await
            .context("getHookPermissions() call failed")?;

        HookPermissions::decode(&output)
    }

    async fn token_balance(&self, token: Address, account: Address) -> Result<TokenBalance> {
        let contract = self.token(token);

        let public = contract
            .balance_of(account)
            .call()
            .await
            .with_context(|| format!("balanceOf() call failed for {:?}", token))?;
        let encrypted_handle = contract
            .enc_balances(account)
            .call()
            .await
            .with_context(|| format!("encBalances() call failed for {:?}", token))?;

        Ok(TokenBalance {
            public,
            encrypted_handle,
        })
    }
}
