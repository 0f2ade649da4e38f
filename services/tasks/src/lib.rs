//! # Iceberg Tasks
//!
//! Read-side tooling for the Iceberg confidential limit-order pool on
//! Uniswap v4: pool price and exchange rates, hook permissions and token
//! balances.
//!
//! Chain access goes through [`chain::PoolReader`]; price arithmetic is
//! delegated to [`iceberg_amm`].

pub mod chain;
pub mod permissions;
pub mod pool_key;
pub mod report;
pub mod tasks;

pub use chain::{ChainClient, PoolReader, Slot0, TokenBalance};
pub use permissions::HookPermissions;
pub use pool_key::{format_pool_id, parse_pool_id, PoolId, PoolKey, PoolKeyError};
pub use tasks::{pool_id, pool_key, DecimalOverrides, Tasks};
