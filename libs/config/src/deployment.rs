//! Known Iceberg deployments

/// Sepolia testnet deployment
pub mod sepolia {
    pub const CHAIN_ID: u64 = 11155111;
    pub const RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

    /// Uniswap v4 `StateView` lens contract
    pub const STATE_VIEW: &str = "0xE1Dd9c3fA50EDB962E442f60DfBc432e24537E4C";
    /// Iceberg hook
    pub const ICEBERG: &str = "0x9c5c79E16f1366af6867c61919aCF8E1471290C0";

    /// HybridFHERC20 tokens of the Iceberg pool
    pub const TOKEN0: &str = "0x0eA00720cAA3b6A5d18683D09A75E8425934529c";
    pub const TOKEN1: &str = "0xBA131d183F67dD1B4252487681b598B6bC165D17";

    /// Pool fee in hundredths of a bip (0.3%)
    pub const POOL_FEE: u32 = 3000;
    pub const TICK_SPACING: i32 = 60;
}
