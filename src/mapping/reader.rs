use alloy::eips::BlockId;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::sol;
use async_trait::async_trait;

// ERC-20 read-only surface. `#[sol(rpc)]` generates a contract instance type
// whose calls go through any alloy `Provider`.
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// Why a contract read produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallFailed {
    /// The node answered but the call reverted, returned no data, or could not be decoded.
    #[error("call reverted: {0}")]
    Reverted(String),
    /// The node could not be reached or the request failed.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<alloy::contract::Error> for CallFailed {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(e) if !e.is_error_resp() => {
                CallFailed::Transport(e.to_string())
            }
            other => CallFailed::Reverted(other.to_string()),
        }
    }
}

/// Read access to ERC-20 contract state, one call per method.
///
/// Every read is evaluated against the state at the end of `block`, the block
/// that emitted the event being handled.
#[async_trait]
pub trait TokenReader: Send + Sync {
    async fn name(&self, token: Address, block: u64) -> Result<String, CallFailed>;

    async fn symbol(&self, token: Address, block: u64) -> Result<String, CallFailed>;

    async fn decimals(&self, token: Address, block: u64) -> Result<u8, CallFailed>;

    async fn total_supply(&self, token: Address, block: u64) -> Result<U256, CallFailed>;

    async fn balance_of(
        &self,
        token: Address,
        holder: Address,
        block: u64,
    ) -> Result<U256, CallFailed>;
}

/// [`TokenReader`] backed by `eth_call` through an alloy provider.
#[derive(Debug, Clone)]
pub struct RpcTokenReader<P> {
    provider: P,
}

impl<P> RpcTokenReader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P> TokenReader for RpcTokenReader<P>
where
    P: Provider + Clone + 'static,
{
    async fn name(&self, token: Address, block: u64) -> Result<String, CallFailed> {
        let contract = IERC20::new(token, self.provider.clone());
        Ok(contract.name().block(BlockId::number(block)).call().await?)
    }

    async fn symbol(&self, token: Address, block: u64) -> Result<String, CallFailed> {
        let contract = IERC20::new(token, self.provider.clone());
        Ok(contract.symbol().block(BlockId::number(block)).call().await?)
    }

    async fn decimals(&self, token: Address, block: u64) -> Result<u8, CallFailed> {
        let contract = IERC20::new(token, self.provider.clone());
        Ok(contract.decimals().block(BlockId::number(block)).call().await?)
    }

    async fn total_supply(&self, token: Address, block: u64) -> Result<U256, CallFailed> {
        let contract = IERC20::new(token, self.provider.clone());
        Ok(contract.totalSupply().block(BlockId::number(block)).call().await?)
    }

    async fn balance_of(
        &self,
        token: Address,
        holder: Address,
        block: u64,
    ) -> Result<U256, CallFailed> {
        let contract = IERC20::new(token, self.provider.clone());
        Ok(contract
            .balanceOf(holder)
            .block(BlockId::number(block))
            .call()
            .await?)
    }
}
