use alloy::primitives::{Address, B256, U256};

/// Indexed parameters of an ERC-20 `Transfer(address,address,uint256)` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTransaction {
    pub hash: B256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferBlock {
    /// Block time in seconds since the epoch.
    pub timestamp: u64,
    pub number: u64,
}

/// A single Transfer log as handed to the mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    /// The token contract that emitted the log.
    pub address: Address,
    pub params: TransferParams,
    pub transaction: TransferTransaction,
    /// Position of the log within its transaction's block.
    pub log_index: u64,
    pub block: TransferBlock,
}
