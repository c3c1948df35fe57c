use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_SYMBOL: &str = "Unknown";
pub const DEFAULT_DECIMALS: u8 = 18;

/// Entity id for an address: lowercase hex with a `0x` prefix.
pub fn address_id(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Entity id for a transfer: `<tx hash>-<log index>`.
pub fn transfer_id(tx_hash: &B256, log_index: u64) -> String {
    format!("0x{}-{}", hex::encode(tx_hash), log_index)
}

/// ERC-20 contract metadata, captured once when the contract is first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

impl Token {
    /// A token with every metadata field at its fallback value.
    pub fn unknown(address: &Address) -> Self {
        Self {
            id: address_id(address),
            name: UNKNOWN_NAME.to_string(),
            symbol: UNKNOWN_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            total_supply: U256::ZERO,
        }
    }
}

impl Entity for Token {
    const KIND: &'static str = "Token";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A token holder. `balance` mirrors the last successful `balanceOf` read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub balance: U256,
}

impl Account {
    pub fn new(address: &Address) -> Self {
        Self {
            id: address_id(address),
            balance: U256::ZERO,
        }
    }
}

impl Entity for Account {
    const KIND: &'static str = "Account";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One observed Transfer log. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    /// Account id of the sender.
    pub from: String,
    /// Account id of the receiver.
    pub to: String,
    pub value: U256,
    pub timestamp: u64,
    pub block_number: u64,
    pub transaction_hash: B256,
}

impl Entity for Transfer {
    const KIND: &'static str = "Transfer";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_id_is_lowercase_hex() {
        let address: Address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse().unwrap();
        assert_eq!(address_id(&address), "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    }

    #[test]
    fn test_transfer_id_includes_log_index() {
        let hash = B256::repeat_byte(0xab);
        let id = transfer_id(&hash, 7);
        assert!(id.starts_with("0xabab"));
        assert!(id.ends_with("-7"));
        assert_ne!(id, transfer_id(&hash, 8));
    }
}
