use alloy::primitives::{Address, U256};
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;
use std::collections::HashSet;

use crate::mapping::{TransferBlock, TransferEvent, TransferParams, TransferTransaction};

// Generate the Transfer event ABI using alloy's sol! macro.
// This gives us Transfer::SIGNATURE_HASH for topic matching.
sol! {
    event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Attempt to decode a log as an ERC-20 Transfer event.
///
/// Returns `None` if:
/// - The log's contract address is not in the watched set
/// - The log doesn't match the Transfer event signature
/// - The log lacks a transaction hash, block number or log index (pending logs)
/// - Decoding fails (malformed log)
///
/// `block_timestamp` is used when the node did not attach one to the log.
pub fn decode_transfer_log(
    log: &Log,
    watched_tokens: &HashSet<Address>,
    block_timestamp: u64,
) -> Option<TransferEvent> {
    let inner = &log.inner;

    if !watched_tokens.contains(&inner.address) {
        return None;
    }

    // We need exactly 3 topics (signature + from + to) and 32 bytes of data (value).
    // ERC-721 Transfer shares topic[0] but indexes the token id as a 4th topic.
    let topics = inner.data.topics();
    if topics.len() != 3 || topics[0] != Transfer::SIGNATURE_HASH {
        return None;
    }

    let from = Address::from_word(topics[1]);
    let to = Address::from_word(topics[2]);

    let data = inner.data.data.as_ref();
    if data.len() < 32 {
        return None;
    }
    let value = U256::from_be_slice(&data[..32]);

    Some(TransferEvent {
        address: inner.address,
        params: TransferParams { from, to, value },
        transaction: TransferTransaction {
            hash: log.transaction_hash?,
        },
        log_index: log.log_index?,
        block: TransferBlock {
            timestamp: log.block_timestamp.unwrap_or(block_timestamp),
            number: log.block_number?,
        },
    })
}
