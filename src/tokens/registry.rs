use alloy::primitives::Address;
use std::collections::HashSet;
use std::str::FromStr;

use crate::config::ChainConfig;

/// Build the set of watched token contracts for a chain.
/// Used by the decoder to quickly check if a log comes from a tracked token.
pub fn build_watched_tokens(config: &ChainConfig) -> HashSet<Address> {
    let mut set = HashSet::new();
    for token in &config.tokens {
        match Address::from_str(token) {
            Ok(address) => {
                set.insert(address);
            }
            Err(e) => {
                tracing::error!(
                    address = %token,
                    error = %e,
                    "Invalid token address in config, skipping"
                );
            }
        }
    }
    set
}
