//! Scripted [`TokenReader`] shared by the mapper and driver tests.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::reader::{CallFailed, TokenReader};

/// Reader answering from fixed values; `None` or a missing balance means the call reverts.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub total_supply: Option<U256>,
    /// Balance per holder, whatever block is asked for.
    pub balances: HashMap<Address, U256>,
    /// Balance per `(holder, block)`, checked before `balances`.
    pub balances_at: HashMap<(Address, u64), U256>,
    pub metadata_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    /// Block number of every read, in call order.
    pub blocks: Mutex<Vec<u64>>,
}

impl ScriptedReader {
    pub fn reverting() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, holder: Address, balance: u64) -> Self {
        self.balances.insert(holder, U256::from(balance));
        self
    }

    pub fn with_balance_at(mut self, holder: Address, block: u64, balance: u64) -> Self {
        self.balances_at.insert((holder, block), U256::from(balance));
        self
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn blocks(&self) -> Vec<u64> {
        self.blocks.lock().unwrap().clone()
    }

    fn record_metadata(&self, block: u64) {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.blocks.lock().unwrap().push(block);
    }
}

fn reverted() -> CallFailed {
    CallFailed::Reverted("execution reverted".to_string())
}

#[async_trait]
impl TokenReader for ScriptedReader {
    async fn name(&self, _token: Address, block: u64) -> Result<String, CallFailed> {
        self.record_metadata(block);
        self.name.clone().ok_or_else(reverted)
    }

    async fn symbol(&self, _token: Address, block: u64) -> Result<String, CallFailed> {
        self.record_metadata(block);
        self.symbol.clone().ok_or_else(reverted)
    }

    async fn decimals(&self, _token: Address, block: u64) -> Result<u8, CallFailed> {
        self.record_metadata(block);
        self.decimals.ok_or_else(reverted)
    }

    async fn total_supply(&self, _token: Address, block: u64) -> Result<U256, CallFailed> {
        self.record_metadata(block);
        self.total_supply.ok_or_else(reverted)
    }

    async fn balance_of(
        &self,
        _token: Address,
        holder: Address,
        block: u64,
    ) -> Result<U256, CallFailed> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.blocks.lock().unwrap().push(block);
        self.balances_at
            .get(&(holder, block))
            .or_else(|| self.balances.get(&holder))
            .copied()
            .ok_or_else(reverted)
    }
}
