use std::collections::HashMap;

use async_trait::async_trait;

use super::EntityStore;

/// In-process entity store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: HashMap<(&'static str, String), serde_json::Value>,
    checkpoints: HashMap<u64, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load_raw(&self, kind: &'static str, id: &str) -> eyre::Result<Option<serde_json::Value>> {
        Ok(self.entities.get(&(kind, id.to_string())).cloned())
    }

    async fn save_raw(
        &mut self,
        kind: &'static str,
        id: &str,
        data: serde_json::Value,
    ) -> eyre::Result<()> {
        self.entities.insert((kind, id.to_string()), data);
        Ok(())
    }

    async fn count(&self, kind: &'static str) -> eyre::Result<u64> {
        Ok(self.entities.keys().filter(|(k, _)| *k == kind).count() as u64)
    }

    async fn last_indexed_block(&self, chain_id: u64) -> eyre::Result<Option<u64>> {
        Ok(self.checkpoints.get(&chain_id).copied())
    }

    async fn set_last_indexed_block(&mut self, chain_id: u64, block_number: u64) -> eyre::Result<()> {
        self.checkpoints.insert(chain_id, block_number);
        Ok(())
    }
}
