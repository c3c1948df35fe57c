pub mod memory;

use std::future::Future;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use memory::MemoryStore;

/// A record persisted in an [`EntityStore`], addressed by `(KIND, id)`.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Key-value storage for indexed entities plus the driver checkpoint.
///
/// Entities are stored as JSON documents so a single table (or map) can hold
/// every entity kind. Saving an existing `(kind, id)` replaces the document.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load_raw(&self, kind: &'static str, id: &str) -> eyre::Result<Option<serde_json::Value>>;

    async fn save_raw(
        &mut self,
        kind: &'static str,
        id: &str,
        data: serde_json::Value,
    ) -> eyre::Result<()>;

    /// Number of stored entities of one kind.
    async fn count(&self, kind: &'static str) -> eyre::Result<u64>;

    /// Last block fully handed to the mapper for a chain. `None` if never indexed.
    async fn last_indexed_block(&self, chain_id: u64) -> eyre::Result<Option<u64>>;

    async fn set_last_indexed_block(&mut self, chain_id: u64, block_number: u64) -> eyre::Result<()>;
}

/// Load and deserialize an entity.
pub async fn load<E, S>(store: &S, id: &str) -> eyre::Result<Option<E>>
where
    E: Entity,
    S: EntityStore + ?Sized,
{
    let Some(data) = store.load_raw(E::KIND, id).await? else {
        return Ok(None);
    };

    let entity = serde_json::from_value(data)
        .map_err(|e| eyre::eyre!("Corrupt {} entity '{}': {}", E::KIND, id, e))?;
    Ok(Some(entity))
}

/// Serialize and persist an entity under its own id.
pub async fn save<E, S>(store: &mut S, entity: &E) -> eyre::Result<()>
where
    E: Entity,
    S: EntityStore + ?Sized,
{
    let data = serde_json::to_value(entity)
        .map_err(|e| eyre::eyre!("Failed to encode {} entity '{}': {}", E::KIND, entity.id(), e))?;
    store.save_raw(E::KIND, entity.id(), data).await
}

/// Return the stored entity for `id`, or build one with `init`, persist it and return it.
///
/// `init` only runs when the entity is absent, so expensive construction
/// (chain reads for token metadata) happens once per id.
pub async fn get_or_create<E, S, F, Fut>(store: &mut S, id: &str, init: F) -> eyre::Result<E>
where
    E: Entity,
    S: EntityStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = E>,
{
    if let Some(existing) = load::<E, S>(store, id).await? {
        return Ok(existing);
    }

    let entity = init().await;
    save(store, &entity).await?;
    tracing::debug!(kind = E::KIND, id, "Created entity");
    Ok(entity)
}
