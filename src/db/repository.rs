use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::store::EntityStore;

/// Postgres-backed entity store.
///
/// Every entity kind shares the `entities` table as a JSONB document keyed by
/// `(kind, id)`; the driver checkpoint lives in `indexer_state`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, then bring the schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> eyre::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| eyre::eyre!("Failed to connect to database: {}", e))?;

        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| eyre::eyre!("Failed to run migrations: {}", e))?;

        tracing::info!("Database migrations complete");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn load_raw(&self, kind: &'static str, id: &str) -> eyre::Result<Option<serde_json::Value>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT data FROM entities WHERE kind = $1 AND id = $2")
                .bind(kind)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(data,)| data))
    }

    /// Upsert an entity document.
    async fn save_raw(
        &mut self,
        kind: &'static str,
        id: &str,
        data: serde_json::Value,
    ) -> eyre::Result<()> {
        sqlx::query(
            "INSERT INTO entities (kind, id, data, updated_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (kind, id) DO UPDATE
             SET data = EXCLUDED.data, updated_at = NOW()",
        )
        .bind(kind)
        .bind(id)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count(&self, kind: &'static str) -> eyre::Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entities WHERE kind = $1")
            .bind(kind)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn last_indexed_block(&self, chain_id: u64) -> eyre::Result<Option<u64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT last_indexed_block FROM indexer_state WHERE chain_id = $1",
        )
        .bind(chain_id as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(b,)| b as u64))
    }

    /// Upsert the indexer checkpoint for a chain.
    async fn set_last_indexed_block(&mut self, chain_id: u64, block_number: u64) -> eyre::Result<()> {
        sqlx::query(
            "INSERT INTO indexer_state (chain_id, last_indexed_block, updated_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (chain_id) DO UPDATE
             SET last_indexed_block = $2, updated_at = NOW()",
        )
        .bind(chain_id as i64)
        .bind(block_number as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
