use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use token_subgraph::config::Config;
use token_subgraph::db::PgStore;
use token_subgraph::indexer::chain::run_chain_indexer;
use token_subgraph::store::MemoryStore;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=debug for per-transfer output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("Token subgraph indexer starting");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!(
        chain = %config.chain.name,
        tokens = config.chain.tokens.len(),
        "Configuration loaded from {}",
        config_path
    );

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received, stopping indexer...");
        signal.cancel();
    });

    match &config.database {
        Some(database) => {
            let mut store = PgStore::connect(database).await?;
            run_chain_indexer(config.chain, &mut store, shutdown).await?;
        }
        None => {
            tracing::warn!("No [database] configured, entities are kept in memory only");
            let mut store = MemoryStore::new();
            run_chain_indexer(config.chain, &mut store, shutdown).await?;
        }
    }

    tracing::info!("Token subgraph indexer stopped gracefully");
    Ok(())
}
