use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::ChainConfig;
use crate::indexer::decoder;
use crate::mapping::{self, RpcTokenReader, TokenReader};
use crate::store::EntityStore;
use crate::tokens::registry::build_watched_tokens;

/// Main entry point for a chain's indexer.
/// Catches up from the checkpoint (or `start_block`) to the chain tip, then
/// polls for new blocks until `shutdown` fires. A range that fails is retried
/// on the next poll without advancing the checkpoint.
pub async fn run_chain_indexer<S>(
    config: ChainConfig,
    store: &mut S,
    shutdown: CancellationToken,
) -> eyre::Result<()>
where
    S: EntityStore + ?Sized,
{
    tracing::info!(chain = %config.name, chain_id = config.chain_id, "Starting chain indexer");

    let watched_tokens = build_watched_tokens(&config);
    if watched_tokens.is_empty() {
        tracing::warn!(chain = %config.name, "No valid tokens configured, exiting");
        return Ok(());
    }

    let provider = ProviderBuilder::new()
        .connect_http(config.rpc_http.parse().map_err(|e| eyre::eyre!("Invalid RPC URL: {}", e))?);
    let reader = RpcTokenReader::new(provider.clone());

    // Determine where to resume from; with no checkpoint and no start block,
    // only blocks produced from now on are indexed.
    let last_indexed = store.last_indexed_block(config.chain_id).await?;
    let mut next_block = match last_indexed.map(|b| b + 1).or(config.start_block) {
        Some(block) => block,
        None => retry_rpc(&shutdown, || provider.get_block_number()).await? + 1,
    };

    tracing::info!(
        chain = %config.name,
        tokens = watched_tokens.len(),
        next_block,
        "Indexing from block"
    );

    let poll_interval = Duration::from_millis(config.poll_interval_ms);

    while !shutdown.is_cancelled() {
        let chain_tip = match retry_rpc(&shutdown, || provider.get_block_number()).await {
            Ok(n) => n,
            Err(e) => {
                if !shutdown.is_cancelled() {
                    tracing::error!(chain = %config.name, error = %e, "Failed to get block number");
                }
                0
            }
        };

        while next_block <= chain_tip && !shutdown.is_cancelled() {
            let to_block = batch_end(next_block, config.batch_size, chain_tip);

            let indexed = index_block_range(
                &config,
                &provider,
                &reader,
                &mut *store,
                &watched_tokens,
                next_block,
                to_block,
                &shutdown,
            )
            .await;

            if let Err(e) = indexed {
                if !shutdown.is_cancelled() {
                    tracing::error!(
                        chain = %config.name,
                        from = next_block,
                        to = to_block,
                        error = %e,
                        "Failed to index block range, retrying after poll interval"
                    );
                }
                break;
            }

            next_block = to_block + 1;
        }

        tokio::select! {
            _ = tokio::time::sleep(poll_interval) => {}
            _ = shutdown.cancelled() => {
                tracing::info!(chain = %config.name, "Shutdown received, stopping indexer");
            }
        }
    }

    tracing::info!(chain = %config.name, next_block, "Chain indexer stopped");
    Ok(())
}

/// Last block of the batch starting at `from_block`, capped at the chain tip.
fn batch_end(from_block: u64, batch_size: u64, chain_tip: u64) -> u64 {
    from_block
        .saturating_add(batch_size.saturating_sub(1))
        .min(chain_tip)
}

/// Fetch Transfer logs and block timestamps for `[from_block, to_block]`,
/// then apply them with [`apply_logs`].
#[allow(clippy::too_many_arguments)]
async fn index_block_range<P, R, S>(
    config: &ChainConfig,
    provider: &P,
    reader: &R,
    store: &mut S,
    watched_tokens: &HashSet<Address>,
    from_block: u64,
    to_block: u64,
    shutdown: &CancellationToken,
) -> eyre::Result<()>
where
    P: Provider,
    R: TokenReader + ?Sized,
    S: EntityStore + ?Sized,
{
    let filter = Filter::new()
        .address(watched_tokens.iter().copied().collect::<Vec<_>>())
        .event("Transfer(address,address,uint256)")
        .from_block(from_block)
        .to_block(to_block);

    let logs = retry_rpc(shutdown, || provider.get_logs(&filter)).await?;

    // Fetch timestamps only for blocks whose logs came without one
    let mut block_timestamps: HashMap<u64, u64> = HashMap::new();
    for log in &logs {
        let Some(block_num) = log.block_number else {
            continue;
        };
        if log.block_timestamp.is_some() || block_timestamps.contains_key(&block_num) {
            continue;
        }

        let block = retry_rpc(shutdown, || async move {
            provider.get_block_by_number(BlockNumberOrTag::Number(block_num)).await
        })
        .await?
        .ok_or_else(|| eyre::eyre!("Block {} not found", block_num))?;

        block_timestamps.insert(block_num, block.header.timestamp);
    }

    let transfers = apply_logs(
        config.chain_id,
        reader,
        store,
        watched_tokens,
        logs,
        &block_timestamps,
        to_block,
    )
    .await?;

    tracing::info!(
        chain = %config.name,
        from = from_block,
        to = to_block,
        transfers,
        "Indexed block range"
    );

    Ok(())
}

/// Hand a range's logs to the mapper one at a time in `(block, log index)`
/// order, then checkpoint `to_block`. Returns the number of transfers mapped.
///
/// Logs from unwatched contracts or with another signature are skipped. A log
/// whose block time is neither attached nor in `block_timestamps` fails the
/// range. The checkpoint only moves once every log has been mapped.
pub async fn apply_logs<R, S>(
    chain_id: u64,
    reader: &R,
    store: &mut S,
    watched_tokens: &HashSet<Address>,
    mut logs: Vec<Log>,
    block_timestamps: &HashMap<u64, u64>,
    to_block: u64,
) -> eyre::Result<usize>
where
    R: TokenReader + ?Sized,
    S: EntityStore + ?Sized,
{
    logs.sort_by_key(|log| (log.block_number, log.log_index));

    let mut transfers = 0;
    for log in &logs {
        let timestamp = log
            .block_timestamp
            .or_else(|| log.block_number.and_then(|n| block_timestamps.get(&n).copied()))
            .ok_or_else(|| eyre::eyre!("No timestamp for block {:?}", log.block_number))?;

        let Some(event) = decoder::decode_transfer_log(log, watched_tokens, timestamp) else {
            continue;
        };

        mapping::handle_transfer(&mut *store, reader, &event).await?;
        transfers += 1;
    }

    store.set_last_indexed_block(chain_id, to_block).await?;
    Ok(transfers)
}

/// Retry an async operation with exponential backoff.
/// Handles transient RPC errors (rate limits, network issues). Backoff sleeps
/// end early when `shutdown` fires.
pub async fn retry_rpc<F, Fut, T, E>(shutdown: &CancellationToken, mut f: F) -> eyre::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = Duration::from_millis(500);
    let max_retries = 5;

    for attempt in 0..max_retries {
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "RPC call failed, retrying..."
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.cancelled() => {
                        return Err(eyre::eyre!("RPC retry cancelled by shutdown: {}", e));
                    }
                }
                delay = std::cmp::min(delay * 2, Duration::from_secs(30));
            }
        }
    }

    // Final attempt, propagate the error
    f().await.map_err(|e| eyre::eyre!("RPC call failed after {} retries: {}", max_retries, e))
}
