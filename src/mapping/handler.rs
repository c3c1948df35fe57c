use alloy::primitives::Address;

use crate::store::{self, EntityStore};

use super::entity::{
    address_id, transfer_id, Account, Token, Transfer, DEFAULT_DECIMALS, UNKNOWN_NAME,
    UNKNOWN_SYMBOL,
};
use super::event::TransferEvent;
use super::reader::TokenReader;

/// Load the Token for `address`, creating it from on-chain metadata on first sight.
///
/// Metadata is read as of `block`, the block of the first observed transfer.
/// Each metadata read is independent: a reverted `name()` still lets `symbol()`,
/// `decimals()` and `totalSupply()` populate their fields. An existing token is
/// returned as stored, without re-reading the contract.
pub async fn load_or_create_token<S, R>(
    store: &mut S,
    reader: &R,
    address: Address,
    block: u64,
) -> eyre::Result<Token>
where
    S: EntityStore + ?Sized,
    R: TokenReader + ?Sized,
{
    let id = address_id(&address);
    store::get_or_create(store, &id, || async {
        let name = reader.name(address, block).await.unwrap_or_else(|e| {
            tracing::debug!(token = %address, error = %e, "name() unavailable, using default");
            UNKNOWN_NAME.to_string()
        });
        let symbol = reader.symbol(address, block).await.unwrap_or_else(|e| {
            tracing::debug!(token = %address, error = %e, "symbol() unavailable, using default");
            UNKNOWN_SYMBOL.to_string()
        });
        let decimals = reader.decimals(address, block).await.unwrap_or_else(|e| {
            tracing::debug!(token = %address, error = %e, "decimals() unavailable, using default");
            DEFAULT_DECIMALS
        });
        let total_supply = reader.total_supply(address, block).await.unwrap_or_else(|e| {
            tracing::debug!(token = %address, error = %e, "totalSupply() unavailable, using default");
            Default::default()
        });

        tracing::info!(token = %address, %name, %symbol, decimals, "New token");

        Token {
            id: id.clone(),
            name,
            symbol,
            decimals,
            total_supply,
        }
    })
    .await
}

/// Load the Account for `address`, creating it with a zero balance if absent.
pub async fn load_or_create_account<S>(store: &mut S, address: Address) -> eyre::Result<Account>
where
    S: EntityStore + ?Sized,
{
    let id = address_id(&address);
    store::get_or_create(store, &id, || async { Account::new(&address) }).await
}

/// Apply one Transfer log: capture token metadata, refresh both balances from
/// the contract as of the event's block, and record the transfer.
///
/// Contract reads never fail this function; a failed balance read leaves the
/// stored balance untouched. Only entity store errors are returned.
pub async fn handle_transfer<S, R>(
    store: &mut S,
    reader: &R,
    event: &TransferEvent,
) -> eyre::Result<()>
where
    S: EntityStore + ?Sized,
    R: TokenReader + ?Sized,
{
    let token = event.address;
    let from = event.params.from;
    let to = event.params.to;
    let block = event.block.number;

    load_or_create_token(store, reader, token, block).await?;

    let mut from_account = load_or_create_account(store, from).await?;
    let mut to_account = load_or_create_account(store, to).await?;

    if from == to {
        // Self-transfer: one read serves both sides.
        refresh_balance(store, reader, token, from, block, &mut from_account).await?;
    } else {
        refresh_balance(store, reader, token, from, block, &mut from_account).await?;
        refresh_balance(store, reader, token, to, block, &mut to_account).await?;
    }

    let transfer = Transfer {
        id: transfer_id(&event.transaction.hash, event.log_index),
        from: from_account.id,
        to: to_account.id,
        value: event.params.value,
        timestamp: event.block.timestamp,
        block_number: event.block.number,
        transaction_hash: event.transaction.hash,
    };
    store::save(store, &transfer).await?;

    tracing::debug!(
        id = %transfer.id,
        token = %token,
        from = %transfer.from,
        to = %transfer.to,
        value = %transfer.value,
        block = transfer.block_number,
        "Recorded transfer"
    );

    Ok(())
}

/// Overwrite `account.balance` with `balanceOf(holder)` at `block` and persist it.
/// On a failed read the account is left as it was.
async fn refresh_balance<S, R>(
    store: &mut S,
    reader: &R,
    token: Address,
    holder: Address,
    block: u64,
    account: &mut Account,
) -> eyre::Result<()>
where
    S: EntityStore + ?Sized,
    R: TokenReader + ?Sized,
{
    match reader.balance_of(token, holder, block).await {
        Ok(balance) => {
            account.balance = balance;
            store::save(store, &*account).await
        }
        Err(e) => {
            tracing::warn!(
                token = %token,
                holder = %holder,
                block,
                error = %e,
                "balanceOf() failed, keeping stale balance"
            );
            Ok(())
        }
    }
}
