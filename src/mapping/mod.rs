//! Transfer event to entity mapping.

pub mod entity;
pub mod event;
pub mod handler;
pub mod reader;

#[cfg(test)]
pub(crate) mod testing;

pub use entity::{Account, Token, Transfer};
pub use event::{TransferBlock, TransferEvent, TransferParams, TransferTransaction};
pub use handler::{handle_transfer, load_or_create_account, load_or_create_token};
pub use reader::{CallFailed, RpcTokenReader, TokenReader};
