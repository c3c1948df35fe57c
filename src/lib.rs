//! ERC-20 Transfer indexer.
//!
//! Each Transfer log from a watched token contract is handed to
//! [`mapping::handle_transfer`], which keeps three entity kinds current:
//! `Token` (metadata captured at first sight), `Account` (balance mirrored
//! from `balanceOf`) and `Transfer` (one immutable record per log).

pub mod config;
pub mod db;
pub mod indexer;
pub mod mapping;
pub mod store;
pub mod tokens;
