//! Core types and the transfer engine for the Winning transfer-market tool.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! is reached through the [`store::DatasetStore`] trait; the SQLite backend and
//! the HTTP layers live in sibling crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod acquire;
pub mod error;
pub mod finance;
pub mod key;
pub mod memory;
pub mod normalize;
pub mod record;
pub mod store;
pub mod table;
pub mod transfer;

pub use error::{Error, Result};
pub use key::{TableKey, TableKind};
pub use table::Table;

#[cfg(test)]
mod tests;
