//! The `DatasetStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `winning-store-sqlite`,
//! or [`crate::memory::MemoryStore`] in tests). The transfer engine, the
//! ingestor and the HTTP layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{key::TableKey, table::Table};

/// A blob store of CSV tables addressed by [`TableKey`].
///
/// A single `put` replaces the whole table and is atomic with respect to
/// other readers. Nothing spans more than one table: callers that write
/// several tables must cope with a failure part-way through.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DatasetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read a table. Returns `None` if no blob exists at the key's path.
  fn get<'a>(
    &'a self,
    key: &'a TableKey,
  ) -> impl Future<Output = Result<Option<Table>, Self::Error>> + Send + 'a;

  /// Create or replace a table.
  fn put<'a>(
    &'a self,
    key: &'a TableKey,
    table: &'a Table,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
