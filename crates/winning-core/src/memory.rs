//! [`MemoryStore`]: an in-process [`DatasetStore`] for tests and dry runs.

use std::{
  collections::{HashMap, HashSet},
  sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;

use crate::{key::TableKey, store::DatasetStore, table::Table};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  /// A write was refused because the key was marked with
  /// [`MemoryStore::fail_writes_to`].
  #[error("write refused for {0}")]
  WriteRefused(TableKey),
}

#[derive(Default)]
struct Inner {
  tables:      HashMap<TableKey, Table>,
  failing:     HashSet<TableKey>,
  write_count: usize,
}

/// Tables held in a shared map. Cloning is cheap and clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
    let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut inner)
  }

  /// Seed a table without counting it as a write.
  pub fn insert(&self, key: TableKey, table: Table) {
    self.with(|inner| {
      inner.tables.insert(key, table);
    });
  }

  /// Snapshot of a table, if present.
  pub fn table(&self, key: &TableKey) -> Option<Table> {
    self.with(|inner| inner.tables.get(key).cloned())
  }

  /// Make every later `put` to `key` fail.
  pub fn fail_writes_to(&self, key: TableKey) {
    self.with(|inner| {
      inner.failing.insert(key);
    });
  }

  /// Number of successful `put` calls so far.
  pub fn write_count(&self) -> usize { self.with(|inner| inner.write_count) }
}

impl DatasetStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn get(&self, key: &TableKey) -> Result<Option<Table>, MemoryStoreError> {
    Ok(self.table(key))
  }

  async fn put(&self, key: &TableKey, table: &Table) -> Result<(), MemoryStoreError> {
    self.with(|inner| {
      if inner.failing.contains(key) {
        return Err(MemoryStoreError::WriteRefused(key.clone()));
      }
      inner.tables.insert(key.clone(), table.clone());
      inner.write_count += 1;
      Ok(())
    })
  }
}
