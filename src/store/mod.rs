//! Persistent string-keyed storage for snapshots and the favorites ledger.
//!
//! The core treats storage as a collaborator: anything implementing
//! [`KeyValueStore`] that survives process restarts. Values are JSON text,
//! written wholesale on each update and never merged field-by-field.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;

/// String-keyed durable store. `set` overwrites any prior value.
pub trait KeyValueStore: Send + Sync {
  /// Read the value stored under `key`, if any.
  fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

  /// Store `value` under `key`, replacing any prior value.
  fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
