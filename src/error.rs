//! Error taxonomy for the fetch-with-fallback core.
//!
//! No error here is fatal: network and decode failures degrade to the last
//! stored snapshot, store failures degrade to an empty one. The enums exist
//! so callers and logs can tell the classes apart, not to abort anything.

use thiserror::Error;

/// Failure while reading or writing the persistent key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("storage backend error: {0}")]
  Backend(String),

  #[error("storage I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
  fn from(e: rusqlite::Error) -> Self {
    StoreError::Backend(e.to_string())
  }
}

/// Failure while loading a remote snapshot.
#[derive(Error, Debug)]
pub enum FetchError {
  /// Transport failure or non-success HTTP status.
  #[error("network error: {0}")]
  Network(String),

  /// Response body or stored value is not valid structured data.
  #[error("decode error: {0}")]
  Decode(#[from] serde_json::Error),

  /// Persistent store read/write failure.
  #[error("store error: {0}")]
  Store(#[from] StoreError),
}

impl From<reqwest::Error> for FetchError {
  fn from(e: reqwest::Error) -> Self {
    FetchError::Network(e.to_string())
  }
}
