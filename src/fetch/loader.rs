//! Loader that orchestrates network fetching with stored-snapshot fallback.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::store::KeyValueStore;

/// Where the data in a [`LoadOutcome`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
  /// Fresh data from the network, now persisted.
  Network,
  /// Network failed; data is the last successfully stored snapshot.
  Cache,
  /// Network failed and nothing usable was stored.
  Empty,
}

/// Result of a single load: the best-known snapshot plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadOutcome<T> {
  pub data: Vec<T>,
  pub origin: Origin,
  /// Informational message when the network could not be used.
  /// Set for `Cache` and `Empty`, never for `Network`.
  pub warning: Option<String>,
}

/// Orchestrates fetch-with-fallback against a [`KeyValueStore`].
///
/// Loads are serialized per storage key: two concurrent `load` calls for the
/// same key run one after the other rather than racing on the stored
/// snapshot. Loads for different keys proceed independently.
pub struct Loader<S: KeyValueStore> {
  store: Arc<S>,
  flights: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: KeyValueStore> Loader<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      flights: Mutex::new(HashMap::new()),
    }
  }

  /// The store this loader persists snapshots to.
  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  fn flight_guard(&self, storage_key: &str) -> Arc<tokio::sync::Mutex<()>> {
    let mut flights = self.flights.lock().unwrap_or_else(|e| e.into_inner());
    // Guards nobody holds anymore are reclaimed here, keeping the map
    // bounded by the number of keys currently in flight.
    flights.retain(|_, guard| Arc::strong_count(guard) > 1);
    flights.entry(storage_key.to_string()).or_default().clone()
  }

  /// Load the freshest available snapshot for `storage_key`.
  ///
  /// The fetcher runs once. On success the decoded snapshot is persisted
  /// verbatim under `storage_key` and returned with [`Origin::Network`]; a
  /// failed persist is logged, not surfaced, and the fresh data is still
  /// returned. On failure the last stored snapshot is returned with
  /// [`Origin::Cache`], or an empty one with [`Origin::Empty`] when nothing
  /// usable is stored; either way `warning` carries the original error.
  pub async fn load<T, F, Fut>(&self, storage_key: &str, fetcher: F) -> LoadOutcome<T>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, FetchError>>,
  {
    let guard = self.flight_guard(storage_key);
    let _flight = guard.lock().await;

    match fetcher().await {
      Ok(data) => {
        self.persist(storage_key, &data);
        LoadOutcome {
          data,
          origin: Origin::Network,
          warning: None,
        }
      }
      Err(err) => self.fall_back(storage_key, err),
    }
  }

  fn persist<T: Serialize>(&self, storage_key: &str, data: &[T]) {
    let json = match serde_json::to_string(data) {
      Ok(json) => json,
      Err(e) => {
        warn!(key = storage_key, error = %e, "failed to serialize snapshot");
        return;
      }
    };

    if let Err(e) = self.store.set(storage_key, &json) {
      warn!(key = storage_key, error = %e, "failed to persist snapshot");
    }
  }

  fn fall_back<T: DeserializeOwned>(&self, storage_key: &str, err: FetchError) -> LoadOutcome<T> {
    let warning = Some(err.to_string());

    let stored = match self.store.get(storage_key) {
      Ok(stored) => stored,
      Err(e) => {
        warn!(key = storage_key, error = %e, "failed to read stored snapshot");
        None
      }
    };

    if let Some(json) = stored {
      match serde_json::from_str(&json) {
        Ok(data) => {
          debug!(key = storage_key, "serving last stored snapshot");
          return LoadOutcome {
            data,
            origin: Origin::Cache,
            warning,
          };
        }
        Err(e) => {
          warn!(key = storage_key, error = %e, "stored snapshot is corrupt");
        }
      }
    }

    LoadOutcome {
      data: Vec::new(),
      origin: Origin::Empty,
      warning,
    }
  }
}
