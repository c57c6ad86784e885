//! Observable `{data, loading, error}` state for one remote list resource.
//!
//! A [`Resource`] wraps a [`Loader`](crate::fetch::Loader) call behind the
//! three states a presentation layer actually renders: the best-known data
//! (initially empty), whether a load is in flight, and the last informational
//! warning. One `refresh` transitions `loading` from true to false exactly
//! once, and data, error and origin settle together in a single `poll`.
//!
//! # Example
//!
//! ```ignore
//! let loader = Arc::new(Loader::new(store));
//! let http = HttpClient::new();
//! let mut chapters = Resource::new(loader, "chapters", move || {
//!     let http = http.clone();
//!     async move { http.fetch_list("https://api.example.com/chapters").await }
//! });
//!
//! chapters.refresh();
//!
//! // In the event loop tick
//! if chapters.poll() {
//!     // State changed, re-render
//! }
//!
//! let state = chapters.state();
//! render(&state.data, state.loading, state.error.as_deref());
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::fetch::{LoadOutcome, Loader, Origin};
use crate::store::KeyValueStore;

/// The observable state of a resource.
#[derive(Debug, Clone)]
pub struct ResourceState<T> {
  /// Best-known snapshot; empty until a load settles with data.
  pub data: Vec<T>,
  /// Whether a load is in flight.
  pub loading: bool,
  /// Last surfaced warning, or `None` after a clean network load.
  pub error: Option<String>,
  /// Provenance of `data`.
  pub origin: Origin,
}

impl<T> Default for ResourceState<T> {
  fn default() -> Self {
    Self {
      data: Vec::new(),
      loading: false,
      error: None,
      origin: Origin::Empty,
    }
  }
}

/// A factory that starts one load and yields its settled outcome.
type LoadFn<T> = Box<dyn Fn() -> BoxFuture<'static, LoadOutcome<T>> + Send + Sync>;

/// One remote list resource with poll-based state updates.
///
/// `refresh` is a no-op while a load is in flight, so a single resource never
/// races against itself. Two *different* resources sharing a storage key are
/// serialized by the loader's per-key flight guard; their settled states still
/// apply in completion order (last write wins), which callers needing strict
/// ordering must handle themselves.
pub struct Resource<T> {
  state: ResourceState<T>,
  load_fn: LoadFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<LoadOutcome<T>>>,
}

impl<T> Resource<T>
where
  T: Serialize + DeserializeOwned + Send + 'static,
{
  /// Create a resource that loads through `loader` under `storage_key`.
  ///
  /// The fetcher is called once per `refresh`; its failures degrade to the
  /// stored snapshot inside the loader and never reach the caller as errors.
  pub fn new<S, F, Fut>(loader: Arc<Loader<S>>, storage_key: impl Into<String>, fetcher: F) -> Self
  where
    S: KeyValueStore + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, FetchError>> + Send + 'static,
  {
    let storage_key = storage_key.into();
    let fetcher = Arc::new(fetcher);

    let load_fn: LoadFn<T> = Box::new(move || {
      let loader = Arc::clone(&loader);
      let storage_key = storage_key.clone();
      let fetcher = Arc::clone(&fetcher);
      Box::pin(async move { loader.load(&storage_key, || (*fetcher)()).await })
    });

    Self {
      state: ResourceState::default(),
      load_fn,
      receiver: None,
    }
  }

  /// Get the current state.
  pub fn state(&self) -> &ResourceState<T> {
    &self.state
  }

  /// Best-known data, regardless of origin.
  pub fn data(&self) -> &[T] {
    &self.state.data
  }

  pub fn is_loading(&self) -> bool {
    self.state.loading
  }

  /// Last surfaced warning, if any.
  pub fn error(&self) -> Option<&str> {
    self.state.error.as_deref()
  }

  /// Start a load if none is in flight.
  pub fn refresh(&mut self) {
    if self.state.loading {
      return;
    }

    self.state.loading = true;
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    let future = (self.load_fn)();
    tokio::spawn(async move {
      let outcome = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(outcome);
    });
  }

  /// Poll for a settled load.
  ///
  /// Returns `true` if the state changed. Call this from the event loop tick.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(outcome) => {
        // Data, error and origin settle in one assignment so the caller
        // never observes an error paired with data from another load.
        self.state = ResourceState {
          data: outcome.data,
          loading: false,
          error: outcome.warning,
          origin: outcome.origin,
        };
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending; keep the current data.
        self.state.loading = false;
        self.state.error = Some("load was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Resource<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Resource")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
