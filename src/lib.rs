//! Offline-first list fetching with a persisted favorites ledger.
//!
//! Three pieces, leaves first:
//!
//! - [`store`]: a string-keyed durable store behind the
//!   [`KeyValueStore`](store::KeyValueStore) trait, with SQLite-backed and
//!   in-memory implementations.
//! - [`fetch`]: the fetch-with-fallback cache. A [`Loader`](fetch::Loader)
//!   prefers the network, persists each successful snapshot wholesale, and
//!   degrades to the last stored snapshot (or an empty one) when the network
//!   fails - surfacing the failure as a warning, never as a hard error.
//! - [`favorites`]: a durable, deduplicated, insertion-ordered ledger of
//!   user-selected items, re-persisted after every mutation.
//!
//! [`resource`] wraps a loader call behind the `{data, loading, error}` shape
//! a presentation layer polls from its event loop.

pub mod config;
pub mod error;
pub mod favorites;
pub mod fetch;
pub mod resource;
pub mod store;
