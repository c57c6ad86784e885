//! Fetch-with-fallback: network first, last stored snapshot second, empty last.
//!
//! A [`Loader`] runs a caller-supplied fetcher and, on success, persists the
//! decoded snapshot wholesale under its storage key. On any failure (transport,
//! bad status, decode) it serves the last successfully stored snapshot instead,
//! or an empty one when nothing usable is stored. The original error travels
//! along as an informational warning, never as a hard failure.

mod http;
mod loader;

pub use http::HttpClient;
pub use loader::{LoadOutcome, Loader, Origin};
