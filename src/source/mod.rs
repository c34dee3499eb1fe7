//! Upstream news sources.
//!
//! This module defines the [`Fetcher`] trait the tracker depends on and the
//! [`FetchError`] type every implementation reports failures with.  Concrete
//! sources live in sub-modules (currently only [`mcp`]).
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `rss.rs`).
//! 2. Define a struct and implement [`Fetcher`] for it.
//! 3. Add `mod rss;` below and re-export your struct in the `pub use` block.
//! 4. Construct an instance in `main.rs` instead of (or next to) the MCP one.
//!
//! The refresh loop, de-duplication, capacity limits and the console are all
//! source-agnostic.

mod mcp;

pub use mcp::{McpConfig, McpFetcher};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Why a fetch produced no text.
///
/// None of these are retried by the fetcher itself; the tracker caches the
/// rendered message as an item and the next refresh cycle tries again.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The whole request did not finish within the configured bound.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// The service answered with a non-success HTTP status.
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    /// The service answered with a JSON-RPC `error` payload.
    #[error("upstream error: {0}")]
    Rpc(String),
    /// The response body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Decode(String),
    /// Connection, TLS or protocol failure below JSON-RPC.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Something that can produce a news snippet for a key.
///
/// The tracker calls [`fetch()`](Fetcher::fetch) from its background refresh
/// loop, so implementations must be [`Send`] + [`Sync`].  A fetch must never
/// panic on bad upstream data; every failure is a [`FetchError`].
///
/// ## Implementing a new source
///
/// ```ignore
/// pub struct StaticSource;
///
/// #[async_trait]
/// impl Fetcher for StaticSource {
///     async fn fetch(&self, key: &str) -> Result<String, FetchError> {
///         Ok(format!("Nothing new in {key}"))
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one snippet of news for `key`.
    async fn fetch(&self, key: &str) -> Result<String, FetchError>;
}
