//! Remote permanent-store directory.
//!
//! The synchronizer only needs "URL in, parsed JSON or failure out", so the
//! transport sits behind the [`Fetcher`] trait:
//! - [`InMemoryFetcher`] - canned responses for tests and development
//! - [`HttpFetcher`] - reqwest over HTTP (`http` feature)

mod document;
mod endpoints;
#[cfg(feature = "http")]
mod http;
mod in_memory;
mod sync;

pub use document::{
    directory_entries, fill_display_defaults, parse_summary, remote_record, ServedDetail,
    StoreDetail, StoreSummary, FALLBACK_LOGO,
};
pub use endpoints::{join, resolve_asset, Attempt, RemoteEndpoints};
#[cfg(feature = "http")]
pub use http::HttpFetcher;
pub use in_memory::{CannedResponse, InMemoryFetcher};
pub use sync::{RemoteStoreSynchronizer, SyncReport};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and parse the body as JSON. Non-success statuses are errors.
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).fetch_json(url).await
    }
}
