//! RemoteStoreSynchronizer - pulls the permanent-store directory into the
//! registry.
//!
//! One pass:
//! 1. fetch the directory from each directory URL in order, stopping at the
//!    first success; abort quietly if none answers
//! 2. accept a bare array or `{ "stores": [...] }`; abort on any other shape
//! 3. per entry, derive the canonical slug (skip if empty) and try the
//!    detail URLs in order; a missing detail is not an error
//! 4. normalize, merge over the matching registry record, persist
//! 5. rebuild the registry once every entry has settled
//!
//! Failures never escape a pass. They are logged and counted in the
//! returned [`SyncReport`].

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::document::{
    directory_entries, fill_display_defaults, parse_summary, remote_record, ServedDetail,
    StoreDetail,
};
use super::endpoints::{Attempt, RemoteEndpoints};
use super::Fetcher;
use crate::merge::merge;
use crate::registry::StoreRegistry;
use crate::storage::KeyValueStore;

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// URL the directory was served from; `None` when the pass aborted
    /// before reading one.
    pub directory_url: Option<String>,
    pub entries: usize,
    pub registered: usize,
    /// Entries dropped as malformed or without a usable slug.
    pub skipped: usize,
    /// Entries registered from their summary alone.
    pub detail_misses: usize,
    pub write_failures: usize,
    pub aborted: bool,
}

pub struct RemoteStoreSynchronizer<S> {
    registry: StoreRegistry<S>,
    fetcher: Arc<dyn Fetcher>,
    endpoints: RemoteEndpoints,
}

impl<S> Clone for RemoteStoreSynchronizer<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            fetcher: Arc::clone(&self.fetcher),
            endpoints: self.endpoints.clone(),
        }
    }
}

impl<S: KeyValueStore + 'static> RemoteStoreSynchronizer<S> {
    pub fn new(
        registry: StoreRegistry<S>,
        fetcher: Arc<dyn Fetcher>,
        endpoints: RemoteEndpoints,
    ) -> Self {
        Self {
            registry,
            fetcher,
            endpoints,
        }
    }

    pub fn registry(&self) -> &StoreRegistry<S> {
        &self.registry
    }

    /// Run one pass on the tokio runtime.
    pub fn spawn(&self) -> JoinHandle<SyncReport> {
        let synchronizer = self.clone();
        tokio::spawn(async move { synchronizer.sync().await })
    }

    pub async fn sync(&self) -> SyncReport {
        let mut report = SyncReport::default();

        let Some((directory, served_by)) = self.fetch_directory().await else {
            warn!("store directory unavailable, keeping current registry");
            report.aborted = true;
            return report;
        };
        report.directory_url = Some(served_by.url.clone());

        let Some(entries) = directory_entries(directory) else {
            warn!(url = %served_by.url, "store directory has an unexpected shape, aborting sync");
            report.aborted = true;
            return report;
        };
        report.entries = entries.len();

        for (index, entry) in entries.into_iter().enumerate() {
            let Some(summary) = parse_summary(index, entry) else {
                report.skipped += 1;
                continue;
            };
            let slug = summary.canonical_slug();
            if slug.is_empty() {
                warn!(index, "directory entry has no usable slug, skipping");
                report.skipped += 1;
                continue;
            }

            let detail = self.fetch_detail(&slug).await;
            if detail.is_none() {
                debug!(slug = %slug, "no detail document, using summary");
                report.detail_misses += 1;
            }

            let incoming = remote_record(&summary, &served_by.base, detail.as_ref());
            // Entries earlier in this pass are persisted but not yet published.
            let existing = self
                .registry
                .find_matching(&incoming)
                .or_else(|| self.registry.repository().get(&incoming.slug));
            let mut merged = merge(&incoming, existing.as_ref());
            fill_display_defaults(&mut merged);

            match self.registry.persist(merged) {
                Ok(()) => {
                    debug!(slug = %incoming.slug, "remote store registered");
                    report.registered += 1;
                }
                Err(error) => {
                    warn!(slug = %incoming.slug, error = %error, "failed to persist remote store");
                    report.write_failures += 1;
                }
            }
        }

        self.registry.rebuild();
        info!(
            url = %served_by.url,
            entries = report.entries,
            registered = report.registered,
            skipped = report.skipped,
            detail_misses = report.detail_misses,
            write_failures = report.write_failures,
            "store directory synced"
        );
        report
    }

    async fn fetch_directory(&self) -> Option<(Value, Attempt)> {
        for attempt in self.endpoints.directory_attempts() {
            match self.fetcher.fetch_json(&attempt.url).await {
                Ok(document) => return Some((document, attempt)),
                Err(error) => {
                    warn!(url = %attempt.url, error = %error, "store directory fetch failed");
                }
            }
        }
        None
    }

    async fn fetch_detail(&self, slug: &str) -> Option<ServedDetail> {
        for attempt in self.endpoints.detail_attempts(slug) {
            match self.fetcher.fetch_json(&attempt.url).await {
                Ok(document) => {
                    return match StoreDetail::from_value(document) {
                        Ok(detail) => Some(ServedDetail {
                            detail,
                            base: attempt.base,
                        }),
                        Err(error) => {
                            warn!(url = %attempt.url, error = %error, "store detail is malformed, ignoring");
                            None
                        }
                    };
                }
                Err(error) => {
                    debug!(url = %attempt.url, error = %error, "store detail fetch failed");
                }
            }
        }
        None
    }
}
