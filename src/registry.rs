//! StoreRegistry - the published list of stores.
//!
//! The registry never holds a separately mutated copy of the data. Every
//! change is written through [`LocalStoreRepository`] first and the published
//! list is then re-read from it, so a rebuild triggered by an event can never
//! race an in-flight write into an inconsistent state.
//!
//! ## Lifecycle
//!
//! ```text
//! bootstrap:  seeds ──merge over per-store keys──▶ repository ──rebuild──▶ published
//! sync:       remote ──merge over registry──────▶ repository ──rebuild──▶ published
//! events:     StoreCreated / StorageChanged ────▶ (write) ─────rebuild──▶ published
//! ```
//!
//! Every publish emits `RegistryChanged` on the attached publishers.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::bus::{ChangeEvent, Publisher, Subscriber};
use crate::error::RegistryError;
use crate::merge::merge;
use crate::record::StoreRecord;
use crate::repository::LocalStoreRepository;
use crate::seed::load_seed_records;
use crate::slug::canonicalize;
use crate::storage::KeyValueStore;

struct Inner<S> {
    repository: LocalStoreRepository<S>,
    records: RwLock<Vec<StoreRecord>>,
    /// Merged seeds from the last bootstrap; published even when storage
    /// lost them.
    seeds: RwLock<Vec<StoreRecord>>,
    publishers: RwLock<Vec<Arc<dyn Publisher>>>,
}

/// Cheap to clone; clones share the same published list.
pub struct StoreRegistry<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for StoreRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore> StoreRegistry<S> {
    /// An empty registry over `repository`. Call [`bootstrap`](Self::bootstrap)
    /// or [`rebuild`](Self::rebuild) to populate it.
    pub fn new(repository: LocalStoreRepository<S>) -> Self {
        Self {
            inner: Arc::new(Inner {
                repository,
                records: RwLock::new(Vec::new()),
                seeds: RwLock::new(Vec::new()),
                publishers: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn with_publisher(self, publisher: Arc<dyn Publisher>) -> Result<Self, RegistryError> {
        self.add_publisher(publisher)?;
        Ok(self)
    }

    /// Attach a publisher that receives `RegistryChanged` after every publish.
    pub fn add_publisher(&self, publisher: Arc<dyn Publisher>) -> Result<(), RegistryError> {
        self.inner
            .publishers
            .write()
            .map_err(|_| RegistryError::LockPoisoned("add_publisher"))?
            .push(publisher);
        Ok(())
    }

    pub fn repository(&self) -> &LocalStoreRepository<S> {
        &self.inner.repository
    }

    /// Apply the built-in seed profiles, then publish.
    pub fn bootstrap(&self) -> Vec<StoreRecord> {
        self.bootstrap_with(load_seed_records())
    }

    /// Merge each seed over its persisted per-store record, write the result
    /// back per key and into the aggregate, then rebuild. Write failures are
    /// logged; the merged seeds are kept in memory and still published.
    ///
    /// The persisted record is looked up by identity, so one written under a
    /// legacy key (`store_sherine`) still counts.
    pub fn bootstrap_with(&self, seeds: Vec<StoreRecord>) -> Vec<StoreRecord> {
        let repository = self.repository();
        let per_store = repository.per_store_records();
        let mut merged_seeds = Vec::new();
        for seed in seeds {
            let seed = seed.normalized();
            if !seed.is_identified() {
                warn!("seed record has no slug, skipping");
                continue;
            }
            let persisted = repository.get(&seed.slug).or_else(|| {
                per_store
                    .iter()
                    .find(|record| record.shares_identity(&seed))
                    .cloned()
            });
            let merged = merge(&seed, persisted.as_ref());
            if let Err(error) = self.persist(merged.clone()) {
                warn!(slug = %seed.slug, error = %error, "failed to persist seed record");
            }
            merged_seeds.push(merged);
        }
        *self
            .inner
            .seeds
            .write()
            .unwrap_or_else(PoisonError::into_inner) = merged_seeds;
        self.rebuild()
    }

    /// Re-read the repository and publish.
    ///
    /// The aggregate list gives the order. A record under its own per-store
    /// key replaces the aggregate entry with the same slug, so a write to
    /// `store_<slug>` alone is picked up. Per-store records not in the
    /// aggregate follow, records under legacy keys after them, and the
    /// bootstrap seeds last. The first record seen for an identity wins.
    pub fn rebuild(&self) -> Vec<StoreRecord> {
        let repository = self.repository();
        let (own, legacy): (Vec<_>, Vec<_>) = repository
            .per_store_entries()
            .into_iter()
            .partition(|(key, record)| repository.is_own_key(key, record));
        let own: Vec<StoreRecord> = own.into_iter().map(|(_, record)| record).collect();

        let aggregate: Vec<StoreRecord> = repository
            .aggregate_list()
            .into_iter()
            .map(|entry| {
                own.iter()
                    .find(|record| record.slug == entry.slug)
                    .cloned()
                    .unwrap_or(entry)
            })
            .collect();
        let seeds = self
            .inner
            .seeds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let candidates = aggregate
            .into_iter()
            .chain(own)
            .chain(legacy.into_iter().map(|(_, record)| record))
            .chain(seeds);
        let records = dedup_first_wins(candidates);
        info!(count = records.len(), "store registry rebuilt");
        self.publish(records)
    }

    /// The published list.
    pub fn snapshot(&self) -> Vec<StoreRecord> {
        self.inner
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a store by raw or canonical slug.
    pub fn get(&self, raw: &str) -> Option<StoreRecord> {
        let slug = canonicalize(raw);
        if slug.is_empty() {
            return None;
        }
        self.inner
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|record| record.slug == slug)
            .cloned()
    }

    /// The published record sharing an identity variant with `record`.
    pub fn find_matching(&self, record: &StoreRecord) -> Option<StoreRecord> {
        let variants = record.identity_variants();
        if variants.is_empty() {
            return None;
        }
        self.inner
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|entry| entry.identity_variants().intersects(&variants))
            .cloned()
    }

    /// Active stores for the storefront: `featured` slugs first in the given
    /// order, then the rest in registry order.
    pub fn listing(&self, featured: &[String]) -> Vec<StoreRecord> {
        let active: Vec<StoreRecord> = self
            .snapshot()
            .into_iter()
            .filter(StoreRecord::is_active)
            .collect();

        let featured: Vec<String> = featured.iter().map(|slug| canonicalize(slug)).collect();
        let mut listing: Vec<StoreRecord> = featured
            .iter()
            .filter_map(|slug| active.iter().find(|record| &record.slug == slug))
            .cloned()
            .collect();
        listing.extend(
            active
                .into_iter()
                .filter(|record| !featured.contains(&record.slug)),
        );
        listing
    }

    /// Stores that finished setup.
    pub fn completed(&self) -> Vec<StoreRecord> {
        self.snapshot()
            .into_iter()
            .filter(StoreRecord::is_setup_complete)
            .collect()
    }

    /// Register a locally created store: merge it over the matching published
    /// record, persist, rebuild. Returns the stored record, or `None` when
    /// the record has no slug.
    pub fn register(&self, record: StoreRecord) -> Result<Option<StoreRecord>, RegistryError> {
        let record = record.normalized();
        if !record.is_identified() {
            warn!("refusing to register a store without a slug");
            return Ok(None);
        }
        let existing = self.find_matching(&record);
        let merged = merge(&record, existing.as_ref());
        self.persist(merged.clone())?;
        self.rebuild();
        Ok(Some(merged))
    }

    /// React to one change event. Failures are logged, never returned.
    pub fn handle(&self, event: &ChangeEvent) {
        match event {
            ChangeEvent::StoreCreated { record } => {
                debug!(slug = %record.slug, "store created");
                if let Err(error) = self.register(record.clone()) {
                    warn!(slug = %record.slug, error = %error, "failed to register created store");
                }
            }
            ChangeEvent::StorageChanged { key: None } => {
                self.rebuild();
            }
            ChangeEvent::StorageChanged { key: Some(key) } => {
                if self.repository().is_registry_key(key) {
                    self.rebuild();
                } else {
                    debug!(key = %key, "ignoring unrelated storage change");
                }
            }
            ChangeEvent::RegistryChanged { .. } => {}
        }
    }

    /// Handle every pending event on `subscriber`. Returns how many were
    /// handled.
    pub fn pump<T: Subscriber + ?Sized>(&self, subscriber: &T) -> usize {
        let events = match subscriber.drain() {
            Ok(events) => events,
            Err(error) => {
                warn!(error = %error, "failed to drain change events");
                return 0;
            }
        };
        for event in &events {
            self.handle(event);
        }
        events.len()
    }

    /// Write a record per key and into the aggregate.
    pub(crate) fn persist(&self, record: StoreRecord) -> Result<(), RegistryError> {
        let repository = self.repository();
        repository.save(&record)?;
        repository.upsert_into_aggregate(record)?;
        Ok(())
    }

    fn publish(&self, records: Vec<StoreRecord>) -> Vec<StoreRecord> {
        let count = records.len();
        *self
            .inner
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner) = records.clone();

        let publishers = self
            .inner
            .publishers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for publisher in publishers {
            if let Err(error) = publisher.publish(ChangeEvent::RegistryChanged { count }) {
                warn!(error = %error, "failed to publish registry change");
            }
        }
        records
    }
}

/// Keep the first record seen for each identity; later records sharing any
/// variant with an earlier one are dropped.
fn dedup_first_wins(records: impl IntoIterator<Item = StoreRecord>) -> Vec<StoreRecord> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut unique = Vec::new();
    for record in records {
        let variants = record.identity_variants();
        if variants.is_empty() {
            continue;
        }
        if variants.iter().any(|variant| seen.contains(variant)) {
            debug!(slug = %record.slug, "dropping duplicate store record");
            continue;
        }
        seen.extend(variants.iter().map(str::to_string));
        unique.push(record);
    }
    unique
}
