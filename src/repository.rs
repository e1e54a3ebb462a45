//! LocalStoreRepository - store records over a key/value store.
//!
//! Two views of the same data are maintained:
//! - one aggregate key holding the JSON list of every known record
//! - one key per store (`prefix + canonical slug`) holding that store alone
//!
//! Reads fail soft. A missing key, a storage error and malformed JSON all
//! read as "absent", and one corrupted record never hides the others.

use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::merge::merge;
use crate::record::StoreRecord;
use crate::slug::canonicalize;
use crate::storage::KeyValueStore;

pub struct LocalStoreRepository<S> {
    store: S,
    aggregate_key: String,
    record_key_prefix: String,
}

impl<S: KeyValueStore> LocalStoreRepository<S> {
    pub fn new(store: S) -> Self {
        Self::from_config(store, &StorageConfig::default())
    }

    pub fn from_config(store: S, config: &StorageConfig) -> Self {
        Self {
            store,
            aggregate_key: config.aggregate_key.clone(),
            record_key_prefix: config.record_key_prefix.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn aggregate_key(&self) -> &str {
        &self.aggregate_key
    }

    /// The per-store key for a raw or canonical slug.
    pub fn record_key(&self, slug: &str) -> String {
        format!("{}{}", self.record_key_prefix, canonicalize(slug))
    }

    /// Whether writes to `key` can change the registry.
    pub fn is_registry_key(&self, key: &str) -> bool {
        key == self.aggregate_key || key.starts_with(&self.record_key_prefix)
    }

    /// The persisted aggregate list. Entries that fail to parse or have no
    /// slug are skipped.
    pub fn aggregate_list(&self) -> Vec<StoreRecord> {
        let Some(raw) = self.read_raw(&self.aggregate_key) else {
            return Vec::new();
        };

        let entries = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(_) => {
                warn!(key = %self.aggregate_key, "aggregate list is not an array, ignoring");
                return Vec::new();
            }
            Err(error) => {
                warn!(key = %self.aggregate_key, error = %error, "aggregate list is malformed, ignoring");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match StoreRecord::from_json(entry) {
                Ok(record) if record.is_identified() => Some(record),
                Ok(_) => {
                    warn!(key = %self.aggregate_key, index, "aggregate entry has no slug, skipping");
                    None
                }
                Err(error) => {
                    warn!(key = %self.aggregate_key, index, error = %error, "aggregate entry is malformed, skipping");
                    None
                }
            })
            .collect()
    }

    /// Replace the aggregate list wholesale.
    pub fn set_aggregate_list(&self, records: &[StoreRecord]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)?;
        self.store.set(&self.aggregate_key, &raw)
    }

    /// The record stored under `key`. A record without a slug of its own
    /// takes the slug encoded in its per-store key.
    pub fn get_by_key(&self, key: &str) -> Option<StoreRecord> {
        let raw = self.read_raw(key)?;
        let value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(key = %key, error = %error, "stored record is malformed, ignoring");
                return None;
            }
        };
        let mut record = match StoreRecord::from_json(value) {
            Ok(record) => record,
            Err(error) => {
                warn!(key = %key, error = %error, "stored record has an unexpected shape, ignoring");
                return None;
            }
        };

        if !record.is_identified() {
            if let Some(suffix) = key.strip_prefix(&self.record_key_prefix) {
                record.slug = canonicalize(suffix);
            }
        }
        if !record.is_identified() {
            warn!(key = %key, "stored record has no slug, ignoring");
            return None;
        }
        Some(record)
    }

    pub fn set_by_key(&self, key: &str, record: &StoreRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(record)?;
        self.store.set(key, &raw)
    }

    /// The per-store record for a raw or canonical slug.
    pub fn get(&self, slug: &str) -> Option<StoreRecord> {
        self.get_by_key(&self.record_key(slug))
    }

    /// Write a record under its own per-store key.
    pub fn save(&self, record: &StoreRecord) -> Result<(), StorageError> {
        self.set_by_key(&self.record_key(&record.slug), record)
    }

    /// Every readable per-store record, in key order.
    pub fn per_store_records(&self) -> Vec<StoreRecord> {
        self.per_store_entries()
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    /// Every readable per-store record with the key it was read from, in key
    /// order.
    pub fn per_store_entries(&self) -> Vec<(String, StoreRecord)> {
        let keys = match self.store.keys_with_prefix(&self.record_key_prefix) {
            Ok(keys) => keys,
            Err(error) => {
                warn!(error = %error, "failed to list per-store keys");
                return Vec::new();
            }
        };

        keys.into_iter()
            .filter(|key| *key != self.aggregate_key)
            .filter_map(|key| {
                let record = self.get_by_key(&key)?;
                Some((key, record))
            })
            .collect()
    }

    /// Whether `key` is the per-store key of `record` itself, as opposed to
    /// a legacy spelling of it.
    pub fn is_own_key(&self, key: &str, record: &StoreRecord) -> bool {
        key == self.record_key(&record.slug)
    }

    /// Merge `record` into the aggregate entry sharing an identity variant
    /// with it, or append it, then persist the list.
    ///
    /// A record without a slug is never written; the current list is
    /// returned unchanged.
    pub fn upsert_into_aggregate(&self, record: StoreRecord) -> Result<Vec<StoreRecord>, StorageError> {
        let record = record.normalized();
        let mut list = self.aggregate_list();

        if !record.is_identified() {
            let has_email = record
                .email
                .as_deref()
                .is_some_and(|email| !email.trim().is_empty());
            warn!(has_email, "refusing to register a store without a slug");
            return Ok(list);
        }

        let variants = record.identity_variants();
        match list
            .iter()
            .position(|entry| entry.identity_variants().intersects(&variants))
        {
            Some(index) => {
                let merged = merge(&record, Some(&list[index]));
                debug!(slug = %merged.slug, previous = %list[index].slug, "merging into aggregate entry");
                list[index] = merged;
                collapse_duplicates(&mut list, index);
            }
            None => {
                debug!(slug = %record.slug, "appending to aggregate");
                list.push(record);
            }
        }

        self.set_aggregate_list(&list)?;
        Ok(list)
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(key = %key, error = %error, "failed to read key");
                None
            }
        }
    }
}

/// Fold every other entry carrying the slug of `list[keep]` into it, so the
/// list holds one record per slug.
fn collapse_duplicates(list: &mut Vec<StoreRecord>, keep: usize) {
    let slug = list[keep].slug.clone();
    let mut survivor = list[keep].clone();
    let mut index = 0;
    list.retain(|entry| {
        let current = index;
        index += 1;
        if current == keep || entry.slug != slug {
            return true;
        }
        survivor = merge(&survivor, Some(entry));
        false
    });
    if let Some(slot) = list.iter_mut().find(|entry| entry.slug == slug) {
        *slot = survivor;
    }
}
