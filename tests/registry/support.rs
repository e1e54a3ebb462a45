//! Shared fixtures.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use store_registry::{
    InMemoryFetcher, InMemoryKeyValueStore, KeyValueStore, LocalStoreRepository, Origin,
    RemoteEndpoints, RemoteStoreSynchronizer, StorageError, StoreRecord, StoreRegistry,
};

pub const API: &str = "http://api.test";
pub const PRIMARY_INDEX: &str = "http://api.test/assets/stores/index.json";
pub const FALLBACK_INDEX: &str = "/assets/stores/index.json";

pub type MemoryRegistry = StoreRegistry<InMemoryKeyValueStore>;

pub fn memory_registry(store: &InMemoryKeyValueStore) -> MemoryRegistry {
    StoreRegistry::new(LocalStoreRepository::new(store.clone()))
}

pub fn endpoints() -> RemoteEndpoints {
    RemoteEndpoints::new(API)
        .with_fallback("")
        .with_extra_directory_url("/index.json")
}

pub fn synchronizer(
    registry: &MemoryRegistry,
    fetcher: &InMemoryFetcher,
) -> RemoteStoreSynchronizer<InMemoryKeyValueStore> {
    RemoteStoreSynchronizer::new(registry.clone(), Arc::new(fetcher.clone()), endpoints())
}

pub fn local(slug: &str) -> StoreRecord {
    StoreRecord::new(slug, Origin::Local)
}

/// A persisted record as an older client wrote it.
pub fn legacy_record_json(subdomain: &str, email: &str) -> String {
    json!({
        "id": subdomain,
        "subdomain": subdomain,
        "nameAr": format!("متجر {subdomain}"),
        "email": email,
        "disabled": ["finance-wallet"],
        "themeColor": "#aa3366",
    })
    .to_string()
}

pub fn slugs(records: &[StoreRecord]) -> Vec<String> {
    records.iter().map(|record| record.slug.clone()).collect()
}

/// A store that reads but refuses every write.
#[derive(Clone, Default)]
pub struct ReadOnlyStore(pub InMemoryKeyValueStore);

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::LockPoisoned("set"))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::LockPoisoned("remove"))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.0.keys()
    }
}
