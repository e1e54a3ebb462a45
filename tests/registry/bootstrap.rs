use serde_json::json;
use store_registry::{
    ChangeEvent, FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, LocalStoreRepository,
    Origin, StoreRegistry,
};

use crate::support::{legacy_record_json, memory_registry, slugs, ReadOnlyStore};

#[test]
fn seeds_populate_an_empty_store() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);

    let records = registry.bootstrap();

    assert_eq!(
        slugs(&records),
        vec!["nawaem", "sheirine", "pretty", "delta-store", "magna-beauty"]
    );
    assert!(records.iter().all(|record| record.origin == Origin::Seed));
    assert!(store.get("store_delta-store").unwrap().is_some());
    assert_eq!(registry.repository().aggregate_list().len(), 5);
}

#[test]
fn bootstrap_is_a_fixed_point() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);

    let first = registry.bootstrap();
    let aggregate = store.get("eshro_stores").unwrap();
    let second = registry.bootstrap();

    assert_eq!(first, second);
    assert_eq!(store.get("eshro_stores").unwrap(), aggregate);
}

#[test]
fn legacy_persisted_record_is_folded_into_its_seed() {
    let store = InMemoryKeyValueStore::with_entries([(
        "store_sherine",
        legacy_record_json("sherine", "salem@gmail.com"),
    )]);
    let registry = memory_registry(&store);

    registry.bootstrap();

    let sheirine = registry.get("sherine").unwrap();
    assert_eq!(sheirine.slug, "sheirine");
    assert_eq!(sheirine.disabled_features, vec!["finance-wallet"]);
    assert_eq!(sheirine.extra.get("themeColor"), Some(&json!("#aa3366")));
    assert_eq!(sheirine.password.as_deref(), Some("salem123"));
    assert_eq!(registry.len(), 5);
}

#[test]
fn locally_created_stores_survive_bootstrap() {
    let store = InMemoryKeyValueStore::with_entries([(
        "eshro_stores",
        json!([
            { "subdomain": "indeesh", "nameAr": "متجر انديش", "email": "indeesh@example.ly" },
            "garbage",
            { "subdomain": "   " },
        ])
        .to_string(),
    )]);
    let registry = memory_registry(&store);

    let records = registry.bootstrap();

    assert_eq!(records.len(), 6);
    assert_eq!(slugs(&records)[0], "indeesh");
    assert!(records.iter().all(|record| !record.slug.is_empty()));
}

#[test]
fn persisted_credentials_survive_reseeding() {
    let store = InMemoryKeyValueStore::with_entries([(
        "store_pretty",
        json!({
            "slug": "pretty",
            "ownerEmail": "owner@pretty.ly",
            "stats": { "orders": 4000 },
        })
        .to_string(),
    )]);
    let registry = memory_registry(&store);

    registry.bootstrap();

    let pretty = registry.get("pretty").unwrap();
    assert_eq!(pretty.owner_email.as_deref(), Some("owner@pretty.ly"));
    assert_eq!(pretty.stats.unwrap().orders, Some(4000));
    assert_eq!(pretty.email.as_deref(), Some("kamel@gmail.com"));
}

#[test]
fn file_backed_registry_reloads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stores.json");

    let first = StoreRegistry::new(LocalStoreRepository::new(FileKeyValueStore::open(&path)));
    let published = first.bootstrap();

    let reopened = StoreRegistry::new(LocalStoreRepository::new(FileKeyValueStore::open(&path)));
    assert!(reopened.is_empty());
    assert_eq!(reopened.rebuild(), published);
}

#[test]
fn corrupt_storage_file_still_publishes_seeds_and_is_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stores.json");
    std::fs::write(&path, "{ truncated").unwrap();

    let registry = StoreRegistry::new(LocalStoreRepository::new(FileKeyValueStore::open(&path)));
    let published = registry.bootstrap();
    assert_eq!(published.len(), 5);

    let reopened = StoreRegistry::new(LocalStoreRepository::new(FileKeyValueStore::open(&path)));
    assert_eq!(reopened.rebuild(), published);
}

#[test]
fn unwritable_storage_still_publishes_seeds() {
    let registry = StoreRegistry::new(LocalStoreRepository::new(ReadOnlyStore::default()));

    let published = registry.bootstrap();

    assert_eq!(
        slugs(&published),
        vec!["nawaem", "sheirine", "pretty", "delta-store", "magna-beauty"]
    );
    assert!(registry.repository().aggregate_list().is_empty());

    registry.handle(&ChangeEvent::StorageChanged { key: None });
    assert_eq!(registry.len(), 5);
    assert_eq!(
        registry.get("sherine").unwrap().password.as_deref(),
        Some("salem123")
    );
}
