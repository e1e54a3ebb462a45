use serde_json::json;
use store_registry::{CannedResponse, InMemoryFetcher, InMemoryKeyValueStore, KeyValueStore, Origin};

use crate::support::{memory_registry, synchronizer, FALLBACK_INDEX, PRIMARY_INDEX};

#[tokio::test]
async fn falls_back_to_same_origin_directory() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    registry.bootstrap();
    let fetcher = InMemoryFetcher::new()
        .with_status(PRIMARY_INDEX, 500)
        .with_json(FALLBACK_INDEX, json!({ "stores": [{ "slug": "delta" }] }));

    let report = synchronizer(&registry, &fetcher).sync().await;

    assert_eq!(report.directory_url.as_deref(), Some(FALLBACK_INDEX));
    assert_eq!(report.registered, 1);
    assert_eq!(report.detail_misses, 1);

    let delta = registry.get("delta").unwrap();
    assert_eq!(delta.slug, "delta-store");
    assert!(delta.is_setup_complete());
    assert!(delta.password.is_some());
    assert_eq!(registry.len(), 5);
}

#[tokio::test]
async fn repeated_sync_changes_nothing() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    registry.bootstrap();
    let fetcher = InMemoryFetcher::new()
        .with_json(
            PRIMARY_INDEX,
            json!([{ "slug": "indeesh", "name": "Indeesh" }, { "slug": "pretty" }]),
        )
        .with_json(
            "http://api.test/assets/indeesh/store.json",
            json!({
                "slug": "indeesh",
                "nameAr": "متجر انديش",
                "nameEn": "Indeesh",
                "logo": "assets/indeesh/logo.webp",
                "products": [{ "id": 1, "name": "Scarf" }],
            }),
        );
    let sync = synchronizer(&registry, &fetcher);

    sync.sync().await;
    let first = registry.snapshot();
    let aggregate = store.get("eshro_stores").unwrap();

    sync.sync().await;

    assert_eq!(registry.snapshot(), first);
    assert_eq!(store.get("eshro_stores").unwrap(), aggregate);
    assert_eq!(first.len(), 6);

    let indeesh = registry.get("indeesh").unwrap();
    assert_eq!(indeesh.origin, Origin::Remote);
    assert_eq!(
        indeesh.logo.as_deref(),
        Some("http://api.test/assets/indeesh/logo.webp")
    );
    assert_eq!(indeesh.catalog.products.len(), 1);
}

#[tokio::test]
async fn remote_store_matched_by_email_is_folded_into_seed() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    registry.bootstrap();
    let fetcher = InMemoryFetcher::new()
        .with_json(PRIMARY_INDEX, json!([{ "slug": "mounir-shop" }]))
        .with_json(
            "http://api.test/assets/mounir-shop/store.json",
            json!({
                "slug": "mounir-shop",
                "nameAr": "متجر منير",
                "email": "Mounir@Gmail.com",
            }),
        );

    synchronizer(&registry, &fetcher).sync().await;

    assert_eq!(registry.len(), 5);
    let matches: Vec<_> = registry
        .snapshot()
        .into_iter()
        .filter(|record| {
            record
                .email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case("mounir@gmail.com"))
        })
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name_local, "متجر منير");
    assert_eq!(matches[0].password.as_deref(), Some("mounir123"));
}

#[tokio::test]
async fn aliased_entries_collapse_into_one_record() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    let fetcher = InMemoryFetcher::new().with_json(
        PRIMARY_INDEX,
        json!([
            { "slug": "Sherine", "name": "Sherine" },
            { "subdomain": "sheirin", "nameEn": "Sheirine Boutique" },
        ]),
    );

    let report = synchronizer(&registry, &fetcher).sync().await;

    assert_eq!(report.registered, 2);
    let records = registry.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].slug, "sheirine");
    assert_eq!(records[0].name_latin, "Sheirine Boutique");
    assert_eq!(registry.repository().aggregate_list().len(), 1);
}

#[tokio::test]
async fn entries_without_identity_are_skipped() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    let fetcher = InMemoryFetcher::new().with_json(
        PRIMARY_INDEX,
        json!([{ "name": "   " }, { "logo": "/logo.png" }, { "name": "Magna Beauty" }]),
    );

    let report = synchronizer(&registry, &fetcher).sync().await;

    assert_eq!(report.skipped, 2);
    assert_eq!(report.registered, 1);
    let magna = registry.get("magna-beauty").unwrap();
    assert_eq!(magna.name_local, "Magna Beauty");
    assert!(store.get("store_").unwrap().is_none());
}

#[tokio::test]
async fn unreachable_directory_keeps_published_list() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    registry.bootstrap();
    let before = registry.snapshot();
    let fetcher = InMemoryFetcher::new()
        .route(PRIMARY_INDEX, CannedResponse::Unreachable)
        .route(FALLBACK_INDEX, CannedResponse::Body("<html>".into()));

    let report = synchronizer(&registry, &fetcher).sync().await;

    assert!(report.aborted);
    assert_eq!(registry.snapshot(), before);
}
