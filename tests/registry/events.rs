use std::sync::Arc;

use serde_json::json;
use store_registry::{
    ChangeBus, ChangeEvent, InMemoryKeyValueStore, KeyValueStore, LocalStoreRepository,
    NotifyingStore, Publisher, StoreRecord, StoreRegistry,
};

use crate::support::{local, memory_registry, slugs};

#[test]
fn store_created_is_persisted_and_published() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    registry.bootstrap();

    let bus = ChangeBus::new();
    let subscriber = bus.new_subscriber();
    bus.publish(ChangeEvent::StoreCreated {
        record: StoreRecord {
            email: Some("indeesh@example.ly".into()),
            name_local: "متجر انديش".into(),
            ..local("Indeesh")
        },
    })
    .unwrap();

    assert_eq!(registry.pump(&subscriber), 1);
    assert_eq!(registry.pump(&subscriber), 0);

    let indeesh = registry.get("indeesh").unwrap();
    assert_eq!(indeesh.email.as_deref(), Some("indeesh@example.ly"));
    assert!(store.get("store_indeesh").unwrap().is_some());
    assert_eq!(registry.repository().aggregate_list().len(), 6);
}

#[test]
fn aliased_creations_collapse_into_one_store() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);

    registry.handle(&ChangeEvent::StoreCreated {
        record: StoreRecord {
            email: Some("salem@gmail.com".into()),
            ..local("Sherine")
        },
    });
    registry.handle(&ChangeEvent::StoreCreated {
        record: StoreRecord {
            phone: Some("218910000002".into()),
            ..local("sheirin")
        },
    });

    let records = registry.snapshot();
    assert_eq!(slugs(&records), vec!["sheirine"]);
    assert_eq!(records[0].email.as_deref(), Some("salem@gmail.com"));
    assert_eq!(records[0].phone.as_deref(), Some("218910000002"));
}

#[test]
fn unidentifiable_store_is_never_registered() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    registry.bootstrap();
    let before = store.get("eshro_stores").unwrap();

    registry.handle(&ChangeEvent::StoreCreated {
        record: StoreRecord {
            email: Some("   ".into()),
            ..StoreRecord::default()
        },
    });

    assert_eq!(registry.len(), 5);
    assert_eq!(store.get("eshro_stores").unwrap(), before);
    assert!(store.get("store_").unwrap().is_none());
}

#[test]
fn per_store_write_from_another_tab_is_published() {
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    registry.bootstrap();
    let order = slugs(&registry.snapshot());

    store
        .set(
            "store_pretty",
            &json!({ "slug": "pretty", "nameLocal": "Pretty Renamed", "email": "kamel@gmail.com" })
                .to_string(),
        )
        .unwrap();
    registry.handle(&ChangeEvent::storage_changed("store_pretty"));

    assert_eq!(registry.get("pretty").unwrap().name_local, "Pretty Renamed");
    assert_eq!(slugs(&registry.snapshot()), order);
}

#[test]
fn other_tab_rebuilds_from_storage_changes() {
    let shared = InMemoryKeyValueStore::new();
    let bus = ChangeBus::new();
    let other_tab_events = bus.new_subscriber();

    let tab = StoreRegistry::new(LocalStoreRepository::new(NotifyingStore::new(
        shared.clone(),
        Arc::new(bus.clone()),
    )));
    let other_tab = memory_registry(&shared);

    tab.bootstrap();
    assert!(other_tab.is_empty());

    assert!(other_tab.pump(&other_tab_events) > 0);
    assert_eq!(other_tab.len(), 5);

    tab.register(local("indeesh")).unwrap();
    other_tab.pump(&other_tab_events);

    assert_eq!(other_tab.snapshot(), tab.snapshot());
    assert!(other_tab.get("indeesh").is_some());
}

#[test]
fn every_publish_announces_registry_changed() {
    let bus = ChangeBus::new();
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store)
        .with_publisher(Arc::new(bus.clone()))
        .unwrap();

    registry.bootstrap();
    registry.rebuild();

    let events = bus.events().unwrap();
    assert_eq!(
        events,
        vec![
            ChangeEvent::RegistryChanged { count: 5 },
            ChangeEvent::RegistryChanged { count: 5 },
        ]
    );

    // The registry ignores its own announcements.
    let subscriber = bus.new_subscriber();
    assert_eq!(registry.pump(&subscriber), 2);
    assert_eq!(bus.len().unwrap(), 2);
}

#[cfg(feature = "emitter")]
#[test]
fn emitter_bridge_forwards_registry_changes() {
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use store_registry::EmitterPublisher;

    let emitter = Arc::new(EmitterPublisher::default());
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    emitter
        .on("RegistryChanged", move |payload: String| {
            sink.lock().unwrap().push(payload);
        })
        .unwrap();

    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store).with_publisher(emitter).unwrap();
    registry.bootstrap();

    // EventEmitter is async, give it time
    thread::sleep(Duration::from_millis(50));

    let received = received.lock().unwrap();
    assert_eq!(received.as_slice(), [r#"{"type":"RegistryChanged","count":5}"#]);
}
