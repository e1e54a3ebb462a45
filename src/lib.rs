//! Store identity reconciliation.
//!
//! Builds one consistent registry of stores from three overlapping sources:
//! a static seed table, a persisted key/value cache, and a remote directory
//! of permanent stores.
//!
//! - [`canonicalize`] maps any identifier onto a canonical slug
//! - [`merge`] combines two records for one store, keeping operator-owned
//!   fields ([`PRESERVED_FIELDS`])
//! - [`LocalStoreRepository`] reads and writes records over any [`KeyValueStore`]
//! - [`RemoteStoreSynchronizer`] pulls the remote directory through a [`Fetcher`]
//! - [`StoreRegistry`] publishes the result and reacts to [`ChangeEvent`]s
//!
//! ```
//! use store_registry::{InMemoryKeyValueStore, LocalStoreRepository, StoreRegistry};
//!
//! let registry = StoreRegistry::new(LocalStoreRepository::new(InMemoryKeyValueStore::new()));
//! registry.bootstrap();
//!
//! let store = registry.get("Sherine").unwrap();
//! assert_eq!(store.slug, "sheirine");
//! assert_eq!(store.email.as_deref(), Some("salem@gmail.com"));
//! ```

pub mod bus;
pub mod config;
mod error;
pub mod merge;
pub mod record;
pub mod registry;
pub mod remote;
pub mod repository;
pub mod seed;
pub mod slug;
pub mod storage;
#[cfg(feature = "cli")]
pub mod telemetry;

pub use bus::{ChangeBus, ChangeEvent, PublishError, Publisher, Subscriber};
#[cfg(feature = "emitter")]
pub use bus::EmitterPublisher;
pub use config::RegistryConfig;
pub use error::{ConfigError, FetchError, RegistryError, StorageError};
pub use merge::{merge, PreservedField, PRESERVED_FIELDS};
pub use record::{
    CatalogRefs, Credentials, DisplayId, IdentityVariants, Origin, StoreRecord, StoreStats,
    StoreStatus,
};
pub use registry::StoreRegistry;
#[cfg(feature = "http")]
pub use remote::HttpFetcher;
pub use remote::{
    CannedResponse, Fetcher, InMemoryFetcher, RemoteEndpoints, RemoteStoreSynchronizer, SyncReport,
};
pub use repository::LocalStoreRepository;
pub use seed::load_seed_records;
pub use slug::canonicalize;
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, NotifyingStore};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
