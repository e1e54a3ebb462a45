//! Key/value persistence primitive.
//!
//! The registry never talks to a concrete backend. It is handed a
//! [`KeyValueStore`] offering string-valued get/set/remove/keys with no
//! atomicity beyond single-key writes.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │     LocalStoreRepository      │
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │     KeyValueStore (trait)     │
//! └──────────────────────────────┘
//!      │             │             │
//!      ▼             ▼             ▼
//! ┌──────────┐ ┌────────────┐ ┌────────────────┐
//! │ InMemory │ │ FileBacked │ │ NotifyingStore │
//! └──────────┘ └────────────┘ └────────────────┘
//! ```

mod file;
mod in_memory;
mod notifying;

pub use file::FileKeyValueStore;
pub use in_memory::InMemoryKeyValueStore;
pub use notifying::NotifyingStore;

use std::sync::Arc;

use crate::error::StorageError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored, in ascending order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Keys starting with `prefix`, in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).keys_with_prefix(prefix)
    }
}
