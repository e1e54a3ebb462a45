//! NotifyingStore - announces every write on a change bus.
//!
//! Registry instances sharing one underlying store (two tabs, two processes)
//! learn about each other's writes through `StorageChanged` events, the way a
//! browser delivers storage events to other tabs.

use std::sync::Arc;

use tracing::warn;

use super::KeyValueStore;
use crate::bus::{ChangeEvent, Publisher};
use crate::error::StorageError;

pub struct NotifyingStore<S> {
    inner: S,
    publisher: Arc<dyn Publisher>,
}

impl<S: KeyValueStore> NotifyingStore<S> {
    pub fn new(inner: S, publisher: Arc<dyn Publisher>) -> Self {
        Self { inner, publisher }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn announce(&self, key: &str) {
        if let Err(error) = self.publisher.publish(ChangeEvent::storage_changed(key)) {
            warn!(key = %key, error = %error, "failed to announce storage change");
        }
    }
}

impl<S: KeyValueStore> KeyValueStore for NotifyingStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)?;
        self.announce(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)?;
        self.announce(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.keys_with_prefix(prefix)
    }
}
