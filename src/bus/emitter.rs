use std::sync::Mutex;

use event_emitter_rs::EventEmitter;

use super::{ChangeEvent, PublishError, Publisher};

/// A publisher that emits events via an EventEmitter for in-process
/// listeners. Listeners registered under an event type name receive the
/// event serialized as a JSON string.
pub struct EmitterPublisher {
    emitter: Mutex<EventEmitter>,
}

impl Default for EmitterPublisher {
    fn default() -> Self {
        Self::new(EventEmitter::new())
    }
}

impl EmitterPublisher {
    pub fn new(emitter: EventEmitter) -> Self {
        Self {
            emitter: Mutex::new(emitter),
        }
    }

    /// Register a listener for one event type (`"StoreCreated"`,
    /// `"StorageChanged"` or `"RegistryChanged"`).
    pub fn on<F>(&self, event_type: &str, listener: F) -> Result<String, PublishError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| PublishError::LockPoisoned("on"))?;
        Ok(emitter.on(event_type, listener))
    }
}

impl Publisher for EmitterPublisher {
    fn publish(&self, event: ChangeEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(&event)?;
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| PublishError::LockPoisoned("publish"))?;
        emitter.emit(event.event_type(), payload);
        Ok(())
    }
}
