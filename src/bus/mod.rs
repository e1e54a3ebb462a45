//! Change bus - explicit message passing between registry instances.
//!
//! Registry refreshes are driven by [`ChangeEvent`]s instead of ambient
//! runtime events. Producers publish, consumers poll at their own pace.
//!
//! ```text
//! ┌────────────────┐   StorageChanged   ┌───────────────┐
//! │ NotifyingStore │ ─────────────────▶ │               │
//! └────────────────┘                    │               │
//! ┌────────────────┐   StoreCreated     │   ChangeBus   │ ──poll──▶ StoreRegistry::pump
//! │  application   │ ─────────────────▶ │ (append log)  │
//! └────────────────┘                    │               │
//! ┌────────────────┐   RegistryChanged  │               │
//! │ StoreRegistry  │ ─────────────────▶ │               │
//! └────────────────┘                    └───────────────┘
//! ```
//!
//! With the `emitter` feature, [`EmitterPublisher`] forwards the same events
//! to callback-style listeners.

mod change_bus;
#[cfg(feature = "emitter")]
mod emitter;
mod event;

pub use change_bus::ChangeBus;
#[cfg(feature = "emitter")]
pub use emitter::EmitterPublisher;
pub use event::ChangeEvent;

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("bus lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Push side of the bus.
pub trait Publisher: Send + Sync {
    fn publish(&self, event: ChangeEvent) -> Result<(), PublishError>;

    /// Publish several events. Stops at the first failure.
    fn publish_batch(&self, events: Vec<ChangeEvent>) -> Result<(), PublishError> {
        for event in events {
            self.publish(event)?;
        }
        Ok(())
    }
}

/// Pull side of the bus. Non-blocking.
pub trait Subscriber: Send + Sync {
    /// The next unseen event, if any.
    fn poll(&self) -> Result<Option<ChangeEvent>, PublishError>;

    /// Every unseen event, in publish order.
    fn drain(&self) -> Result<Vec<ChangeEvent>, PublishError> {
        let mut events = Vec::new();
        while let Some(event) = self.poll()? {
            events.push(event);
        }
        Ok(events)
    }
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    fn publish(&self, event: ChangeEvent) -> Result<(), PublishError> {
        (**self).publish(event)
    }

    fn publish_batch(&self, events: Vec<ChangeEvent>) -> Result<(), PublishError> {
        (**self).publish_batch(events)
    }
}
