//! In-memory change bus for single-process deployments and tests.

use std::sync::{Arc, Mutex, RwLock};

use super::{ChangeEvent, PublishError, Publisher, Subscriber};

/// Append-only event log shared by every clone, with a read position per
/// subscriber.
///
/// ```
/// use store_registry::bus::{ChangeBus, ChangeEvent, Publisher, Subscriber};
///
/// let bus = ChangeBus::new();
/// let tab_a = bus.new_subscriber();
/// let tab_b = bus.new_subscriber();
///
/// bus.publish(ChangeEvent::storage_changed("eshro_stores")).unwrap();
///
/// assert_eq!(tab_a.drain().unwrap().len(), 1);
/// assert_eq!(tab_b.drain().unwrap().len(), 1);
/// assert!(tab_a.poll().unwrap().is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ChangeBus {
    log: Arc<RwLock<Vec<ChangeEvent>>>,
    position: Arc<Mutex<usize>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A subscriber over the same log, starting from the beginning.
    pub fn new_subscriber(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            position: Arc::new(Mutex::new(0)),
        }
    }

    /// A subscriber over the same log that only sees events published from
    /// now on.
    pub fn subscribe_from_now(&self) -> Result<Self, PublishError> {
        let len = self.len()?;
        Ok(Self {
            log: Arc::clone(&self.log),
            position: Arc::new(Mutex::new(len)),
        })
    }

    pub fn events(&self) -> Result<Vec<ChangeEvent>, PublishError> {
        let log = self
            .log
            .read()
            .map_err(|_| PublishError::LockPoisoned("events"))?;
        Ok(log.clone())
    }

    pub fn event_types(&self) -> Result<Vec<&'static str>, PublishError> {
        let log = self
            .log
            .read()
            .map_err(|_| PublishError::LockPoisoned("event_types"))?;
        Ok(log.iter().map(ChangeEvent::event_type).collect())
    }

    pub fn len(&self) -> Result<usize, PublishError> {
        let log = self
            .log
            .read()
            .map_err(|_| PublishError::LockPoisoned("len"))?;
        Ok(log.len())
    }

    pub fn is_empty(&self) -> Result<bool, PublishError> {
        Ok(self.len()? == 0)
    }
}

impl Publisher for ChangeBus {
    fn publish(&self, event: ChangeEvent) -> Result<(), PublishError> {
        let mut log = self
            .log
            .write()
            .map_err(|_| PublishError::LockPoisoned("publish"))?;
        log.push(event);
        Ok(())
    }

    fn publish_batch(&self, events: Vec<ChangeEvent>) -> Result<(), PublishError> {
        let mut log = self
            .log
            .write()
            .map_err(|_| PublishError::LockPoisoned("publish_batch"))?;
        log.extend(events);
        Ok(())
    }
}

impl Subscriber for ChangeBus {
    fn poll(&self) -> Result<Option<ChangeEvent>, PublishError> {
        let log = self
            .log
            .read()
            .map_err(|_| PublishError::LockPoisoned("poll"))?;
        let mut position = self
            .position
            .lock()
            .map_err(|_| PublishError::LockPoisoned("poll"))?;

        match log.get(*position) {
            Some(event) => {
                *position += 1;
                Ok(Some(event.clone()))
            }
            None => Ok(None),
        }
    }
}
