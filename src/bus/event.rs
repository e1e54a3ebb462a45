use serde::{Deserialize, Serialize};

use crate::record::StoreRecord;

/// Something the registry may need to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    /// A store was just created locally; carries the new record.
    StoreCreated { record: StoreRecord },
    /// Shared storage was written by another tab or process. `None` means
    /// "unknown key", e.g. the whole store was cleared.
    StorageChanged { key: Option<String> },
    /// A registry republished; carries the new record count.
    RegistryChanged { count: usize },
}

impl ChangeEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ChangeEvent::StoreCreated { .. } => "StoreCreated",
            ChangeEvent::StorageChanged { .. } => "StorageChanged",
            ChangeEvent::RegistryChanged { .. } => "RegistryChanged",
        }
    }

    pub fn storage_changed(key: impl Into<String>) -> Self {
        ChangeEvent::StorageChanged {
            key: Some(key.into()),
        }
    }
}
