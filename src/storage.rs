//! # Storage
//!
//! The engine's state lives in named slots of a key-value blob store owned by
//! the host. Each slot holds one whole collection as JSON; every mutation
//! rewrites the full collection. Writes to different slots are not atomic
//! together.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

pub const CART_SLOT: &str = "foodhub-cart";
pub const ORDERS_SLOT: &str = "foodhub-orders";
pub const REVIEWS_SLOT: &str = "foodhub-reviews";
pub const USER_SLOT: &str = "foodhub-user";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Corrupt data in slot {slot}: {message}")]
    Corrupt { slot: String, message: String },
    #[error("Serialization error in slot {slot}: {message}")]
    Serialization { slot: String, message: String },
}

/// Read/write contract of the host's blob store.
pub trait StateStore: Send + Sync {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, slot: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, slot: &str) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn StateStore>;

/// In-process store, used by the demo binary and the tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl StateStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.read().get(slot).cloned())
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        self.slots.write().insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StoreError> {
        self.slots.write().remove(slot);
        Ok(())
    }
}

/// Reads and decodes a slot. An absent slot yields `None`.
pub fn load_slot<T: DeserializeOwned>(store: &dyn StateStore, slot: &str) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.read(slot)? else {
        debug!(slot, "Slot empty");
        return Ok(None);
    };
    serde_json::from_str(&raw).map(Some).map_err(|e| StoreError::Corrupt {
        slot: slot.to_string(),
        message: e.to_string(),
    })
}

/// Encodes and writes a whole collection to a slot.
pub fn save_slot<T: Serialize + ?Sized>(store: &dyn StateStore, slot: &str, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialization {
        slot: slot.to_string(),
        message: e.to_string(),
    })?;
    store.write(slot, &raw)
}

/// Writes after a mutation has already been committed in memory. A failure is
/// logged and swallowed; the operation that triggered it has succeeded.
pub fn persist_committed<T: Serialize + ?Sized>(store: &dyn StateStore, slot: &str, value: &T) {
    if let Err(e) = save_slot(store, slot, value) {
        error!(slot, error = %e, "Failed to persist slot");
    }
}
