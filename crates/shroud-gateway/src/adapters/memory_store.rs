//! # In-Memory Store
//!
//! In-memory state store implementation for testing and single-process
//! deployments. Production deployments adapt the host chain's storage
//! behind the same port.

use crate::domain::value_objects::FixedKey;
use crate::errors::StoreError;
use crate::ports::outbound::StateStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<FixedKey, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("store lock poisoned").len()
    }

    /// Returns true when the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lengths of all stored keys, for observability assertions in tests.
    #[must_use]
    pub fn key_lengths(&self) -> Vec<usize> {
        self.entries
            .read()
            .expect("store lock poisoned")
            .keys()
            .map(FixedKey::len)
            .collect()
    }

    /// Lengths of all stored values, for observability assertions in tests.
    #[must_use]
    pub fn value_lengths(&self) -> Vec<usize> {
        self.entries
            .read()
            .expect("store lock poisoned")
            .values()
            .map(Vec::len)
            .collect()
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn get(&self, key: &FixedKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .entries
            .read()
            .map_err(|_| StoreError::Unavailable)?
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &FixedKey, value: Vec<u8>) -> Result<(), StoreError> {
        self.entries
            .write()
            .map_err(|_| StoreError::Unavailable)?
            .insert(key.clone(), value);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
