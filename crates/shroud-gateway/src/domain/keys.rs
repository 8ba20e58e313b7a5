//! # Key Normalizer
//!
//! Rewrites variable-length logical state keys into fixed-length on-store
//! keys, so key length carries no signal about which state a contract
//! touched.
//!
//! Encoding is scope-keyed BLAKE3 XOF output truncated to the shape's
//! `key_len`. A fixed-length image of an unbounded domain cannot be strictly
//! injective, so the normalizer provides cryptographic collision resistance
//! instead; manifest validation keeps `key_len` at or above eight bytes, and
//! the gateway treats any observed collision as fatal state corruption.
//!
//! Decoy keys for dummy write slots derive from a separate BLAKE3 context,
//! so they land in a disjoint region of the key space except with negligible
//! probability.

use crate::domain::entities::StateKeyShape;
use crate::domain::value_objects::{ClassId, FixedKey, LogicalKey};
use crate::errors::KeyError;
use shroud_crypto::blake3_derive_xof;
use std::collections::HashMap;
use std::sync::RwLock;

const STATE_KEY_CONTEXT: &str = "shroud v1 state key";
const DECOY_KEY_CONTEXT: &str = "shroud v1 decoy key";

/// Normalizes logical keys for one shape scope.
pub struct KeyNormalizer {
    scope_key: [u8; 32],
    // Diagnostics only; never consulted on the hot path.
    decode_table: Option<RwLock<HashMap<FixedKey, LogicalKey>>>,
}

impl KeyNormalizer {
    /// Creates a normalizer for the given scope key (part of the contract's
    /// deployment secrets; all replicas share it).
    #[must_use]
    pub fn new(scope_key: [u8; 32]) -> Self {
        Self {
            scope_key,
            decode_table: None,
        }
    }

    /// Enables the decode table: every encoding is recorded so `decode` can
    /// answer, and collisions are detected eagerly. Debugging aid; memory
    /// grows with the number of distinct keys.
    #[must_use]
    pub fn with_decode_table(mut self) -> Self {
        self.decode_table = Some(RwLock::new(HashMap::new()));
        self
    }

    /// Encodes a logical key to the shape's fixed length.
    ///
    /// # Errors
    ///
    /// * `KeyError::EmptyKey` for the empty key.
    /// * `KeyError::KeyTooLong` when the key exceeds the shape's capacity.
    /// * `KeyError::Collision` when the decode table is enabled and a
    ///   distinct logical key already maps to the same fixed key.
    pub fn encode(&self, key: &LogicalKey, shape: &StateKeyShape) -> Result<FixedKey, KeyError> {
        if key.is_empty() {
            return Err(KeyError::EmptyKey);
        }
        if key.len() > shape.max_logical_len {
            return Err(KeyError::KeyTooLong {
                len: key.len(),
                max: shape.max_logical_len,
            });
        }

        let mut out = vec![0u8; shape.key_len];
        blake3_derive_xof(STATE_KEY_CONTEXT, &self.scope_key, key.as_bytes(), &mut out);
        let fixed = FixedKey::new(out);

        if let Some(table) = &self.decode_table {
            let mut table = table.write().expect("decode table lock poisoned");
            if let Some(existing) = table.get(&fixed) {
                if existing != key {
                    return Err(KeyError::Collision {
                        existing: existing.clone(),
                        incoming: key.clone(),
                    });
                }
            } else {
                table.insert(fixed.clone(), key.clone());
            }
        }

        Ok(fixed)
    }

    /// Derives the decoy key for a dummy write at the given plan slot. Same
    /// length as real keys, deterministic per (class, slot), and
    /// domain-separated from real encodings.
    #[must_use]
    pub fn decoy(&self, class: &ClassId, slot: usize, shape: &StateKeyShape) -> FixedKey {
        let mut material = Vec::with_capacity(class.as_str().len() + 8);
        material.extend_from_slice(class.as_str().as_bytes());
        material.extend_from_slice(&(slot as u64).to_be_bytes());

        let mut out = vec![0u8; shape.key_len];
        blake3_derive_xof(DECOY_KEY_CONTEXT, &self.scope_key, &material, &mut out);
        FixedKey::new(out)
    }

    /// Looks a fixed key back up in the decode table. Diagnostics only.
    #[must_use]
    pub fn decode(&self, fixed: &FixedKey) -> Option<LogicalKey> {
        let table = self.decode_table.as_ref()?;
        let table = table.read().expect("decode table lock poisoned");
        table.get(fixed).cloned()
    }
}

// =============================================================================
// TESTS
// =============================================================================
