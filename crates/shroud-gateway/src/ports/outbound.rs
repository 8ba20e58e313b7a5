//! # Driven Ports (SPI - Outbound)
//!
//! The external collaborators the gateway depends on:
//! - the key-value store (addressed only by fixed-length keys),
//! - contract logic (a pure function of decoded input + read state),
//! - the sealing boundary (authenticated encryption, no padding of its own),
//! - the query capability authenticator.
//!
//! I/O collaborators are async; pure CPU collaborators are sync.

use crate::domain::entities::{ContractEffects, StateView};
use crate::domain::value_objects::{CapabilityToken, ClassId, EntryKind, FixedKey};
use crate::errors::{LogicError, StoreError};
use async_trait::async_trait;
use shroud_crypto::CryptoError;

// =============================================================================
// STATE STORE
// =============================================================================

/// Interface to the external key-value store.
///
/// The gateway never issues variable-length keys: every key crossing this
/// boundary is a fixed-length output of the key normalizer, and every value
/// is canonically padded and sealed, so the store observes constant shapes.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the value at a fixed key, if present.
    async fn get(&self, key: &FixedKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store a value at a fixed key.
    async fn set(&self, key: &FixedKey, value: Vec<u8>) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn get(&self, key: &FixedKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &FixedKey, value: Vec<u8>) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }
}

// =============================================================================
// CONTRACT LOGIC
// =============================================================================

/// Decoded input handed to contract logic.
#[derive(Clone, Debug)]
pub struct ExecutionInput {
    /// Entry point invoked.
    pub entry: EntryKind,
    /// Invocation class recovered from the call envelope.
    pub class: ClassId,
    /// Class-specific body.
    pub body: serde_json::Value,
    /// State values collected by the plan's read phase.
    pub view: StateView,
}

/// Interface to enclave-hosted contract logic.
///
/// Invoked exactly once per gateway call. Logic is a pure function of the
/// input: it performs no I/O of its own — every read it needs arrives in the
/// state view, and every write and output it produces is reconciled against
/// the class plan by the sequencer. A write or output the plan does not
/// schedule is a fatal plan violation.
#[async_trait]
pub trait ContractLogic: Send + Sync {
    /// Execute the contract for one invocation.
    async fn execute(&self, input: ExecutionInput) -> Result<ContractEffects, LogicError>;
}

// =============================================================================
// SEALING BOUNDARY
// =============================================================================

/// Interface to the encryption boundary.
///
/// The underlying scheme is an authenticated cipher with no padding of its
/// own (plaintext length is exactly what ciphertext length reveals), so the
/// gateway pads on the plaintext side before calling `seal`. Implementations
/// bind the contract's associated data internally.
pub trait Sealer: Send + Sync {
    /// Seal a canonically padded plaintext.
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Open a sealed envelope.
    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Constant ciphertext overhead the scheme adds to every envelope.
    fn overhead(&self) -> usize;
}

// =============================================================================
// QUERY AUTHENTICATION
// =============================================================================

/// Capability check for Query invocations.
///
/// Queries carry no trusted sender identity, so access control is a
/// polymorphic credential check, not an identity comparison.
pub trait QueryAuthenticator: Send + Sync {
    /// Returns true when the presented token grants query access.
    fn authorize(&self, token: &CapabilityToken) -> bool;
}

// =============================================================================
// TESTS
// =============================================================================
