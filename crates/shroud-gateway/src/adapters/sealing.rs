//! # AES-SIV Sealer
//!
//! Sealing-boundary adapter over `shroud-crypto`'s deterministic AES-256-SIV.
//! Binds the contract's seal context as associated data, so envelopes from
//! one contract version cannot be replayed into another.

use crate::ports::outbound::Sealer;
use shroud_crypto::{open, seal, CryptoError, SealKey, SIV_OVERHEAD};

/// Deterministic AES-SIV sealer for one contract version.
pub struct SivSealer {
    key: SealKey,
    context: Vec<u8>,
}

impl SivSealer {
    /// Creates a sealer with the given key and contract seal context.
    #[must_use]
    pub fn new(key: SealKey, context: Vec<u8>) -> Self {
        Self { key, context }
    }
}

impl Sealer for SivSealer {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        seal(&self.key, &self.context, plaintext)
    }

    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        open(&self.key, &self.context, ciphertext)
    }

    fn overhead(&self) -> usize {
        SIV_OVERHEAD
    }
}

// =============================================================================
// TESTS
// =============================================================================
