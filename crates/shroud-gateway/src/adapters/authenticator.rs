//! # Token Authenticator
//!
//! Capability-token check for Query invocations. Only a BLAKE3 digest of
//! the granted token is held; verification hashes the presented token and
//! compares digests in constant time, so neither token bytes nor comparison
//! timing leak.

use crate::domain::value_objects::CapabilityToken;
use crate::ports::outbound::QueryAuthenticator;
use shroud_crypto::{blake3_hash, digests_equal, Hash};

/// Digest-based capability authenticator.
pub struct TokenAuthenticator {
    digest: Hash,
}

impl TokenAuthenticator {
    /// Creates an authenticator granting access to holders of `token`.
    #[must_use]
    pub fn new(token: &CapabilityToken) -> Self {
        Self {
            digest: blake3_hash(token.as_bytes()),
        }
    }

    /// Creates an authenticator from a stored token digest.
    #[must_use]
    pub fn from_digest(digest: Hash) -> Self {
        Self { digest }
    }
}

impl QueryAuthenticator for TokenAuthenticator {
    fn authorize(&self, token: &CapabilityToken) -> bool {
        digests_equal(&self.digest, &blake3_hash(token.as_bytes()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
