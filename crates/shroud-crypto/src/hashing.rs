//! # BLAKE3 Hashing
//!
//! Keyed hashing, key derivation, and XOF output.
//!
//! The XOF helpers back two hot paths in the gateway: fixed-length state-key
//! encoding and pseudorandom padding filler. Both need arbitrary-length
//! deterministic output that is indistinguishable from random without the
//! derivation key.

use blake3::Hasher;

/// BLAKE3 hash output (256-bit).
pub type Hash = [u8; 32];

/// Stateful BLAKE3 hasher.
pub struct Blake3Hasher {
    inner: Hasher,
}

impl Blake3Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Hasher::new(),
        }
    }

    /// Create keyed hasher (for MAC).
    pub fn new_keyed(key: &[u8; 32]) -> Self {
        Self {
            inner: Hasher::new_keyed(key),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(&self) -> Hash {
        let hash = self.inner.finalize();
        *hash.as_bytes()
    }

    /// Finalize into an arbitrary-length output buffer.
    pub fn finalize_xof_into(&self, out: &mut [u8]) {
        self.inner.finalize_xof().fill(out);
    }

    /// Reset hasher for reuse.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Keyed hash (MAC). Digest equality on `blake3::Hash` is constant-time;
/// compare via [`digests_equal`] when the inputs are secrets.
pub fn blake3_keyed_hash(key: &[u8; 32], data: &[u8]) -> Hash {
    *blake3::keyed_hash(key, data).as_bytes()
}

/// Derive key from context and input key material.
pub fn blake3_derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    let mut hasher = Hasher::new_derive_key(context);
    hasher.update(key_material);
    let hash = hasher.finalize();
    output.copy_from_slice(hash.as_bytes());
    output
}

/// Derive an arbitrary-length output from a context string, a key, and data.
///
/// The context string domain-separates the derivation so that outputs for
/// different purposes (state keys, decoy keys, filler) can never collide.
pub fn blake3_derive_xof(context: &str, key: &[u8; 32], data: &[u8], out: &mut [u8]) {
    let mut hasher = Hasher::new_keyed(key);
    hasher.update(context.as_bytes());
    hasher.update(&(context.len() as u64).to_be_bytes());
    hasher.update(data);
    hasher.finalize_xof().fill(out);
}

/// Constant-time equality of two 256-bit digests.
pub fn digests_equal(a: &Hash, b: &Hash) -> bool {
    // blake3::Hash implements constant-time PartialEq against [u8; 32]
    blake3::Hash::from(*a) == *b
}
