//! # Deterministic Sealing
//!
//! AES-256-SIV authenticated encryption for the sealing boundary.
//!
//! ## Security Properties
//!
//! - Deterministic: identical (key, aad, plaintext) produces identical
//!   ciphertext, so replicated enclaves agree bit-for-bit.
//! - Misuse-resistant: no nonce to manage or repeat.
//! - No padding: ciphertext length is plaintext length plus a constant
//!   16-byte synthetic IV. Size normalization is the caller's job and must
//!   happen on the plaintext side.

use crate::CryptoError;
use aes_siv::{siv::Aes256Siv, KeyInit};
use zeroize::Zeroize;

/// Constant ciphertext overhead added by AES-SIV (the synthetic IV / tag).
pub const SIV_OVERHEAD: usize = 16;

/// AES-256-SIV key (512-bit: two AES-256 subkeys).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SealKey([u8; 64]);

impl SealKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking length.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` when the slice is not 64 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        if slice.len() != 64 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 64,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 64];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Seal plaintext under the key, binding the associated data.
///
/// # Errors
///
/// Returns `CryptoError::SealFailed` if encryption fails.
pub fn seal(key: &SealKey, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut cipher = Aes256Siv::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::SealFailed(e.to_string()))?;

    cipher
        .encrypt([aad], plaintext)
        .map_err(|e| CryptoError::SealFailed(e.to_string()))
}

/// Open a sealed envelope, authenticating the associated data.
///
/// # Errors
///
/// Returns `CryptoError::OpenFailed` on wrong key, tampering, or mismatched
/// associated data; `CryptoError::CiphertextTooShort` if the envelope cannot
/// even contain the tag.
pub fn open(key: &SealKey, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < SIV_OVERHEAD {
        return Err(CryptoError::CiphertextTooShort {
            len: ciphertext.len(),
            min: SIV_OVERHEAD,
        });
    }

    let mut cipher = Aes256Siv::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::OpenFailed(e.to_string()))?;

    cipher
        .decrypt([aad], ciphertext)
        .map_err(|e| CryptoError::OpenFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let key = SealKey::generate();
        let plaintext = b"Hello, Shroud!";

        let sealed = seal(&key, b"ctx", plaintext).unwrap();
        let opened = open(&key, b"ctx", &sealed).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_deterministic_sealing() {
        let key = SealKey::from_bytes([3u8; 64]);
        let a = seal(&key, b"ctx", b"payload").unwrap();
        let b = seal(&key, b"ctx", b"payload").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_overhead() {
        let key = SealKey::generate();
        for len in [0usize, 1, 16, 32, 255] {
            let plaintext = vec![0xABu8; len];
            let sealed = seal(&key, b"", &plaintext).unwrap();
            assert_eq!(sealed.len(), len + SIV_OVERHEAD);
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = SealKey::generate();
        let key2 = SealKey::generate();

        let sealed = seal(&key1, b"ctx", b"secret").unwrap();
        assert!(open(&key2, b"ctx", &sealed).is_err());
    }

    #[test]
    fn test_wrong_aad_fails() {
        let key = SealKey::generate();
        let sealed = seal(&key, b"ctx-a", b"secret").unwrap();
        assert!(open(&key, b"ctx-b", &sealed).is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SealKey::generate();
        let mut sealed = seal(&key, b"ctx", b"secret").unwrap();
        sealed[0] ^= 0xFF;
        assert!(open(&key, b"ctx", &sealed).is_err());
    }

    #[test]
    fn test_too_short_rejected() {
        let key = SealKey::generate();
        let result = open(&key, b"", &[0u8; 8]);
        assert!(matches!(
            result,
            Err(CryptoError::CiphertextTooShort { len: 8, min: 16 })
        ));
    }

    #[test]
    fn test_key_from_slice_length_check() {
        assert!(SealKey::from_slice(&[0u8; 64]).is_ok());
        assert!(matches!(
            SealKey::from_slice(&[0u8; 32]),
            Err(CryptoError::InvalidKeyLength {
                expected: 64,
                actual: 32
            })
        ));
    }
}
