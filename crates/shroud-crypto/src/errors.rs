//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Sealing failed
    #[error("Sealing failed: {0}")]
    SealFailed(String),

    /// Opening a sealed envelope failed (wrong key, tampering, truncation)
    #[error("Opening failed: {0}")]
    OpenFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Ciphertext shorter than the authentication tag
    #[error("Ciphertext too short: {len} < {min} bytes")]
    CiphertextTooShort {
        /// Actual ciphertext length in bytes
        len: usize,
        /// Minimum valid length in bytes
        min: usize,
    },

    /// Invalid input for cryptographic operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
