//! # Shroud Crypto - Sealing-Boundary Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `sealing` | AES-256-SIV | Deterministic authenticated sealing |
//! | `hashing` | BLAKE3 | Fixed keys, decoys, padding filler |
//!
//! ## Security Properties
//!
//! - **AES-SIV**: deterministic AEAD, misuse-resistant, adds a constant
//!   16-byte tag and no length padding of its own — the plaintext length is
//!   exactly what the ciphertext length reveals. Callers normalize plaintext
//!   sizes *before* crossing this boundary.
//! - **BLAKE3**: keyed hashing and XOF output for fixed-length key encoding
//!   and pseudorandom padding filler; constant-time digest equality.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod sealing;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{
    blake3_derive_key, blake3_derive_xof, blake3_hash, blake3_keyed_hash, digests_equal,
    Blake3Hasher, Hash,
};
pub use sealing::{open, seal, SealKey, SIV_OVERHEAD};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
