//! # Padding Codec
//!
//! Pads plaintext to canonical sizes before sealing and recovers it after
//! opening. The sealing boundary (AES-SIV) adds no padding of its own, so
//! every byte of size normalization happens here, on the plaintext side.
//!
//! Layout of a padded buffer of canonical size `n`:
//!
//! ```text
//! [ len: u32 BE | payload (len bytes) | filler (n - 4 - len bytes) ]
//! ```
//!
//! The length prefix lives *inside* the padded region, so its presence never
//! varies the observable size. Filler is keyed-BLAKE3 XOF output derived from
//! the payload: deterministic (replicated enclaves sealing with AES-SIV must
//! agree bit-for-bit) yet indistinguishable from random without the filler
//! key, so filler bytes exhibit no compressible pattern.

use crate::errors::CodecError;
use shroud_crypto::blake3_derive_xof;

/// Bytes reserved for the embedded length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

const FILLER_CONTEXT: &str = "shroud v1 padding filler";

/// Pads and unpads values against canonical sizes.
pub struct PaddingCodec {
    filler_key: [u8; 32],
}

impl PaddingCodec {
    /// Creates a codec with the given filler key. The key is part of the
    /// contract's deployment secrets; all replicas share it.
    #[must_use]
    pub fn new(filler_key: [u8; 32]) -> Self {
        Self { filler_key }
    }

    /// Usable payload capacity of a canonical size.
    #[must_use]
    pub fn capacity_of(canonical_size: usize) -> usize {
        canonical_size.saturating_sub(LENGTH_PREFIX_LEN)
    }

    /// Pads `plaintext` to exactly `canonical_size` bytes.
    ///
    /// Deterministic in (key, plaintext, size).
    ///
    /// # Errors
    ///
    /// * `CodecError::ShapeTooSmall` when the canonical size cannot hold the
    ///   length prefix.
    /// * `CodecError::OversizeInput` when the plaintext exceeds capacity.
    ///   Fatal by design: truncation would be content-dependent and
    ///   observable.
    pub fn pad(&self, plaintext: &[u8], canonical_size: usize) -> Result<Vec<u8>, CodecError> {
        if canonical_size <= LENGTH_PREFIX_LEN {
            return Err(CodecError::ShapeTooSmall {
                size: canonical_size,
                min: LENGTH_PREFIX_LEN + 1,
            });
        }
        let capacity = canonical_size - LENGTH_PREFIX_LEN;
        if plaintext.len() > capacity {
            return Err(CodecError::OversizeInput {
                len: plaintext.len(),
                capacity,
            });
        }

        let mut padded = vec![0u8; canonical_size];
        let body_end = LENGTH_PREFIX_LEN + plaintext.len();
        padded[..LENGTH_PREFIX_LEN].copy_from_slice(&(plaintext.len() as u32).to_be_bytes());
        padded[LENGTH_PREFIX_LEN..body_end].copy_from_slice(plaintext);

        let (body, filler) = padded.split_at_mut(body_end);
        if !filler.is_empty() {
            blake3_derive_xof(FILLER_CONTEXT, &self.filler_key, body, filler);
        }

        Ok(padded)
    }

    /// Recovers the original plaintext from a padded buffer.
    ///
    /// # Errors
    ///
    /// * `CodecError::TruncatedBuffer` when the buffer cannot hold a prefix.
    /// * `CodecError::LengthOutOfRange` when the prefix points past the end.
    pub fn unpad(&self, padded: &[u8]) -> Result<Vec<u8>, CodecError> {
        if padded.len() < LENGTH_PREFIX_LEN {
            return Err(CodecError::TruncatedBuffer { len: padded.len() });
        }
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        prefix.copy_from_slice(&padded[..LENGTH_PREFIX_LEN]);
        let declared = u32::from_be_bytes(prefix) as usize;
        let available = padded.len() - LENGTH_PREFIX_LEN;
        if declared > available {
            return Err(CodecError::LengthOutOfRange {
                declared,
                available,
            });
        }
        Ok(padded[LENGTH_PREFIX_LEN..LENGTH_PREFIX_LEN + declared].to_vec())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> PaddingCodec {
        PaddingCodec::new([42u8; 32])
    }

    #[test]
    fn test_roundtrip() {
        let codec = codec();
        for payload in [&b""[..], b"x", b"hello", &[0u8; 28]] {
            let padded = codec.pad(payload, 32).unwrap();
            assert_eq!(padded.len(), 32);
            assert_eq!(codec.unpad(&padded).unwrap(), payload);
        }
    }

    #[test]
    fn test_exact_capacity_fits() {
        let codec = codec();
        let payload = vec![7u8; 28];
        let padded = codec.pad(&payload, 32).unwrap();
        assert_eq!(codec.unpad(&padded).unwrap(), payload);
    }

    #[test]
    fn test_oversize_is_error_never_truncation() {
        let codec = codec();
        let payload = vec![7u8; 29];
        let result = codec.pad(&payload, 32);
        assert!(matches!(
            result,
            Err(CodecError::OversizeInput {
                len: 29,
                capacity: 28
            })
        ));
    }

    #[test]
    fn test_shape_too_small() {
        let codec = codec();
        assert!(matches!(
            codec.pad(b"", 4),
            Err(CodecError::ShapeTooSmall { size: 4, min: 5 })
        ));
    }

    #[test]
    fn test_padding_is_deterministic() {
        let codec = codec();
        let a = codec.pad(b"payload", 64).unwrap();
        let b = codec.pad(b"payload", 64).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_filler_depends_on_payload() {
        let codec = codec();
        let a = codec.pad(b"payload-a", 64).unwrap();
        let b = codec.pad(b"payload-b", 64).unwrap();
        // Same length, different filler region
        assert_eq!(a.len(), b.len());
        assert_ne!(a[13..], b[13..]);
    }

    #[test]
    fn test_filler_depends_on_key() {
        let a = PaddingCodec::new([1u8; 32]).pad(b"payload", 64).unwrap();
        let b = PaddingCodec::new([2u8; 32]).pad(b"payload", 64).unwrap();
        assert_ne!(a, b);
        // Payload region is identical, only filler differs
        assert_eq!(a[..11], b[..11]);
    }

    #[test]
    fn test_filler_is_not_zero() {
        let codec = codec();
        let padded = codec.pad(b"x", 64).unwrap();
        assert!(padded[5..].iter().any(|&b| b != 0));
    }

    #[test]
    fn test_unpad_rejects_truncated_buffer() {
        let codec = codec();
        assert!(matches!(
            codec.unpad(&[0u8; 2]),
            Err(CodecError::TruncatedBuffer { len: 2 })
        ));
    }

    #[test]
    fn test_unpad_rejects_out_of_range_length() {
        let codec = codec();
        let mut padded = codec.pad(b"ok", 16).unwrap();
        padded[..4].copy_from_slice(&100u32.to_be_bytes());
        assert!(matches!(
            codec.unpad(&padded),
            Err(CodecError::LengthOutOfRange {
                declared: 100,
                available: 12
            })
        ));
    }
}
