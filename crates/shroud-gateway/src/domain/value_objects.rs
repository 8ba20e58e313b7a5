//! # Value Objects
//!
//! Immutable domain primitives for I/O normalization.
//! These types represent concepts that are defined by their value, not identity.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// INVOCATION CLASS
// =============================================================================

/// Identifier of an invocation class: one logical entry-point variant whose
/// execution shape is normalized (e.g. `"send"`, `"transfer"`, `"init"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    /// Creates a class id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// ENTRY KIND
// =============================================================================

/// The three gateway entry points, mirroring the enclave contract taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// State bootstrap; runs against an empty store.
    Init,
    /// State-mutating, fee-bearing invocation.
    Handle,
    /// Read-only, gas-metered but feeless invocation, authenticated by a
    /// capability token rather than a caller identity.
    Query,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Handle => f.write_str("handle"),
            Self::Query => f.write_str("query"),
        }
    }
}

// =============================================================================
// STATE KEYS
// =============================================================================

/// A logical state-key name as used by contract logic (variable length).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalKey(String);

impl LogicalKey {
    /// Creates a logical key.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the key name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalKey({})", self.0)
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A fixed-length on-store key produced by the key normalizer.
///
/// The store is addressed only by fixed keys; their length is constant for
/// all keys used during one invocation, so key length carries no signal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedKey(Vec<u8>);

impl FixedKey {
    /// Wraps already-normalized key bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for a zero-length key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for FixedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedKey(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// CAPABILITY TOKEN
// =============================================================================

/// Query-authentication credential.
///
/// Queries carry no trusted caller identity; access control is a credential
/// check against this token. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CapabilityToken(Vec<u8>);

impl CapabilityToken {
    /// Creates a token from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the token bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CapabilityToken(..)")
    }
}

impl From<&str> for CapabilityToken {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

// =============================================================================
// OPERATION KINDS
// =============================================================================

/// Kind of an abstract operation slot in an access plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// State read.
    Read,
    /// State write.
    Write,
    /// Output emission.
    Emit,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
            Self::Emit => f.write_str("emit"),
        }
    }
}

/// Output channel of an emit slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputChannel {
    /// Outbound message / callback.
    Message,
    /// Log / event entry.
    Log,
}

impl fmt::Display for OutputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message => f.write_str("message"),
            Self::Log => f.write_str("log"),
        }
    }
}

// =============================================================================
// OBSERVABLE TRACE
// =============================================================================

/// One externally observable operation: what a monitor outside the enclave
/// can see of a state access or output emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObservedOp {
    /// Operation kind.
    pub kind: OpKind,
    /// Length of the key handed to the store (0 for emits).
    pub key_len: usize,
    /// Length of the value crossing the boundary.
    pub value_len: usize,
}

impl ObservedOp {
    /// Creates an observed operation record.
    #[must_use]
    pub const fn new(kind: OpKind, key_len: usize, value_len: usize) -> Self {
        Self {
            kind,
            key_len,
            value_len,
        }
    }
}

/// The ordered sequence of observable operations of one invocation.
///
/// Two invocations of the same class must produce equal traces regardless of
/// payloads; this is the property the sequencer exists to enforce.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessTrace(Vec<ObservedOp>);

impl AccessTrace {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an observed operation.
    pub fn push(&mut self, op: ObservedOp) {
        self.0.push(op);
    }

    /// Returns the recorded operations in order.
    #[must_use]
    pub fn ops(&self) -> &[ObservedOp] {
        &self.0
    }

    /// Number of recorded operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact digest of the trace for byte-for-byte comparison across runs.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(self.0.len() * 9);
        for op in &self.0 {
            encoded.push(match op.kind {
                OpKind::Read => 0u8,
                OpKind::Write => 1u8,
                OpKind::Emit => 2u8,
            });
            encoded.extend_from_slice(&(op.key_len as u32).to_be_bytes());
            encoded.extend_from_slice(&(op.value_len as u32).to_be_bytes());
        }
        shroud_crypto::blake3_hash(&encoded)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id_display() {
        let class = ClassId::new("transfer");
        assert_eq!(class.as_str(), "transfer");
        assert_eq!(class.to_string(), "transfer");
    }

    #[test]
    fn test_entry_kind_serde() {
        let json = serde_json::to_string(&EntryKind::Handle).unwrap();
        assert_eq!(json, "\"handle\"");
        let back: EntryKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EntryKind::Handle);
    }

    #[test]
    fn test_fixed_key_debug_is_hex() {
        let key = FixedKey::new(vec![0xDE, 0xAD]);
        assert_eq!(format!("{key:?}"), "FixedKey(dead)");
    }

    #[test]
    fn test_capability_token_debug_redacted() {
        let token = CapabilityToken::from("hunter2");
        assert_eq!(format!("{token:?}"), "CapabilityToken(..)");
    }

    #[test]
    fn test_trace_equality_and_digest() {
        let mut a = AccessTrace::new();
        let mut b = AccessTrace::new();
        for trace in [&mut a, &mut b] {
            trace.push(ObservedOp::new(OpKind::Read, 8, 48));
            trace.push(ObservedOp::new(OpKind::Write, 8, 48));
            trace.push(ObservedOp::new(OpKind::Emit, 0, 80));
        }
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());

        b.push(ObservedOp::new(OpKind::Emit, 0, 80));
        assert_ne!(a, b);
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_trace_digest_sensitive_to_lengths() {
        let mut a = AccessTrace::new();
        a.push(ObservedOp::new(OpKind::Read, 8, 48));
        let mut b = AccessTrace::new();
        b.push(ObservedOp::new(OpKind::Read, 8, 49));
        assert_ne!(a.digest(), b.digest());
    }
}
