//! # Error Types
//!
//! All error types for the normalization pipeline.
//!
//! Every error here is fatal for the current invocation: nothing is retried,
//! since retrying with the same inputs reproduces the same leak risk, and
//! retrying with altered inputs is a contract-logic decision, not this
//! layer's. Once a plan has begun executing, the gateway converts these into
//! a uniform failure envelope so the failure path has the same observable
//! shape as success.

use crate::domain::value_objects::{ClassId, EntryKind, LogicalKey, OpKind, OutputChannel};
use thiserror::Error;

// =============================================================================
// SHAPE ERRORS
// =============================================================================

/// Errors from the shape registry and deployment manifest.
#[derive(Debug, Error, Clone)]
pub enum ShapeError {
    /// A class was registered twice with different canonical sizes.
    #[error("conflicting shape for class {class}: {existing} != {proposed} bytes")]
    ConflictingShape {
        /// The class being registered.
        class: ClassId,
        /// Canonical size already on record.
        existing: usize,
        /// Conflicting size of the new registration.
        proposed: usize,
    },

    /// Lookup of a class the registry has never seen. Runtime discovery of a
    /// new class is rejected outright: a new class is a new code path, and
    /// admitting one at runtime would itself leak.
    #[error("unknown invocation class: {0}")]
    UnknownClass(ClassId),

    /// The deployment manifest failed validation.
    #[error("invalid deployment manifest: {}", violations.join("; "))]
    InvalidManifest {
        /// Human-readable invariant violations.
        violations: Vec<String>,
    },

    /// A class was invoked through the wrong entry point.
    #[error("class {class} is declared for {declared}, invoked via {requested}")]
    WrongEntryKind {
        /// The class in question.
        class: ClassId,
        /// Entry kind declared in the manifest.
        declared: EntryKind,
        /// Entry kind actually used.
        requested: EntryKind,
    },

    /// Padded input length did not match the class's canonical size.
    #[error("input size mismatch for class {class}: expected {expected}, got {actual} bytes")]
    SizeMismatch {
        /// The class in question.
        class: ClassId,
        /// Canonical size declared by the message shape.
        expected: usize,
        /// Observed padded length.
        actual: usize,
    },
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors from the padding codec.
#[derive(Debug, Error, Clone)]
pub enum CodecError {
    /// Plaintext does not fit the canonical size. Fatal: silently truncating
    /// would itself be content-dependent and observable.
    #[error("oversize input: {len} > {capacity} bytes of padded capacity")]
    OversizeInput {
        /// Plaintext length.
        len: usize,
        /// Usable capacity of the canonical region.
        capacity: usize,
    },

    /// Canonical size too small to hold the embedded length prefix.
    #[error("shape too small: {size} < {min} bytes")]
    ShapeTooSmall {
        /// Declared canonical size.
        size: usize,
        /// Minimum admissible size.
        min: usize,
    },

    /// Buffer shorter than the embedded length prefix.
    #[error("truncated padded buffer: {len} bytes")]
    TruncatedBuffer {
        /// Buffer length.
        len: usize,
    },

    /// Embedded length prefix points beyond the buffer.
    #[error("corrupt padding: declared length {declared} exceeds available {available} bytes")]
    LengthOutOfRange {
        /// Length declared by the prefix.
        declared: usize,
        /// Bytes actually available after the prefix.
        available: usize,
    },
}

// =============================================================================
// KEY ERRORS
// =============================================================================

/// Errors from the key normalizer.
#[derive(Debug, Error, Clone)]
pub enum KeyError {
    /// Logical key exceeds the shape's capacity.
    #[error("key too long: {len} > {max} bytes")]
    KeyTooLong {
        /// Logical key length.
        len: usize,
        /// Maximum admissible logical key length.
        max: usize,
    },

    /// Empty logical keys are not addressable.
    #[error("empty logical key")]
    EmptyKey,

    /// Two distinct logical keys produced the same fixed key. This corrupts
    /// state, not just privacy, and is fatal.
    #[error("fixed-key collision between {existing} and {incoming}")]
    Collision {
        /// Logical key already mapped to the fixed key.
        existing: LogicalKey,
        /// Logical key that collided with it.
        incoming: LogicalKey,
    },
}

// =============================================================================
// PLAN ERRORS
// =============================================================================

/// Plan violations: contract control flow diverged from its declared access
/// plan. Every variant is a `PlanViolation` in the sense of the execution
/// contract — a latent privacy bug in the contract/plan pairing, surfaced to
/// maintainers via `error!` logging, never allowed to leak through silently.
#[derive(Debug, Error, Clone)]
pub enum PlanError {
    /// An operation of the wrong kind was attempted at the current slot.
    #[error("plan violation in class {class} at slot {slot}: scheduled {scheduled}, attempted {attempted}")]
    Violation {
        /// The invocation class.
        class: ClassId,
        /// Zero-based slot index.
        slot: usize,
        /// Operation kind declared for the slot.
        scheduled: OpKind,
        /// Operation kind the contract attempted.
        attempted: OpKind,
    },

    /// An emit targeted a different channel than the slot declares.
    #[error("plan violation in class {class} at slot {slot}: scheduled {scheduled} emit, attempted {attempted} emit")]
    EmitChannelMismatch {
        /// The invocation class.
        class: ClassId,
        /// Zero-based slot index.
        slot: usize,
        /// Channel declared for the slot.
        scheduled: OutputChannel,
        /// Channel the contract attempted.
        attempted: OutputChannel,
    },

    /// An operation was attempted after every slot had executed.
    #[error("plan violation in class {class}: {attempted} attempted past the end of the plan")]
    Exhausted {
        /// The invocation class.
        class: ClassId,
        /// Operation kind attempted.
        attempted: OpKind,
    },

    /// The plan finished with unexecuted slots. A partial plan is a
    /// distinguishing signal, so this aborts the invocation.
    #[error("plan violation in class {class}: only {executed} of {declared} slots executed")]
    Incomplete {
        /// The invocation class.
        class: ClassId,
        /// Slots actually executed.
        executed: usize,
        /// Slots declared by the plan.
        declared: usize,
    },

    /// Contract logic produced a write with no scheduled slot.
    #[error("plan violation in class {class}: unscheduled write to {key}")]
    UnscheduledWrite {
        /// The invocation class.
        class: ClassId,
        /// Logical key of the stray write.
        key: LogicalKey,
    },

    /// Contract logic produced more outputs than the plan schedules.
    #[error("plan violation in class {class}: unscheduled {channel} emission")]
    UnscheduledEmit {
        /// The invocation class.
        class: ClassId,
        /// Channel of the stray output.
        channel: OutputChannel,
    },
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from the external key-value store.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// Store unreachable.
    #[error("state store unavailable")]
    Unavailable,

    /// Store detected corruption.
    #[error("state store corruption detected")]
    Corrupted,

    /// Backend-specific failure.
    #[error("state store error: {0}")]
    Backend(String),
}

// =============================================================================
// LOGIC ERRORS
// =============================================================================

/// Errors surfaced by contract logic itself.
#[derive(Debug, Error, Clone)]
pub enum LogicError {
    /// The contract rejected the invocation (domain-level failure).
    #[error("contract rejected invocation: {0}")]
    Rejected(String),

    /// The contract failed internally.
    #[error("contract internal error: {0}")]
    Internal(String),
}

// =============================================================================
// GATEWAY ERROR
// =============================================================================

/// Aggregate error for one gateway invocation.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Shape registry / manifest failure.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Padding codec failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Key normalizer failure.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Plan violation.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// State store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Contract logic failure.
    #[error(transparent)]
    Logic(#[from] LogicError),

    /// Sealing boundary failure.
    #[error(transparent)]
    Crypto(#[from] shroud_crypto::CryptoError),

    /// Input could not be parsed into a call envelope.
    #[error("malformed call envelope: {0}")]
    Malformed(String),

    /// Query capability check failed.
    #[error("unauthorized query")]
    Unauthorized,

    /// The class's fixed plan cost exceeds the gas limit. Checked before the
    /// plan begins; aborting mid-plan would itself be a signal.
    #[error("out of gas: plan requires {required}, limit {limit}")]
    OutOfGas {
        /// Configured gas limit.
        limit: u64,
        /// Fixed cost of the class plan.
        required: u64,
    },
}

impl GatewayError {
    /// Returns true when the error indicates a plan/contract mismatch that
    /// maintainers must act on, as opposed to a normal runtime fault.
    #[must_use]
    pub fn is_plan_violation(&self) -> bool {
        matches!(self, Self::Plan(_))
    }

    /// Terse, content-free label carried inside sealed failure envelopes.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Shape(_) => "shape",
            Self::Codec(_) => "codec",
            Self::Key(_) => "key",
            Self::Plan(_) => "plan violation",
            Self::Store(_) => "store",
            Self::Logic(_) => "rejected",
            Self::Crypto(_) => "crypto",
            Self::Malformed(_) => "malformed",
            Self::Unauthorized => "unauthorized",
            Self::OutOfGas { .. } => "out of gas",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
