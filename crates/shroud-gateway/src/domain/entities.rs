//! # Core Domain Entities
//!
//! Shapes, access plans, and the deployment manifest: the read-only
//! configuration consulted on every invocation, plus the records that flow
//! through one invocation (state view, contract effects, gateway response).
//!
//! Shapes and plans are fixed at contract deployment and immutable for a
//! given contract version. Nothing here mutates across invocations.

use crate::domain::codec::LENGTH_PREFIX_LEN;
use crate::domain::value_objects::{
    AccessTrace, ClassId, EntryKind, LogicalKey, OpKind, OutputChannel,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// =============================================================================
// SHAPES
// =============================================================================

/// Canonical shape of one message surface.
///
/// All invocation classes sharing an API surface must declare the same
/// `canonical_size`, so ciphertext length cannot distinguish them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageShape {
    /// Exact padded plaintext size in bytes.
    pub canonical_size: usize,
    /// Canonical field order for envelope serialization.
    #[serde(default)]
    pub field_order: Vec<String>,
}

impl MessageShape {
    /// Creates a message shape of the given canonical size.
    #[must_use]
    pub fn new(canonical_size: usize) -> Self {
        Self {
            canonical_size,
            field_order: Vec::new(),
        }
    }

    /// Usable payload capacity: the length prefix lives inside the padded
    /// region so that its presence does not vary the ciphertext size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.canonical_size.saturating_sub(LENGTH_PREFIX_LEN)
    }
}

/// Canonical shape of state keys and values for one class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateKeyShape {
    /// Constant on-store key length in bytes.
    pub key_len: usize,
    /// Maximum admissible logical key length; beyond this, `KeyTooLong`.
    pub max_logical_len: usize,
    /// Canonical padded size of stored values. Every value read or written
    /// under this shape crosses the store boundary at exactly this size
    /// (plus the constant sealing overhead).
    pub value_size: usize,
}

/// Canonical count and size of one output channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelShape {
    /// Number of outputs every invocation of the class emits (real or decoy).
    pub count: usize,
    /// Padded plaintext size of each output.
    pub size: usize,
}

/// Canonical output shape of one invocation class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputShape {
    /// Padded plaintext size of the return value.
    pub return_size: usize,
    /// Outbound message / callback channel.
    pub messages: ChannelShape,
    /// Log / event channel.
    pub logs: ChannelShape,
}

// =============================================================================
// ACCESS PLAN
// =============================================================================

/// One abstract operation slot of an access plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PlanSlot {
    /// Read the declared key. Read slots carry real keys from the union of
    /// all branches, and every read executes on every invocation, so reads
    /// need no dummy variant.
    Read {
        /// Logical key to read.
        key: LogicalKey,
    },
    /// Write the declared key, or a decoy of identical cost shape when the
    /// executed branch did not write it.
    Write {
        /// Logical key the slot is bound to.
        key: LogicalKey,
    },
    /// Emit one output on the declared channel, decoy when the executed
    /// branch produced none.
    Emit {
        /// Target channel.
        channel: OutputChannel,
    },
}

impl PlanSlot {
    /// Operation kind of the slot.
    #[must_use]
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Read { .. } => OpKind::Read,
            Self::Write { .. } => OpKind::Write,
            Self::Emit { .. } => OpKind::Emit,
        }
    }
}

/// Declared operation profile of a single logical branch, used to build the
/// canonical plan for its class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BranchProfile {
    /// Keys the branch reads.
    pub reads: Vec<LogicalKey>,
    /// Keys the branch writes.
    pub writes: Vec<LogicalKey>,
    /// Messages the branch emits.
    pub messages: usize,
    /// Log entries the branch emits.
    pub logs: usize,
}

impl BranchProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a read key.
    #[must_use]
    pub fn reads(mut self, key: impl Into<LogicalKey>) -> Self {
        self.reads.push(key.into());
        self
    }

    /// Adds a written key.
    #[must_use]
    pub fn writes(mut self, key: impl Into<LogicalKey>) -> Self {
        self.writes.push(key.into());
        self
    }

    /// Sets the emitted message count.
    #[must_use]
    pub fn emits_messages(mut self, count: usize) -> Self {
        self.messages = count;
        self
    }

    /// Sets the emitted log count.
    #[must_use]
    pub fn emits_logs(mut self, count: usize) -> Self {
        self.logs = count;
        self
    }
}

/// The fixed, declared sequence of operation slots for one invocation class,
/// including dummy slots for branches not taken.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPlan {
    slots: Vec<PlanSlot>,
}

impl AccessPlan {
    /// Creates a plan from explicit slots.
    #[must_use]
    pub fn new(slots: Vec<PlanSlot>) -> Self {
        Self { slots }
    }

    /// Builds the canonical plan for a class as the union of its branches:
    /// every branch's reads and writes get a slot (first-seen order,
    /// deduplicated), and each channel gets the maximum emit count over all
    /// branches. The longer branch's footprint becomes the plan; shorter
    /// branches execute the surplus slots as dummies.
    #[must_use]
    pub fn union_of(branches: &[BranchProfile]) -> Self {
        let mut reads: Vec<LogicalKey> = Vec::new();
        let mut writes: Vec<LogicalKey> = Vec::new();
        let mut messages = 0usize;
        let mut logs = 0usize;

        for branch in branches {
            for key in &branch.reads {
                if !reads.contains(key) {
                    reads.push(key.clone());
                }
            }
            for key in &branch.writes {
                if !writes.contains(key) {
                    writes.push(key.clone());
                }
            }
            messages = messages.max(branch.messages);
            logs = logs.max(branch.logs);
        }

        let mut slots = Vec::with_capacity(reads.len() + writes.len() + messages + logs);
        slots.extend(reads.into_iter().map(|key| PlanSlot::Read { key }));
        slots.extend(writes.into_iter().map(|key| PlanSlot::Write { key }));
        slots.extend((0..messages).map(|_| PlanSlot::Emit {
            channel: OutputChannel::Message,
        }));
        slots.extend((0..logs).map(|_| PlanSlot::Emit {
            channel: OutputChannel::Log,
        }));

        Self { slots }
    }

    /// The declared slots in execution order.
    #[must_use]
    pub fn slots(&self) -> &[PlanSlot] {
        &self.slots
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true for the empty plan.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The declared kind sequence, the skeleton every execution must follow.
    #[must_use]
    pub fn kind_sequence(&self) -> Vec<OpKind> {
        self.slots.iter().map(PlanSlot::kind).collect()
    }

    /// Index of the first non-read slot (== plan length when the plan is
    /// all reads). Slots before this index form the read phase.
    #[must_use]
    pub fn first_effect_index(&self) -> usize {
        self.slots
            .iter()
            .position(|slot| !matches!(slot, PlanSlot::Read { .. }))
            .unwrap_or(self.slots.len())
    }

    /// Keys of all read slots in declared order.
    pub fn read_keys(&self) -> impl Iterator<Item = &LogicalKey> {
        self.slots.iter().filter_map(|slot| match slot {
            PlanSlot::Read { key } => Some(key),
            _ => None,
        })
    }

    /// Keys of all write slots in declared order.
    pub fn write_keys(&self) -> impl Iterator<Item = &LogicalKey> {
        self.slots.iter().filter_map(|slot| match slot {
            PlanSlot::Write { key } => Some(key),
            _ => None,
        })
    }

    /// Number of emit slots on the given channel.
    #[must_use]
    pub fn emit_count(&self, channel: OutputChannel) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, PlanSlot::Emit { channel: c } if *c == channel))
            .count()
    }
}

// =============================================================================
// DEPLOYMENT MANIFEST
// =============================================================================

/// Full normalization contract for one invocation class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpec {
    /// Entry point this class belongs to.
    pub entry: EntryKind,
    /// Message surface shape.
    pub message: MessageShape,
    /// State key/value shape.
    pub keys: StateKeyShape,
    /// Output shape.
    pub outputs: OutputShape,
    /// Canonical access plan.
    pub plan: AccessPlan,
}

/// Deployment-time configuration: every shape and plan of one contract
/// version. Supplied at deployment, validated fully at load, immutable
/// thereafter; no runtime API mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    /// Contract identifier; bound into the sealing AAD.
    pub contract: String,
    /// Contract version; shapes and plans are versioned with it.
    pub version: u32,
    /// Per-class normalization specs.
    pub classes: BTreeMap<ClassId, ClassSpec>,
}

impl DeploymentManifest {
    /// Creates a manifest.
    #[must_use]
    pub fn new(contract: impl Into<String>, version: u32) -> Self {
        Self {
            contract: contract.into(),
            version,
            classes: BTreeMap::new(),
        }
    }

    /// Adds a class spec (builder-style, deployment-time only).
    #[must_use]
    pub fn with_class(mut self, class: impl Into<ClassId>, spec: ClassSpec) -> Self {
        self.classes.insert(class.into(), spec);
        self
    }

    /// Associated-data string binding sealed envelopes to this contract
    /// version.
    #[must_use]
    pub fn seal_context(&self) -> Vec<u8> {
        format!("shroud/{}/v{}", self.contract, self.version).into_bytes()
    }
}

// =============================================================================
// CALL AND OUTPUT ENVELOPES
// =============================================================================

/// Decrypted call plaintext: the class variant plus its body. The class
/// lives *inside* the sealed envelope — it is recovered only after opening,
/// never visible in routing metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEnvelope {
    /// Invocation class.
    pub class: ClassId,
    /// Class-specific body, decoded by contract logic.
    pub body: serde_json::Value,
}

/// Plaintext framing of one emitted output before padding: a one-byte
/// real/decoy marker followed by the payload. Recipients drop decoys after
/// opening; an outside observer cannot tell them apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputEnvelope {
    /// True when the output carries contract payload.
    pub real: bool,
    /// Payload bytes (empty for decoys).
    pub payload: Vec<u8>,
}

impl OutputEnvelope {
    const MARKER_REAL: u8 = 0x01;
    const MARKER_DECOY: u8 = 0x00;

    /// Wraps a real output payload.
    #[must_use]
    pub fn real(payload: Vec<u8>) -> Self {
        Self {
            real: true,
            payload,
        }
    }

    /// Creates a decoy output.
    #[must_use]
    pub fn decoy() -> Self {
        Self {
            real: false,
            payload: Vec::new(),
        }
    }

    /// Encodes marker + payload for padding.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.push(if self.real {
            Self::MARKER_REAL
        } else {
            Self::MARKER_DECOY
        });
        out.extend_from_slice(&self.payload);
        out
    }

    /// Decodes marker + payload after unpadding.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&marker, payload) = bytes.split_first()?;
        match marker {
            Self::MARKER_REAL => Some(Self::real(payload.to_vec())),
            Self::MARKER_DECOY => Some(Self::decoy()),
            _ => None,
        }
    }
}

/// Plaintext framing of the return value: a status byte plus payload.
/// Failure envelopes have exactly the same padded shape as success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnEnvelope {
    /// True when the invocation succeeded.
    pub ok: bool,
    /// Return payload on success; terse status label on failure.
    pub payload: Vec<u8>,
}

impl ReturnEnvelope {
    const MARKER_OK: u8 = 0x01;
    const MARKER_FAILED: u8 = 0x00;

    /// Successful return.
    #[must_use]
    pub fn ok(payload: Vec<u8>) -> Self {
        Self { ok: true, payload }
    }

    /// Failed return carrying only a content-free status label.
    #[must_use]
    pub fn failed(label: &str) -> Self {
        Self {
            ok: false,
            payload: label.as_bytes().to_vec(),
        }
    }

    /// Encodes status + payload for padding.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.push(if self.ok {
            Self::MARKER_OK
        } else {
            Self::MARKER_FAILED
        });
        out.extend_from_slice(&self.payload);
        out
    }

    /// Decodes status + payload after unpadding.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&marker, payload) = bytes.split_first()?;
        match marker {
            Self::MARKER_OK => Some(Self::ok(payload.to_vec())),
            Self::MARKER_FAILED => Some(Self {
                ok: false,
                payload: payload.to_vec(),
            }),
            _ => None,
        }
    }
}

// =============================================================================
// INVOCATION RECORDS
// =============================================================================

/// State values collected by the plan's read phase, keyed by logical key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateView {
    entries: BTreeMap<LogicalKey, Option<Vec<u8>>>,
}

impl StateView {
    /// Creates an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result of one plan read.
    pub fn insert(&mut self, key: LogicalKey, value: Option<Vec<u8>>) {
        self.entries.insert(key, value);
    }

    /// Value of a read key; `None` when the key was absent in the store or
    /// not part of the plan's read set.
    #[must_use]
    pub fn value(&self, key: &LogicalKey) -> Option<&[u8]> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    /// Returns true when the plan read this key (present or absent).
    #[must_use]
    pub fn was_read(&self, key: &LogicalKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of read entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no reads were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything contract logic produced for one invocation: a pure function of
/// (decoded input, state view) per the execution model, reconciled against
/// the class plan by the sequencer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractEffects {
    /// State writes, keyed by logical key.
    pub writes: BTreeMap<LogicalKey, Vec<u8>>,
    /// Return payload.
    pub return_data: Vec<u8>,
    /// Outbound messages in emission order.
    pub messages: Vec<Vec<u8>>,
    /// Log entries in emission order.
    pub logs: Vec<Vec<u8>>,
}

impl ContractEffects {
    /// Creates empty effects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the return payload.
    #[must_use]
    pub fn with_return(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.return_data = data.into();
        self
    }

    /// Adds a state write.
    #[must_use]
    pub fn with_write(mut self, key: impl Into<LogicalKey>, value: impl Into<Vec<u8>>) -> Self {
        self.writes.insert(key.into(), value.into());
        self
    }

    /// Adds an outbound message.
    #[must_use]
    pub fn with_message(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.messages.push(payload.into());
        self
    }

    /// Adds a log entry.
    #[must_use]
    pub fn with_log(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.logs.push(payload.into());
        self
    }
}

/// Result of one gateway invocation, as handed back to the (untrusted) host.
/// Every field is either sealed or uniform per class, so the response shape
/// carries no signal about which branch executed.
#[derive(Clone, Debug)]
pub struct GatewayResponse {
    /// Correlation id for logs and audit.
    pub invocation_id: Uuid,
    /// Entry point that was invoked (caller-chosen, already public).
    pub entry: EntryKind,
    /// Sealed, canonically padded return envelope.
    pub sealed_return: Vec<u8>,
    /// Sealed outbound messages, exactly the plan's message emit count.
    pub sealed_messages: Vec<Vec<u8>>,
    /// Sealed log entries, exactly the plan's log emit count.
    pub sealed_logs: Vec<Vec<u8>>,
    /// Gas consumed; a constant per class by construction.
    pub gas_used: u64,
    /// Observable operation trace, for audit and uniformity testing.
    pub trace: AccessTrace,
}

// =============================================================================
// TESTS
// =============================================================================
