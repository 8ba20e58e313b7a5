//! # Domain Invariants
//!
//! Deployment-time invariants over manifests and runtime checks over traces.
//! Every check here guards an observable channel: size, count, ordering, or
//! cost. A manifest that fails any of them is rejected at load — replacing
//! convention-based mitigation with a deploy-time-checked invariant.

use crate::domain::codec::LENGTH_PREFIX_LEN;
use crate::domain::entities::{ClassSpec, DeploymentManifest, PlanSlot};
use crate::domain::services::plan_gas;
use crate::domain::value_objects::{AccessTrace, ClassId, EntryKind, LogicalKey, OutputChannel};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Surface uniformity: all classes sharing an entry surface declare the same
/// canonical message size, so ciphertext length cannot distinguish them.
#[must_use]
pub fn check_surface_uniformity(manifest: &DeploymentManifest) -> Vec<InvariantViolation> {
    let mut expected: BTreeMap<EntryKind, (ClassId, usize)> = BTreeMap::new();
    let mut violations = Vec::new();

    for (class, spec) in &manifest.classes {
        match expected.get(&spec.entry) {
            None => {
                expected.insert(spec.entry, (class.clone(), spec.message.canonical_size));
            }
            Some((_, size)) if *size == spec.message.canonical_size => {}
            Some((first, size)) => violations.push(InvariantViolation::SurfaceSizeMismatch {
                entry: spec.entry,
                class: class.clone(),
                size: spec.message.canonical_size,
                expected: *size,
                first: first.clone(),
            }),
        }
    }
    violations
}

/// Phase order: every read slot precedes every write/emit slot. Contract
/// logic is a pure function of (input, read state), so a read scheduled
/// after an effect slot could never be satisfied.
#[must_use]
pub fn check_plan_phase_order(class: &ClassId, spec: &ClassSpec) -> Vec<InvariantViolation> {
    let first_effect = spec.plan.first_effect_index();
    spec.plan
        .slots()
        .iter()
        .enumerate()
        .skip(first_effect)
        .filter(|(_, slot)| matches!(slot, PlanSlot::Read { .. }))
        .map(|(slot, _)| InvariantViolation::PhaseOrderViolated {
            class: class.clone(),
            slot,
        })
        .collect()
}

/// Query purity: read-only entry points schedule no write slots.
#[must_use]
pub fn check_query_readonly(class: &ClassId, spec: &ClassSpec) -> Vec<InvariantViolation> {
    if spec.entry != EntryKind::Query {
        return Vec::new();
    }
    spec.plan
        .slots()
        .iter()
        .enumerate()
        .filter(|(_, slot)| matches!(slot, PlanSlot::Write { .. }))
        .map(|(slot, _)| InvariantViolation::WriteInQueryPlan {
            class: class.clone(),
            slot,
        })
        .collect()
}

/// Emit counts: the plan schedules exactly the output counts the shape
/// declares, per channel.
#[must_use]
pub fn check_emit_counts(class: &ClassId, spec: &ClassSpec) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    for (channel, declared) in [
        (OutputChannel::Message, spec.outputs.messages.count),
        (OutputChannel::Log, spec.outputs.logs.count),
    ] {
        let planned = spec.plan.emit_count(channel);
        if planned != declared {
            violations.push(InvariantViolation::EmitCountMismatch {
                class: class.clone(),
                channel,
                planned,
                declared,
            });
        }
    }
    violations
}

/// Shape bounds: sizes large enough to carry their embedded framing, key
/// lengths long enough for collision resistance, plans within limits, and
/// no duplicate slot keys.
#[must_use]
pub fn check_shape_bounds(class: &ClassId, spec: &ClassSpec) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if spec.keys.key_len < limits::MIN_FIXED_KEY_LEN {
        violations.push(InvariantViolation::KeyLenTooShort {
            class: class.clone(),
            len: spec.keys.key_len,
        });
    }
    if spec.keys.max_logical_len == 0 {
        violations.push(InvariantViolation::ZeroLogicalCapacity {
            class: class.clone(),
        });
    }

    let mut sizes = vec![
        ("message", spec.message.canonical_size),
        ("value", spec.keys.value_size),
        ("return", spec.outputs.return_size),
    ];
    if spec.outputs.messages.count > 0 {
        sizes.push(("message output", spec.outputs.messages.size));
    }
    if spec.outputs.logs.count > 0 {
        sizes.push(("log output", spec.outputs.logs.size));
    }
    for (surface, size) in sizes {
        if size < limits::MIN_CANONICAL_SIZE {
            violations.push(InvariantViolation::CanonicalTooSmall {
                class: class.clone(),
                surface,
                size,
            });
        }
        if size > limits::MAX_CANONICAL_SIZE {
            violations.push(InvariantViolation::CanonicalTooLarge {
                class: class.clone(),
                surface,
                size,
            });
        }
    }

    if spec.plan.len() > limits::MAX_PLAN_SLOTS {
        violations.push(InvariantViolation::PlanTooLong {
            class: class.clone(),
            len: spec.plan.len(),
        });
    }

    for keys in [
        spec.plan.read_keys().collect::<Vec<_>>(),
        spec.plan.write_keys().collect::<Vec<_>>(),
    ] {
        let mut seen = BTreeSet::new();
        for key in keys {
            if !seen.insert(key) {
                violations.push(InvariantViolation::DuplicatePlanKey {
                    class: class.clone(),
                    key: key.clone(),
                });
            }
        }
    }

    violations
}

/// Cost uniformity: classes sharing an entry surface have equal plan gas,
/// so metered gas cannot distinguish them either.
#[must_use]
pub fn check_uniform_cost(manifest: &DeploymentManifest) -> Vec<InvariantViolation> {
    let mut expected: BTreeMap<EntryKind, (ClassId, u64)> = BTreeMap::new();
    let mut violations = Vec::new();

    for (class, spec) in &manifest.classes {
        let cost = plan_gas(&spec.plan);
        match expected.get(&spec.entry) {
            None => {
                expected.insert(spec.entry, (class.clone(), cost));
            }
            Some((_, c)) if *c == cost => {}
            Some((first, c)) => violations.push(InvariantViolation::UnequalPlanCost {
                entry: spec.entry,
                class: class.clone(),
                cost,
                expected: *c,
                first: first.clone(),
            }),
        }
    }
    violations
}

/// Init coverage: every key read by a Handle or Query class is written by
/// some Init class, so steady-state reads never hit an absent key (an
/// absent-key response has observable length zero).
#[must_use]
pub fn check_init_coverage(manifest: &DeploymentManifest) -> Vec<InvariantViolation> {
    let bootstrapped: BTreeSet<&LogicalKey> = manifest
        .classes
        .values()
        .filter(|spec| spec.entry == EntryKind::Init)
        .flat_map(|spec| spec.plan.write_keys())
        .collect();

    let mut violations = Vec::new();
    for (class, spec) in &manifest.classes {
        if spec.entry == EntryKind::Init {
            continue;
        }
        for key in spec.plan.read_keys() {
            if !bootstrapped.contains(key) {
                violations.push(InvariantViolation::UncoveredRead {
                    class: class.clone(),
                    key: key.clone(),
                });
            }
        }
    }
    violations
}

/// Check all manifest invariants at once.
#[must_use]
pub fn check_manifest(manifest: &DeploymentManifest) -> InvariantCheckResult {
    let mut violations = Vec::new();

    violations.extend(check_surface_uniformity(manifest));
    violations.extend(check_uniform_cost(manifest));
    violations.extend(check_init_coverage(manifest));
    for (class, spec) in &manifest.classes {
        violations.extend(check_plan_phase_order(class, spec));
        violations.extend(check_query_readonly(class, spec));
        violations.extend(check_emit_counts(class, spec));
        violations.extend(check_shape_bounds(class, spec));
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

/// Trace uniformity: two executions of one class must observe identically.
/// Runtime/test helper; the sequencer enforces this by construction.
#[must_use]
pub fn check_trace_uniformity(a: &AccessTrace, b: &AccessTrace) -> bool {
    a == b
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Canonical sizes differ within one entry surface.
    SurfaceSizeMismatch {
        /// Entry surface.
        entry: EntryKind,
        /// Offending class.
        class: ClassId,
        /// Its canonical size.
        size: usize,
        /// Size set by the first class of the surface.
        expected: usize,
        /// The class that set the expectation.
        first: ClassId,
    },
    /// A read slot appears after the first effect slot.
    PhaseOrderViolated {
        /// Offending class.
        class: ClassId,
        /// Slot index.
        slot: usize,
    },
    /// A query plan schedules a write.
    WriteInQueryPlan {
        /// Offending class.
        class: ClassId,
        /// Slot index.
        slot: usize,
    },
    /// Plan emit count differs from the declared output count.
    EmitCountMismatch {
        /// Offending class.
        class: ClassId,
        /// Channel.
        channel: OutputChannel,
        /// Emit slots in the plan.
        planned: usize,
        /// Count declared by the output shape.
        declared: usize,
    },
    /// Fixed key length below the collision-resistance floor.
    KeyLenTooShort {
        /// Offending class.
        class: ClassId,
        /// Declared key length.
        len: usize,
    },
    /// Zero logical key capacity.
    ZeroLogicalCapacity {
        /// Offending class.
        class: ClassId,
    },
    /// A canonical size too small to carry its framing.
    CanonicalTooSmall {
        /// Offending class.
        class: ClassId,
        /// Which surface.
        surface: &'static str,
        /// Declared size.
        size: usize,
    },
    /// A canonical size above the hard cap.
    CanonicalTooLarge {
        /// Offending class.
        class: ClassId,
        /// Which surface.
        surface: &'static str,
        /// Declared size.
        size: usize,
    },
    /// Plan exceeds the slot cap.
    PlanTooLong {
        /// Offending class.
        class: ClassId,
        /// Slot count.
        len: usize,
    },
    /// The same key bound to two slots of one kind.
    DuplicatePlanKey {
        /// Offending class.
        class: ClassId,
        /// Duplicated key.
        key: LogicalKey,
    },
    /// Plan gas differs within one entry surface.
    UnequalPlanCost {
        /// Entry surface.
        entry: EntryKind,
        /// Offending class.
        class: ClassId,
        /// Its plan cost.
        cost: u64,
        /// Cost set by the first class of the surface.
        expected: u64,
        /// The class that set the expectation.
        first: ClassId,
    },
    /// A non-Init class reads a key no Init class bootstraps.
    UncoveredRead {
        /// Offending class.
        class: ClassId,
        /// The key in question.
        key: LogicalKey,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurfaceSizeMismatch {
                entry,
                class,
                size,
                expected,
                first,
            } => write!(
                f,
                "{entry} surface size mismatch: {class} declares {size}, {first} declares {expected}"
            ),
            Self::PhaseOrderViolated { class, slot } => {
                write!(f, "read slot after effects in {class} at slot {slot}")
            }
            Self::WriteInQueryPlan { class, slot } => {
                write!(f, "write slot in query class {class} at slot {slot}")
            }
            Self::EmitCountMismatch {
                class,
                channel,
                planned,
                declared,
            } => write!(
                f,
                "{channel} emit count mismatch in {class}: plan {planned}, shape {declared}"
            ),
            Self::KeyLenTooShort { class, len } => write!(
                f,
                "key length {len} below floor {} in {class}",
                limits::MIN_FIXED_KEY_LEN
            ),
            Self::ZeroLogicalCapacity { class } => {
                write!(f, "zero logical key capacity in {class}")
            }
            Self::CanonicalTooSmall {
                class,
                surface,
                size,
            } => write!(
                f,
                "{surface} size {size} below minimum {} in {class}",
                limits::MIN_CANONICAL_SIZE
            ),
            Self::CanonicalTooLarge {
                class,
                surface,
                size,
            } => write!(
                f,
                "{surface} size {size} above maximum {} in {class}",
                limits::MAX_CANONICAL_SIZE
            ),
            Self::PlanTooLong { class, len } => write!(
                f,
                "plan length {len} above maximum {} in {class}",
                limits::MAX_PLAN_SLOTS
            ),
            Self::DuplicatePlanKey { class, key } => {
                write!(f, "duplicate plan key {key} in {class}")
            }
            Self::UnequalPlanCost {
                entry,
                class,
                cost,
                expected,
                first,
            } => write!(
                f,
                "{entry} surface cost mismatch: {class} costs {cost}, {first} costs {expected}"
            ),
            Self::UncoveredRead { class, key } => {
                write!(f, "class {class} reads {key} which no init class writes")
            }
        }
    }
}

// =============================================================================
// NORMALIZATION LIMIT CONSTANTS
// =============================================================================

/// Hard limits on shapes and plans.
pub mod limits {
    use super::LENGTH_PREFIX_LEN;

    /// Minimum fixed key length (collision-resistance floor).
    pub const MIN_FIXED_KEY_LEN: usize = 8;

    /// Minimum canonical size: the embedded length prefix plus one byte.
    pub const MIN_CANONICAL_SIZE: usize = LENGTH_PREFIX_LEN + 1;

    /// Maximum canonical size of any padded surface.
    pub const MAX_CANONICAL_SIZE: usize = 1024 * 1024; // 1 MB

    /// Maximum slots in one access plan.
    pub const MAX_PLAN_SLOTS: usize = 4_096;
}

// =============================================================================
// TESTS
// =============================================================================
