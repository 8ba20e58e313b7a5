//! # Access Sequencer
//!
//! Walks the class plan slot by slot, enforcing that every execution of a
//! class performs the same operations in the same order with the same
//! observable lengths, no matter which data-dependent branch fired inside
//! contract logic.
//!
//! The sequencer never talks to the store itself: the gateway performs I/O
//! and reports each operation here, where the slot kind is checked, the
//! observable trace is recorded, and writes/emits are staged. Staged effects
//! are released only by [`AccessSequencer::finish`], after every slot has
//! executed — a partial plan is a distinguishing signal, so an invocation
//! either completes its full plan or aborts with nothing applied.

use crate::domain::entities::{AccessPlan, PlanSlot};
use crate::domain::value_objects::{
    AccessTrace, ClassId, FixedKey, ObservedOp, OpKind, OutputChannel,
};
use crate::errors::PlanError;

/// One staged state write, released at plan completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedWrite {
    /// Normalized on-store key (real or decoy).
    pub key: FixedKey,
    /// Sealed, canonically padded value.
    pub value: Vec<u8>,
    /// True when this write fills a slot the executed branch did not take.
    pub decoy: bool,
}

/// Everything a completed plan produced.
#[derive(Clone, Debug)]
pub struct SequencerOutcome {
    /// The observable operation trace, identical across all executions of
    /// the class.
    pub trace: AccessTrace,
    /// Writes to commit, in plan order.
    pub staged: Vec<StagedWrite>,
    /// Sealed outbound messages, in plan order.
    pub messages: Vec<Vec<u8>>,
    /// Sealed log entries, in plan order.
    pub logs: Vec<Vec<u8>>,
}

/// Plan-walking state machine for one invocation.
pub struct AccessSequencer {
    class: ClassId,
    plan: AccessPlan,
    cursor: usize,
    trace: AccessTrace,
    staged: Vec<StagedWrite>,
    messages: Vec<Vec<u8>>,
    logs: Vec<Vec<u8>>,
}

impl AccessSequencer {
    /// Begins executing the given plan.
    #[must_use]
    pub fn new(class: ClassId, plan: AccessPlan) -> Self {
        Self {
            class,
            plan,
            cursor: 0,
            trace: AccessTrace::new(),
            staged: Vec::new(),
            messages: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// The slot the next operation must match, if any remain.
    #[must_use]
    pub fn current_slot(&self) -> Option<&PlanSlot> {
        self.plan.slots().get(self.cursor)
    }

    /// Records a completed state read.
    ///
    /// `stored_len` is the length of the raw store response (0 when the key
    /// was absent); it is what an external monitor observes.
    ///
    /// # Errors
    ///
    /// `PlanError` when no slot remains or the current slot is not a read.
    pub fn read(&mut self, key: &FixedKey, stored_len: usize) -> Result<(), PlanError> {
        self.expect_kind(OpKind::Read)?;
        self.trace
            .push(ObservedOp::new(OpKind::Read, key.len(), stored_len));
        self.cursor += 1;
        Ok(())
    }

    /// Stages a state write (real or decoy).
    ///
    /// # Errors
    ///
    /// `PlanError` when no slot remains or the current slot is not a write.
    pub fn write(&mut self, staged: StagedWrite) -> Result<(), PlanError> {
        self.expect_kind(OpKind::Write)?;
        self.trace.push(ObservedOp::new(
            OpKind::Write,
            staged.key.len(),
            staged.value.len(),
        ));
        self.staged.push(staged);
        self.cursor += 1;
        Ok(())
    }

    /// Stages an output emission (real or decoy) on the given channel.
    ///
    /// # Errors
    ///
    /// `PlanError` when no slot remains, the current slot is not an emit, or
    /// the slot declares a different channel.
    pub fn emit(&mut self, channel: OutputChannel, sealed: Vec<u8>) -> Result<(), PlanError> {
        let slot = self.expect_kind(OpKind::Emit)?;
        if let PlanSlot::Emit { channel: declared } = slot {
            if *declared != channel {
                return Err(PlanError::EmitChannelMismatch {
                    class: self.class.clone(),
                    slot: self.cursor,
                    scheduled: *declared,
                    attempted: channel,
                });
            }
        }
        self.trace
            .push(ObservedOp::new(OpKind::Emit, 0, sealed.len()));
        match channel {
            OutputChannel::Message => self.messages.push(sealed),
            OutputChannel::Log => self.logs.push(sealed),
        }
        self.cursor += 1;
        Ok(())
    }

    /// The trace recorded so far.
    #[must_use]
    pub fn trace(&self) -> &AccessTrace {
        &self.trace
    }

    /// Completes the plan and releases the staged effects.
    ///
    /// # Errors
    ///
    /// `PlanError::Incomplete` when slots remain unexecuted.
    pub fn finish(self) -> Result<SequencerOutcome, PlanError> {
        if self.cursor != self.plan.len() {
            return Err(PlanError::Incomplete {
                class: self.class,
                executed: self.cursor,
                declared: self.plan.len(),
            });
        }
        Ok(SequencerOutcome {
            trace: self.trace,
            staged: self.staged,
            messages: self.messages,
            logs: self.logs,
        })
    }

    fn expect_kind(&self, attempted: OpKind) -> Result<&PlanSlot, PlanError> {
        let slot = self
            .plan
            .slots()
            .get(self.cursor)
            .ok_or(PlanError::Exhausted {
                class: self.class.clone(),
                attempted,
            })?;
        if slot.kind() != attempted {
            return Err(PlanError::Violation {
                class: self.class.clone(),
                slot: self.cursor,
                scheduled: slot.kind(),
                attempted,
            });
        }
        Ok(slot)
    }
}

// =============================================================================
// TESTS
// =============================================================================
