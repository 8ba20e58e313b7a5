//! # Domain Services
//!
//! Pure functions over plans and shapes: gas accounting and small
//! derivations shared by the sequencer and the gateway service.
//!
//! Gas costs are uniform per operation kind and depend only on the plan, so
//! the metered gas of an invocation is a constant of its class — metering
//! cannot distinguish which branch fired. Deployment validation additionally
//! requires equal plan cost across classes sharing a surface.

use crate::domain::entities::AccessPlan;
use crate::domain::value_objects::OpKind;

/// Uniform gas costs per plan slot kind.
pub mod gas {
    /// Flat cost charged per invocation.
    pub const BASE_COST: u64 = 1_000;
    /// Cost of one state read slot.
    pub const READ_COST: u64 = 300;
    /// Cost of one state write slot (real or decoy).
    pub const WRITE_COST: u64 = 500;
    /// Cost of one output emission slot (real or decoy).
    pub const EMIT_COST: u64 = 200;
}

/// Fixed gas cost of a plan: base plus the per-kind cost of every slot.
#[must_use]
pub fn plan_gas(plan: &AccessPlan) -> u64 {
    let slots: u64 = plan
        .slots()
        .iter()
        .map(|slot| match slot.kind() {
            OpKind::Read => gas::READ_COST,
            OpKind::Write => gas::WRITE_COST,
            OpKind::Emit => gas::EMIT_COST,
        })
        .sum();
    gas::BASE_COST + slots
}

/// Simple gas meter. The full plan cost is reserved before the plan starts;
/// running out mid-plan would abort mid-sequence, which is itself a signal.
#[derive(Clone, Copy, Debug)]
pub struct GasMeter {
    limit: u64,
    used: u64,
}

impl GasMeter {
    /// Creates a meter with the given limit.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Reserves `amount` gas up front. Returns false when the limit cannot
    /// cover it; nothing is charged in that case.
    #[must_use]
    pub fn try_reserve(&mut self, amount: u64) -> bool {
        match self.used.checked_add(amount) {
            Some(total) if total <= self.limit => {
                self.used = total;
                true
            }
            _ => false,
        }
    }

    /// Gas consumed so far.
    #[must_use]
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Configured limit.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

// =============================================================================
// TESTS
// =============================================================================
