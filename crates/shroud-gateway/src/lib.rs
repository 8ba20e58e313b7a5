//! # Shroud Gateway - Side-Channel-Resistant I/O Normalization
//!
//! ## Purpose
//!
//! Sits between encrypted contract inputs/outputs and enclave-hosted
//! contract logic, enforcing uniform sizes, uniform key shapes, and uniform
//! operation ordering so that an observer monitoring ciphertext sizes,
//! storage access patterns, and call ordering cannot distinguish which
//! logical operation occurred.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Surface size uniformity | `domain/invariants.rs` - `check_surface_uniformity()` |
//! | INVARIANT-2 | Fixed plan per class | `domain/sequencer.rs` - slot-kind checks + `finish()` |
//! | INVARIANT-3 | Constant key/value lengths | `domain/keys.rs`, `domain/codec.rs` |
//! | INVARIANT-4 | Output count/size uniformity | `domain/invariants.rs` - `check_emit_counts()` |
//! | INVARIANT-5 | Cost uniformity per surface | `domain/invariants.rs` - `check_uniform_cost()` |
//! | INVARIANT-6 | Uniform failure shape | `service.rs` - `failure_response()` |
//!
//! ## Execution Model
//!
//! One invocation = open → unpad → class lookup → read phase → contract
//! logic (pure, invoked once) → write/emit phase with dummy slots →
//! atomic commit → sealed canonical outputs. Operations execute strictly in
//! declared plan order on a single logical thread of control; reordering is
//! exactly the side channel being defended against.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Shape Registry | `domain/registry.rs` | Per-class shapes/plans, deploy-validated |
//! | Padding Codec | `domain/codec.rs` | Canonical sizes, keyed pseudorandom filler |
//! | Key Normalizer | `domain/keys.rs` | Fixed-length on-store keys + decoys |
//! | Access Sequencer | `domain/sequencer.rs` | Plan walking, dummies, staged commit |
//! | Gateway | `service.rs` | Init/Handle/Query orchestration |
//!
//! ## Usage Example
//!
//! ```ignore
//! use shroud_gateway::prelude::*;
//!
//! let gateway = ConfidentialGateway::new(
//!     &manifest, root_secret, store, logic, sealer, auth,
//!     GatewayConfig::default(),
//! )?;
//!
//! let response = gateway.handle(SealedRequest::new(ciphertext)).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        AccessPlan, BranchProfile, CallEnvelope, ChannelShape, ClassSpec, ContractEffects,
        DeploymentManifest, GatewayResponse, MessageShape, OutputEnvelope, OutputShape, PlanSlot,
        ReturnEnvelope, StateKeyShape, StateView,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        AccessTrace, CapabilityToken, ClassId, EntryKind, FixedKey, LogicalKey, ObservedOp,
        OpKind, OutputChannel,
    };

    // Domain services
    pub use crate::domain::codec::{PaddingCodec, LENGTH_PREFIX_LEN};
    pub use crate::domain::keys::KeyNormalizer;
    pub use crate::domain::registry::ShapeRegistry;
    pub use crate::domain::sequencer::{AccessSequencer, SequencerOutcome, StagedWrite};
    pub use crate::domain::services::{plan_gas, GasMeter};

    // Invariants
    pub use crate::domain::invariants::{
        check_manifest, check_trace_uniformity, limits, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{ConfidentialGatewayApi, SealedRequest};
    pub use crate::ports::outbound::{
        ContractLogic, ExecutionInput, QueryAuthenticator, Sealer, StateStore,
    };

    // Errors
    pub use crate::errors::{
        CodecError, GatewayError, KeyError, LogicError, PlanError, ShapeError, StoreError,
    };

    // Adapters
    pub use crate::adapters::{InMemoryStore, SivSealer, TokenAuthenticator};

    // Service
    pub use crate::service::{ConfidentialGateway, GatewayConfig, GatewayStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
