//! # Confidential Gateway Service
//!
//! Orchestrates one invocation end to end: open sealed input, unpad, look up
//! the class shapes, execute the class plan through the sequencer (dummies
//! included), invoke contract logic once, and hand back sealed, canonically
//! shaped outputs.
//!
//! ## Failure uniformity
//!
//! Faults before the plan begins (unsealable input, malformed envelope,
//! unknown class, failed capability check, out of gas) surface as typed
//! errors; they occur before any secret-dependent branching. Once the plan
//! has begun, every failure is converted into a response of exactly the
//! success shape — sealed status envelope, decoy outputs up to the canonical
//! counts, full plan gas — so the failure path is not a side channel.

use crate::domain::codec::PaddingCodec;
use crate::domain::entities::{
    CallEnvelope, ClassSpec, DeploymentManifest, GatewayResponse, OutputEnvelope, PlanSlot,
    ReturnEnvelope, StateView,
};
use crate::domain::keys::KeyNormalizer;
use crate::domain::registry::ShapeRegistry;
use crate::domain::sequencer::{AccessSequencer, StagedWrite};
use crate::domain::services::{plan_gas, GasMeter};
use crate::domain::value_objects::{AccessTrace, ClassId, EntryKind, FixedKey, LogicalKey, OutputChannel};
use crate::errors::{GatewayError, KeyError, PlanError, ShapeError};
use crate::ports::inbound::{ConfidentialGatewayApi, SealedRequest};
use crate::ports::outbound::{ContractLogic, ExecutionInput, QueryAuthenticator, Sealer, StateStore};

use async_trait::async_trait;
use shroud_crypto::blake3_derive_key;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const FILLER_KEY_CONTEXT: &str = "shroud v1 filler key";
const SCOPE_KEY_CONTEXT: &str = "shroud v1 key scope";

/// Gateway service configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gas limit per invocation; a class whose fixed plan cost exceeds it is
    /// rejected before the plan begins.
    pub gas_limit: u64,
    /// Record logical-to-fixed key encodings for diagnostics (`decode`).
    pub record_decodes: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gas_limit: 10_000_000,
            record_decodes: false,
        }
    }
}

/// Statistics for the gateway service.
#[derive(Debug, Default, Clone)]
pub struct GatewayStats {
    /// Total invocations received.
    pub invocations: u64,
    /// Init invocations received.
    pub init_invocations: u64,
    /// Handle invocations received.
    pub handle_invocations: u64,
    /// Query invocations received.
    pub query_invocations: u64,
    /// Invocations that completed their full plan.
    pub completed: u64,
    /// Invocations answered with a uniform failure envelope.
    pub uniform_failures: u64,
    /// Invocations rejected before their plan began.
    pub rejected: u64,
    /// Total gas consumed by completed and uniformly failed invocations.
    pub total_gas_used: u64,
}

/// The main gateway service.
///
/// Generic over its external collaborators: state store, contract logic,
/// sealing boundary, and query authenticator.
pub struct ConfidentialGateway<S, L, E, A>
where
    S: StateStore,
    L: ContractLogic,
    E: Sealer,
    A: QueryAuthenticator,
{
    registry: Arc<ShapeRegistry>,
    codec: PaddingCodec,
    normalizer: KeyNormalizer,
    store: Arc<S>,
    logic: Arc<L>,
    sealer: Arc<E>,
    auth: Arc<A>,
    /// Serializes plan execution: each invocation holds exclusive store
    /// access for its full plan, so cross-invocation interleavings cannot
    /// correlate.
    invocation_lock: Mutex<()>,
    stats: Arc<RwLock<GatewayStats>>,
    config: GatewayConfig,
}

impl<S, L, E, A> ConfidentialGateway<S, L, E, A>
where
    S: StateStore,
    L: ContractLogic,
    E: Sealer,
    A: QueryAuthenticator,
{
    /// Creates a gateway from a deployment manifest and a 256-bit root
    /// secret shared by all replicas. The filler and key-scope keys derive
    /// from the root secret under separated contexts.
    ///
    /// # Errors
    ///
    /// `ShapeError::InvalidManifest` when the manifest fails validation.
    pub fn new(
        manifest: &DeploymentManifest,
        root_secret: [u8; 32],
        store: S,
        logic: L,
        sealer: E,
        auth: A,
        config: GatewayConfig,
    ) -> Result<Self, GatewayError> {
        let registry = ShapeRegistry::from_manifest(manifest)?;

        let filler_key = blake3_derive_key(FILLER_KEY_CONTEXT, &root_secret);
        let scope_key = blake3_derive_key(SCOPE_KEY_CONTEXT, &root_secret);

        let mut normalizer = KeyNormalizer::new(scope_key);
        if config.record_decodes {
            normalizer = normalizer.with_decode_table();
        }

        Ok(Self {
            registry: Arc::new(registry),
            codec: PaddingCodec::new(filler_key),
            normalizer,
            store: Arc::new(store),
            logic: Arc::new(logic),
            sealer: Arc::new(sealer),
            auth: Arc::new(auth),
            invocation_lock: Mutex::new(()),
            stats: Arc::new(RwLock::new(GatewayStats::default())),
            config,
        })
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> GatewayStats {
        self.stats.read().await.clone()
    }

    /// The registered shape registry.
    #[must_use]
    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    async fn invoke(
        &self,
        entry: EntryKind,
        request: SealedRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let invocation_id = Uuid::new_v4();

        {
            let mut stats = self.stats.write().await;
            stats.invocations += 1;
            match entry {
                EntryKind::Init => stats.init_invocations += 1,
                EntryKind::Handle => stats.handle_invocations += 1,
                EntryKind::Query => stats.query_invocations += 1,
            }
        }

        let (class, spec, body) = match self.preflight(entry, &request) {
            Ok(parts) => parts,
            Err(err) => {
                warn!(%invocation_id, %entry, error = %err, "invocation rejected before plan start");
                self.stats.write().await.rejected += 1;
                return Err(err);
            }
        };

        let plan_cost = plan_gas(&spec.plan);

        // Transactional isolation: the plan owns the store until it
        // completes or aborts.
        let _guard = self.invocation_lock.lock().await;

        match self
            .run_plan(invocation_id, entry, &class, &spec, body)
            .await
        {
            Ok(response) => {
                let mut stats = self.stats.write().await;
                stats.completed += 1;
                stats.total_gas_used += plan_cost;
                drop(stats);
                info!(%invocation_id, %entry, gas_used = plan_cost, "invocation completed");
                Ok(response)
            }
            Err(err) => {
                if err.is_plan_violation() {
                    // A plan violation is a latent privacy bug in the
                    // contract/plan pairing; surface it beyond the caller.
                    error!(%invocation_id, %entry, error = %err, "plan violation: contract diverged from declared access plan");
                } else {
                    warn!(%invocation_id, %entry, error = %err, "invocation aborted, returning uniform failure envelope");
                }
                let mut stats = self.stats.write().await;
                stats.uniform_failures += 1;
                stats.total_gas_used += plan_cost;
                drop(stats);
                self.failure_response(invocation_id, entry, &spec, &err, plan_cost)
            }
        }
    }

    /// Everything that happens before the plan begins. Nothing here branches
    /// on secret data beyond what the sealed envelope necessarily reveals by
    /// existing (entry kind, canonical surface size).
    fn preflight(
        &self,
        entry: EntryKind,
        request: &SealedRequest,
    ) -> Result<(ClassId, ClassSpec, serde_json::Value), GatewayError> {
        let padded = self.sealer.open(&request.ciphertext)?;
        let plaintext = self.codec.unpad(&padded)?;

        let envelope: CallEnvelope = serde_json::from_slice(&plaintext)
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let spec = self.registry.lookup(&envelope.class)?.clone();

        if spec.entry != entry {
            return Err(ShapeError::WrongEntryKind {
                class: envelope.class,
                declared: spec.entry,
                requested: entry,
            }
            .into());
        }

        if padded.len() != spec.message.canonical_size {
            return Err(ShapeError::SizeMismatch {
                class: envelope.class,
                expected: spec.message.canonical_size,
                actual: padded.len(),
            }
            .into());
        }

        if entry == EntryKind::Query {
            let authorized = request
                .token
                .as_ref()
                .is_some_and(|token| self.auth.authorize(token));
            if !authorized {
                return Err(GatewayError::Unauthorized);
            }
        }

        let mut meter = GasMeter::new(self.config.gas_limit);
        let required = plan_gas(&spec.plan);
        if !meter.try_reserve(required) {
            return Err(GatewayError::OutOfGas {
                limit: meter.limit(),
                required,
            });
        }

        Ok((envelope.class, spec, envelope.body))
    }

    #[instrument(skip_all, fields(%invocation_id, %entry, class = %class))]
    async fn run_plan(
        &self,
        invocation_id: Uuid,
        entry: EntryKind,
        class: &ClassId,
        spec: &ClassSpec,
        body: serde_json::Value,
    ) -> Result<GatewayResponse, GatewayError> {
        let mut sequencer = AccessSequencer::new(class.clone(), spec.plan.clone());
        let mut seen_keys: HashMap<FixedKey, LogicalKey> = HashMap::new();
        let mut view = StateView::new();

        // Read phase: every read slot executes with its real key on every
        // invocation (the union plan makes dummy reads unnecessary).
        let first_effect = spec.plan.first_effect_index();
        for slot in &spec.plan.slots()[..first_effect] {
            if let PlanSlot::Read { key } = slot {
                self.execute_read(&mut sequencer, &mut seen_keys, &mut view, key, spec)
                    .await?;
            }
        }

        // Contract logic runs exactly once, as a pure function of the
        // decoded input and the collected view.
        let input = ExecutionInput {
            entry,
            class: class.clone(),
            body,
            view,
        };
        let effects = self.logic.execute(input).await?;
        let mut pending_writes = effects.writes;
        let mut pending_messages = effects.messages.into_iter();
        let mut pending_logs = effects.logs.into_iter();
        let return_data = effects.return_data;

        debug!(
            writes = pending_writes.len(),
            "contract effects collected, reconciling against plan"
        );

        // Effect phase: writes and emits in declared order, dummies for
        // slots the executed branch did not take.
        for (index, slot) in spec.plan.slots().iter().enumerate().skip(first_effect) {
            match slot {
                PlanSlot::Read { key } => {
                    // Tolerated defensively for hand-built registries;
                    // manifest validation orders all reads first, so logic
                    // can never consume a value read this late.
                    let mut discard = StateView::new();
                    self.execute_read(&mut sequencer, &mut seen_keys, &mut discard, key, spec)
                        .await?;
                }
                PlanSlot::Write { key } => {
                    let staged = match pending_writes.remove(key) {
                        Some(value) => {
                            let fixed = self.normalizer.encode(key, &spec.keys)?;
                            note_key(&mut seen_keys, &fixed, key)?;
                            let padded = self.codec.pad(&value, spec.keys.value_size)?;
                            StagedWrite {
                                key: fixed,
                                value: self.sealer.seal(&padded)?,
                                decoy: false,
                            }
                        }
                        None => {
                            let fixed = self.normalizer.decoy(class, index, &spec.keys);
                            let padded = self.codec.pad(&[], spec.keys.value_size)?;
                            StagedWrite {
                                key: fixed,
                                value: self.sealer.seal(&padded)?,
                                decoy: true,
                            }
                        }
                    };
                    sequencer.write(staged)?;
                }
                PlanSlot::Emit { channel } => {
                    let (payload, size) = match channel {
                        OutputChannel::Message => {
                            (pending_messages.next(), spec.outputs.messages.size)
                        }
                        OutputChannel::Log => (pending_logs.next(), spec.outputs.logs.size),
                    };
                    let envelope = match payload {
                        Some(data) => OutputEnvelope::real(data),
                        None => OutputEnvelope::decoy(),
                    };
                    let padded = self.codec.pad(&envelope.encode(), size)?;
                    sequencer.emit(*channel, self.sealer.seal(&padded)?)?;
                }
            }
        }

        // Effects the plan never scheduled are plan violations.
        if let Some(key) = pending_writes.into_keys().next() {
            return Err(PlanError::UnscheduledWrite {
                class: class.clone(),
                key,
            }
            .into());
        }
        if pending_messages.next().is_some() {
            return Err(PlanError::UnscheduledEmit {
                class: class.clone(),
                channel: OutputChannel::Message,
            }
            .into());
        }
        if pending_logs.next().is_some() {
            return Err(PlanError::UnscheduledEmit {
                class: class.clone(),
                channel: OutputChannel::Log,
            }
            .into());
        }

        let outcome = sequencer.finish()?;

        // Commit staged writes in plan order. Nothing was applied before
        // this point, so an abort above left the store untouched.
        for staged in &outcome.staged {
            self.store.set(&staged.key, staged.value.clone()).await?;
        }

        let return_envelope = ReturnEnvelope::ok(return_data);
        let padded = self.codec.pad(&return_envelope.encode(), spec.outputs.return_size)?;
        let sealed_return = self.sealer.seal(&padded)?;

        Ok(GatewayResponse {
            invocation_id,
            entry,
            sealed_return,
            sealed_messages: outcome.messages,
            sealed_logs: outcome.logs,
            gas_used: plan_gas(&spec.plan),
            trace: outcome.trace,
        })
    }

    async fn execute_read(
        &self,
        sequencer: &mut AccessSequencer,
        seen_keys: &mut HashMap<FixedKey, LogicalKey>,
        view: &mut StateView,
        key: &LogicalKey,
        spec: &ClassSpec,
    ) -> Result<(), GatewayError> {
        let fixed = self.normalizer.encode(key, &spec.keys)?;
        note_key(seen_keys, &fixed, key)?;

        let stored = self.store.get(&fixed).await?;
        let stored_len = stored.as_ref().map_or(0, Vec::len);
        sequencer.read(&fixed, stored_len)?;

        let value = match stored {
            Some(sealed) => {
                let padded = self.sealer.open(&sealed)?;
                Some(self.codec.unpad(&padded)?)
            }
            None => None,
        };
        view.insert(key.clone(), value);
        Ok(())
    }

    /// Builds the uniform failure envelope: exactly the success shape, with
    /// a content-free status label sealed inside and decoys filling every
    /// output slot.
    fn failure_response(
        &self,
        invocation_id: Uuid,
        entry: EntryKind,
        spec: &ClassSpec,
        err: &GatewayError,
        plan_cost: u64,
    ) -> Result<GatewayResponse, GatewayError> {
        let return_envelope = ReturnEnvelope::failed(err.kind_label());
        let padded = self.codec.pad(&return_envelope.encode(), spec.outputs.return_size)?;
        let sealed_return = self.sealer.seal(&padded)?;

        let mut sealed_messages = Vec::with_capacity(spec.outputs.messages.count);
        for _ in 0..spec.outputs.messages.count {
            let padded = self
                .codec
                .pad(&OutputEnvelope::decoy().encode(), spec.outputs.messages.size)?;
            sealed_messages.push(self.sealer.seal(&padded)?);
        }

        let mut sealed_logs = Vec::with_capacity(spec.outputs.logs.count);
        for _ in 0..spec.outputs.logs.count {
            let padded = self
                .codec
                .pad(&OutputEnvelope::decoy().encode(), spec.outputs.logs.size)?;
            sealed_logs.push(self.sealer.seal(&padded)?);
        }

        Ok(GatewayResponse {
            invocation_id,
            entry,
            sealed_return,
            sealed_messages,
            sealed_logs,
            gas_used: plan_cost,
            trace: AccessTrace::new(),
        })
    }
}

/// Collision guard: two distinct logical keys mapping to one fixed key
/// would corrupt state, so the first observation aborts the invocation.
fn note_key(
    seen: &mut HashMap<FixedKey, LogicalKey>,
    fixed: &FixedKey,
    logical: &LogicalKey,
) -> Result<(), KeyError> {
    match seen.get(fixed) {
        Some(existing) if existing != logical => Err(KeyError::Collision {
            existing: existing.clone(),
            incoming: logical.clone(),
        }),
        Some(_) => Ok(()),
        None => {
            seen.insert(fixed.clone(), logical.clone());
            Ok(())
        }
    }
}

#[async_trait]
impl<S, L, E, A> ConfidentialGatewayApi for ConfidentialGateway<S, L, E, A>
where
    S: StateStore,
    L: ContractLogic,
    E: Sealer,
    A: QueryAuthenticator,
{
    async fn init(&self, request: SealedRequest) -> Result<GatewayResponse, GatewayError> {
        self.invoke(EntryKind::Init, request).await
    }

    async fn handle(&self, request: SealedRequest) -> Result<GatewayResponse, GatewayError> {
        self.invoke(EntryKind::Handle, request).await
    }

    async fn query(&self, request: SealedRequest) -> Result<GatewayResponse, GatewayError> {
        self.invoke(EntryKind::Query, request).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
