//! # Test Fixtures
//!
//! Shared manifest, demo contract logic, and request builders used by the
//! integration suite and benchmarks.
//!
//! The demo contract is a minimal confidential token: `init` bootstraps a
//! balance, `send` and `transfer` both debit it (only `transfer` notifies a
//! recipient with one outbound message), and `peek` is a token-gated query.
//! `send` and `transfer` share one Handle surface, so their request
//! ciphertexts, traces, gas, and output counts must be indistinguishable.

use async_trait::async_trait;
use shroud_crypto::SealKey;
use shroud_gateway::prelude::*;
use std::sync::Arc;

/// Shared AES-SIV contract key.
pub const SEAL_KEY: [u8; 64] = [0x5A; 64];
/// Shared gateway root secret (filler + key-scope derivation).
pub const ROOT_SECRET: [u8; 32] = [0x3C; 32];
/// Capability token granted to query clients.
pub const TOKEN: &str = "viewing-key-7f";

/// Canonical Handle/Init/Query message surface size used by the fixtures.
pub const MESSAGE_SIZE: usize = 64;
/// Canonical stored-value size.
pub const VALUE_SIZE: usize = 48;
/// Constant on-store key length.
pub const KEY_LEN: usize = 8;

/// Demo confidential token contract.
pub struct TokenLogic;

#[async_trait]
impl ContractLogic for TokenLogic {
    async fn execute(&self, input: ExecutionInput) -> Result<ContractEffects, LogicError> {
        let amount = input
            .body
            .get("amount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let balance: u64 = input
            .view
            .value(&LogicalKey::from("balances"))
            .and_then(|b| String::from_utf8(b.to_vec()).ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        match input.class.as_str() {
            "init" => Ok(ContractEffects::new()
                .with_write("balances", amount.to_string())
                .with_return(b"ok".to_vec())),
            "send" => Ok(ContractEffects::new()
                .with_write("balances", balance.saturating_sub(amount).to_string())
                .with_return(b"sent".to_vec())),
            "transfer" => Ok(ContractEffects::new()
                .with_write("balances", balance.saturating_sub(amount).to_string())
                .with_message(format!("credit:{amount}"))
                .with_return(b"transferred".to_vec())),
            "peek" => Ok(ContractEffects::new().with_return(balance.to_string())),
            other => Err(LogicError::Internal(format!("unknown class {other}"))),
        }
    }
}

fn state_key_shape() -> StateKeyShape {
    StateKeyShape {
        key_len: KEY_LEN,
        max_logical_len: 64,
        value_size: VALUE_SIZE,
    }
}

fn handle_spec() -> ClassSpec {
    ClassSpec {
        entry: EntryKind::Handle,
        message: MessageShape::new(MESSAGE_SIZE),
        keys: state_key_shape(),
        outputs: OutputShape {
            return_size: 48,
            messages: ChannelShape { count: 1, size: 64 },
            logs: ChannelShape { count: 0, size: 0 },
        },
        // Union of the send branch (no message) and the transfer branch
        // (one message): the transfer footprint is the canonical plan.
        plan: AccessPlan::union_of(&[
            BranchProfile::new().reads("balances").writes("balances"),
            BranchProfile::new()
                .reads("balances")
                .writes("balances")
                .emits_messages(1),
        ]),
    }
}

/// The deployment manifest of the demo token contract.
pub fn token_manifest() -> DeploymentManifest {
    let init_spec = ClassSpec {
        entry: EntryKind::Init,
        message: MessageShape::new(MESSAGE_SIZE),
        keys: state_key_shape(),
        outputs: OutputShape {
            return_size: 48,
            messages: ChannelShape { count: 0, size: 0 },
            logs: ChannelShape { count: 0, size: 0 },
        },
        plan: AccessPlan::union_of(&[BranchProfile::new().writes("balances")]),
    };
    let query_spec = ClassSpec {
        entry: EntryKind::Query,
        message: MessageShape::new(MESSAGE_SIZE),
        keys: state_key_shape(),
        outputs: OutputShape {
            return_size: 48,
            messages: ChannelShape { count: 0, size: 0 },
            logs: ChannelShape { count: 0, size: 0 },
        },
        plan: AccessPlan::union_of(&[BranchProfile::new().reads("balances")]),
    };

    DeploymentManifest::new("token", 1)
        .with_class("init", init_spec)
        .with_class("send", handle_spec())
        .with_class("transfer", handle_spec())
        .with_class("peek", query_spec)
}

/// Gateway type used across the suite.
pub type TestGateway =
    ConfidentialGateway<Arc<InMemoryStore>, TokenLogic, SivSealer, TokenAuthenticator>;

/// Builds a gateway plus a handle on its store for observability assertions.
pub fn build_gateway() -> (TestGateway, Arc<InMemoryStore>) {
    let manifest = token_manifest();
    let store = Arc::new(InMemoryStore::new());
    let gateway = ConfidentialGateway::new(
        &manifest,
        ROOT_SECRET,
        Arc::clone(&store),
        TokenLogic,
        SivSealer::new(SealKey::from_bytes(SEAL_KEY), manifest.seal_context()),
        TokenAuthenticator::new(&CapabilityToken::from(TOKEN)),
        GatewayConfig::default(),
    )
    .expect("fixture manifest must validate");
    (gateway, store)
}

/// The sealer a client shares with the contract.
pub fn client_sealer() -> SivSealer {
    SivSealer::new(
        SealKey::from_bytes(SEAL_KEY),
        token_manifest().seal_context(),
    )
}

/// Client-side request construction: pad with a client-local filler key
/// (unpadding needs only the embedded prefix), then seal with the shared
/// contract key.
pub fn sealed_call(class: &str, body: serde_json::Value) -> Vec<u8> {
    let envelope = CallEnvelope {
        class: ClassId::new(class),
        body,
    };
    let plaintext = serde_json::to_vec(&envelope).expect("envelope serializes");
    let padded = PaddingCodec::new([0xCC; 32])
        .pad(&plaintext, MESSAGE_SIZE)
        .expect("fixture payloads fit the canonical size");
    client_sealer().seal(&padded).expect("sealing succeeds")
}

/// Opens a sealed return envelope.
pub fn open_return(sealed: &[u8]) -> ReturnEnvelope {
    let padded = client_sealer().open(sealed).expect("return opens");
    let plaintext = PaddingCodec::new([0; 32])
        .unpad(&padded)
        .expect("return unpads");
    ReturnEnvelope::decode(&plaintext).expect("return decodes")
}

/// Opens a sealed output envelope.
pub fn open_output(sealed: &[u8]) -> OutputEnvelope {
    let padded = client_sealer().open(sealed).expect("output opens");
    let plaintext = PaddingCodec::new([0; 32])
        .unpad(&padded)
        .expect("output unpads");
    OutputEnvelope::decode(&plaintext).expect("output decodes")
}
