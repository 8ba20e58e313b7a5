//! # Driving Ports (API - Inbound)
//!
//! The interface the host process uses to hand sealed invocations to the
//! gateway. The host is untrusted: everything it sees in requests and
//! responses is either sealed or uniform per invocation class.

use crate::domain::entities::GatewayResponse;
use crate::domain::value_objects::CapabilityToken;
use crate::errors::GatewayError;
use async_trait::async_trait;

// =============================================================================
// SEALED REQUEST
// =============================================================================

/// One sealed invocation as received from the host.
///
/// The invocation class is *inside* the ciphertext; the only routing
/// information the host supplies in the clear is which entry point it calls.
#[derive(Clone, Debug)]
pub struct SealedRequest {
    /// Sealed, canonically padded call envelope.
    pub ciphertext: Vec<u8>,
    /// Capability token for Query invocations; ignored elsewhere.
    pub token: Option<CapabilityToken>,
}

impl SealedRequest {
    /// Creates a request without a token (Init/Handle).
    #[must_use]
    pub fn new(ciphertext: Vec<u8>) -> Self {
        Self {
            ciphertext,
            token: None,
        }
    }

    /// Creates a token-bearing request (Query).
    #[must_use]
    pub fn with_token(ciphertext: Vec<u8>, token: CapabilityToken) -> Self {
        Self {
            ciphertext,
            token: Some(token),
        }
    }
}

// =============================================================================
// GATEWAY API (Primary Driving Port)
// =============================================================================

/// Primary API of the normalization gateway.
///
/// Each method processes one invocation as an independent, sequential unit
/// of work; once its access plan begins executing it runs to completion
/// (including dummy slots) or aborts atomically.
#[async_trait]
pub trait ConfidentialGatewayApi: Send + Sync {
    /// State bootstrap. Runs against an empty store; its plan writes the
    /// keys later invocations read.
    async fn init(&self, request: SealedRequest) -> Result<GatewayResponse, GatewayError>;

    /// State-mutating, fee-bearing invocation.
    async fn handle(&self, request: SealedRequest) -> Result<GatewayResponse, GatewayError>;

    /// Read-only, gas-metered but feeless invocation. Authenticated by the
    /// request's capability token; there is no trusted caller identity in a
    /// query.
    async fn query(&self, request: SealedRequest) -> Result<GatewayResponse, GatewayError>;
}

// =============================================================================
// TESTS
// =============================================================================
