//! # Adapters
//!
//! Implementations of the outbound ports: in-memory store, AES-SIV sealer,
//! and the capability-token authenticator.

pub mod authenticator;
pub mod memory_store;
pub mod sealing;

pub use authenticator::TokenAuthenticator;
pub use memory_store::InMemoryStore;
pub use sealing::SivSealer;
