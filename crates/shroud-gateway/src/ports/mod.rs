//! # Ports
//!
//! Hexagonal boundaries of the gateway: the inbound API the host drives and
//! the outbound interfaces adapters implement for the external
//! collaborators (store, contract logic, sealing boundary, query auth).

pub mod inbound;
pub mod outbound;
