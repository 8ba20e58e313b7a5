//! # Domain Layer
//!
//! Pure normalization logic: shapes, plans, padding, key encoding, and the
//! plan-walking sequencer. No I/O happens here; the service layer drives
//! these types against the outbound ports.

pub mod codec;
pub mod entities;
pub mod invariants;
pub mod keys;
pub mod registry;
pub mod sequencer;
pub mod services;
pub mod value_objects;
