//! # Integration Tests
//!
//! End-to-end gateway properties over the demo token contract.

pub mod flows;
pub mod uniformity;
