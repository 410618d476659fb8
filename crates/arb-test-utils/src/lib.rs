//! Test utilities for arb development.
//!
//! Provides reusable fixtures, proptest strategies for values and
//! identifiers, and wrapper bridges that record or sabotage the calls
//! made through them.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod bridges;
pub mod fixtures;
pub mod strategies;

pub use bridges::{BridgeCall, FaultyBridge, RecordingBridge};
