//! In-memory [`HandleBridge`](arb_core::HandleBridge) for arb values.
//!
//! [`ArbStore`] owns serialized ArbData/ArbCmd objects behind `u64`
//! handles. Handles are generation-checked: using a handle after it was
//! deleted fails with `HandleNotFound` instead of aliasing whatever object
//! later reuses its slot.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
mod handle;
pub mod store;

pub use config::StoreConfig;
pub use store::{ArbStore, CmdIdentifiers, StoredObject};
