//! arb: binary arguments and metadata exchanged between simulator plugins.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! arb sub-crates. For most users, adding `arb` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use arb::prelude::*;
//!
//! let mut cmd = ArbCmd::new("qx.backend", "run").unwrap();
//! cmd.push(b"circuit".to_vec());
//! cmd.set("shots", &1024).unwrap();
//!
//! // Hand it across the plugin boundary as a handle...
//! let mut store = ArbStore::new();
//! let handle = cmd.to_raw(&mut store, None).unwrap();
//!
//! // ...and rebuild it on the other side.
//! let received = ArbCmd::from_raw(&store, handle).unwrap();
//! assert_eq!(received, cmd);
//! assert_eq!(received.get_as::<u32>("shots").unwrap(), 1024);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `arb-core` | `ArbData`, `ArbCmd`, identifiers, codec, `HandleBridge`, transport |
//! | [`store`] | `arb-store` | In-memory handle store |
//!
//! The C ABI lives in the separate `arb-ffi` crate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Containers, codec and transport (`arb-core`).
pub use arb_core as types;

/// In-memory handle store (`arb-store`).
///
/// [`store::ArbStore`] implements [`types::HandleBridge`].
pub use arb_store as store;

/// Common imports for typical arb usage.
pub mod prelude {
    pub use arb_core::{
        ArbCmd, ArbData, ArbError, ArbObject, Handle, HandleBridge, HandleKind, Identifier,
        Metadata, TransportConfig, Value,
    };
    pub use arb_store::{ArbStore, StoreConfig};
}
