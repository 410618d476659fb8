//! Core containers and transport for the arb plugin data exchange.
//!
//! This is the leaf crate with no internal dependencies. It defines:
//!
//! - [`ArbData`]: an ordered list of binary arguments plus a mapping of
//!   JSON-compatible metadata, and [`ArbCmd`], an ArbData tagged with an
//!   interface/operation [`Identifier`] pair.
//! - The canonical CBOR encoding of the metadata mapping ([`codec`]).
//! - The [`HandleBridge`] contract for handle-based storage, and the
//!   `to_raw`/`from_raw` operations that snapshot values into handles and
//!   reconstruct them using the growable-buffer read protocol.
//!
//! Values are plain owned data. Nothing in this crate holds global state;
//! bridges are always passed in by the caller.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bridge;
pub mod cmd;
pub mod codec;
pub mod config;
pub mod data;
pub mod error;
pub mod ident;
pub mod object;
pub mod raw;
pub mod value;

pub use bridge::{Handle, HandleBridge, HandleKind};
pub use cmd::ArbCmd;
pub use config::{TransportConfig, DEFAULT_PROBE_CAPACITY};
pub use data::ArbData;
pub use error::{ArbError, ConfigError};
pub use ident::Identifier;
pub use object::ArbObject;
pub use value::{Metadata, Value};
