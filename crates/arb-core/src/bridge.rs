//! The handle-based storage contract that `to_raw`/`from_raw` talk to.
//!
//! A [`HandleBridge`] owns serialized ArbData/ArbCmd objects behind opaque
//! `u64` handles. Bridges are passed explicitly, so every caller (and every
//! test) decides which table its handles live in.

use std::fmt;

use crate::error::ArbError;

/// Opaque reference to an object owned by a [`HandleBridge`].
pub type Handle = u64;

/// The kind of object a handle refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Binary arguments plus a metadata blob.
    ArbData,
    /// An ArbData plus an interface/operation identifier pair.
    ArbCmd,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArbData => f.write_str("ArbData"),
            Self::ArbCmd => f.write_str("ArbCmd"),
        }
    }
}

/// Handle allocation, lookup and raw access for serialized objects.
///
/// Every method fails with [`ArbError::HandleNotFound`] for a handle that
/// was never allocated or has been deleted. Command handles support all
/// data operations as well.
///
/// The `get_*` methods follow the growable-buffer protocol: they return
/// the true length of the item and copy it into `buf` only when it fits.
/// A caller seeing a length larger than its buffer reissues the call with
/// a buffer of exactly that length.
pub trait HandleBridge {
    /// Allocate an empty ArbData object.
    fn allocate_empty_arb(&mut self) -> Result<Handle, ArbError>;

    /// Allocate an empty ArbCmd object with the given identifiers.
    fn allocate_empty_cmd(&mut self, iface: &str, oper: &str) -> Result<Handle, ArbError>;

    /// The kind of object behind `handle`.
    fn handle_kind(&self, handle: Handle) -> Result<HandleKind, ArbError>;

    /// Reset the data portion of `handle` to an empty mapping and no args.
    fn clear(&mut self, handle: Handle) -> Result<(), ArbError>;

    /// Replace the encoded metadata blob.
    fn set_metadata_blob(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError>;

    /// Copy the encoded metadata blob into `buf` if it fits; return its length.
    fn get_metadata_blob(&self, handle: Handle, buf: &mut [u8]) -> Result<usize, ArbError>;

    /// Append a binary argument.
    fn push_binary_arg(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError>;

    /// Copy argument `index` into `buf` if it fits; return its length, or
    /// `None` when there is no argument at `index`.
    fn get_binary_arg(
        &self,
        handle: Handle,
        index: usize,
        buf: &mut [u8],
    ) -> Result<Option<usize>, ArbError>;

    /// Number of binary arguments.
    fn arg_count(&self, handle: Handle) -> Result<usize, ArbError>;

    /// Replace the identifiers of a command handle.
    fn set_cmd_identifiers(
        &mut self,
        handle: Handle,
        iface: &str,
        oper: &str,
    ) -> Result<(), ArbError>;

    /// The `(iface, oper)` pair of a command handle.
    fn cmd_identifiers(&self, handle: Handle) -> Result<(String, String), ArbError>;

    /// Release `handle`. Deleting twice fails with `HandleNotFound`.
    fn delete(&mut self, handle: Handle) -> Result<(), ArbError>;
}

impl<B: HandleBridge + ?Sized> HandleBridge for &mut B {
    fn allocate_empty_arb(&mut self) -> Result<Handle, ArbError> {
        (**self).allocate_empty_arb()
    }

    fn allocate_empty_cmd(&mut self, iface: &str, oper: &str) -> Result<Handle, ArbError> {
        (**self).allocate_empty_cmd(iface, oper)
    }

    fn handle_kind(&self, handle: Handle) -> Result<HandleKind, ArbError> {
        (**self).handle_kind(handle)
    }

    fn clear(&mut self, handle: Handle) -> Result<(), ArbError> {
        (**self).clear(handle)
    }

    fn set_metadata_blob(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError> {
        (**self).set_metadata_blob(handle, bytes)
    }

    fn get_metadata_blob(&self, handle: Handle, buf: &mut [u8]) -> Result<usize, ArbError> {
        (**self).get_metadata_blob(handle, buf)
    }

    fn push_binary_arg(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError> {
        (**self).push_binary_arg(handle, bytes)
    }

    fn get_binary_arg(
        &self,
        handle: Handle,
        index: usize,
        buf: &mut [u8],
    ) -> Result<Option<usize>, ArbError> {
        (**self).get_binary_arg(handle, index, buf)
    }

    fn arg_count(&self, handle: Handle) -> Result<usize, ArbError> {
        (**self).arg_count(handle)
    }

    fn set_cmd_identifiers(
        &mut self,
        handle: Handle,
        iface: &str,
        oper: &str,
    ) -> Result<(), ArbError> {
        (**self).set_cmd_identifiers(handle, iface, oper)
    }

    fn cmd_identifiers(&self, handle: Handle) -> Result<(String, String), ArbError> {
        (**self).cmd_identifiers(handle)
    }

    fn delete(&mut self, handle: Handle) -> Result<(), ArbError> {
        (**self).delete(handle)
    }
}
