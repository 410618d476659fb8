//! C-compatible enums.

use arb_core::HandleKind;

/// Kind of object behind a handle, as reported by `arb_handle_type`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArbHandleKind {
    /// Binary arguments plus metadata.
    Data = 1,
    /// Data plus an interface/operation pair.
    Cmd = 2,
}

impl From<HandleKind> for ArbHandleKind {
    fn from(kind: HandleKind) -> Self {
        match kind {
            HandleKind::ArbData => ArbHandleKind::Data,
            HandleKind::ArbCmd => ArbHandleKind::Cmd,
        }
    }
}
