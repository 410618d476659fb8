//! Wrapper bridges for observing and breaking the transport.

use std::cell::RefCell;

use arb_core::{ArbError, Handle, HandleBridge, HandleKind};

/// One call made through a [`RecordingBridge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeCall {
    AllocateArb,
    AllocateCmd { iface: String, oper: String },
    HandleKind(Handle),
    Clear(Handle),
    SetMetadata { handle: Handle, len: usize },
    GetMetadata { handle: Handle, buf_len: usize },
    PushArg { handle: Handle, len: usize },
    GetArg {
        handle: Handle,
        index: usize,
        buf_len: usize,
    },
    ArgCount(Handle),
    SetCmdIdentifiers {
        handle: Handle,
        iface: String,
        oper: String,
    },
    CmdIdentifiers(Handle),
    Delete(Handle),
}

/// Forwards every call to `inner` and keeps a log of it.
pub struct RecordingBridge<B> {
    inner: B,
    calls: RefCell<Vec<BridgeCall>>,
}

impl<B: HandleBridge> RecordingBridge<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.borrow().clone()
    }

    /// Return the log and start a new one.
    pub fn take_calls(&self) -> Vec<BridgeCall> {
        self.calls.take()
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    fn record(&self, call: BridgeCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl<B: HandleBridge> HandleBridge for RecordingBridge<B> {
    fn allocate_empty_arb(&mut self) -> Result<Handle, ArbError> {
        self.record(BridgeCall::AllocateArb);
        self.inner.allocate_empty_arb()
    }

    fn allocate_empty_cmd(&mut self, iface: &str, oper: &str) -> Result<Handle, ArbError> {
        self.record(BridgeCall::AllocateCmd {
            iface: iface.to_owned(),
            oper: oper.to_owned(),
        });
        self.inner.allocate_empty_cmd(iface, oper)
    }

    fn handle_kind(&self, handle: Handle) -> Result<HandleKind, ArbError> {
        self.record(BridgeCall::HandleKind(handle));
        self.inner.handle_kind(handle)
    }

    fn clear(&mut self, handle: Handle) -> Result<(), ArbError> {
        self.record(BridgeCall::Clear(handle));
        self.inner.clear(handle)
    }

    fn set_metadata_blob(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError> {
        self.record(BridgeCall::SetMetadata {
            handle,
            len: bytes.len(),
        });
        self.inner.set_metadata_blob(handle, bytes)
    }

    fn get_metadata_blob(&self, handle: Handle, buf: &mut [u8]) -> Result<usize, ArbError> {
        self.record(BridgeCall::GetMetadata {
            handle,
            buf_len: buf.len(),
        });
        self.inner.get_metadata_blob(handle, buf)
    }

    fn push_binary_arg(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError> {
        self.record(BridgeCall::PushArg {
            handle,
            len: bytes.len(),
        });
        self.inner.push_binary_arg(handle, bytes)
    }

    fn get_binary_arg(
        &self,
        handle: Handle,
        index: usize,
        buf: &mut [u8],
    ) -> Result<Option<usize>, ArbError> {
        self.record(BridgeCall::GetArg {
            handle,
            index,
            buf_len: buf.len(),
        });
        self.inner.get_binary_arg(handle, index, buf)
    }

    fn arg_count(&self, handle: Handle) -> Result<usize, ArbError> {
        self.record(BridgeCall::ArgCount(handle));
        self.inner.arg_count(handle)
    }

    fn set_cmd_identifiers(
        &mut self,
        handle: Handle,
        iface: &str,
        oper: &str,
    ) -> Result<(), ArbError> {
        self.record(BridgeCall::SetCmdIdentifiers {
            handle,
            iface: iface.to_owned(),
            oper: oper.to_owned(),
        });
        self.inner.set_cmd_identifiers(handle, iface, oper)
    }

    fn cmd_identifiers(&self, handle: Handle) -> Result<(String, String), ArbError> {
        self.record(BridgeCall::CmdIdentifiers(handle));
        self.inner.cmd_identifiers(handle)
    }

    fn delete(&mut self, handle: Handle) -> Result<(), ArbError> {
        self.record(BridgeCall::Delete(handle));
        self.inner.delete(handle)
    }
}

/// Forwards to `inner` until a configured budget of allocations or
/// argument pushes is spent, then fails those calls.
pub struct FaultyBridge<B> {
    inner: B,
    allocations_left: Option<usize>,
    pushes_left: Option<usize>,
}

impl<B: HandleBridge> FaultyBridge<B> {
    /// No faults until one is configured.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            allocations_left: None,
            pushes_left: None,
        }
    }

    /// Let `n` allocations through, then refuse.
    pub fn fail_allocations_after(mut self, n: usize) -> Self {
        self.allocations_left = Some(n);
        self
    }

    /// Let `n` argument pushes through, then refuse.
    pub fn fail_pushes_after(mut self, n: usize) -> Self {
        self.pushes_left = Some(n);
        self
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    fn spend_allocation(&mut self) -> Result<(), ArbError> {
        spend(&mut self.allocations_left, "injected allocation failure")
    }
}

fn spend(budget: &mut Option<usize>, reason: &str) -> Result<(), ArbError> {
    match budget {
        Some(0) => Err(ArbError::HandleAllocationFailed {
            reason: reason.to_owned(),
        }),
        Some(n) => {
            *n -= 1;
            Ok(())
        }
        None => Ok(()),
    }
}

impl<B: HandleBridge> HandleBridge for FaultyBridge<B> {
    fn allocate_empty_arb(&mut self) -> Result<Handle, ArbError> {
        self.spend_allocation()?;
        self.inner.allocate_empty_arb()
    }

    fn allocate_empty_cmd(&mut self, iface: &str, oper: &str) -> Result<Handle, ArbError> {
        self.spend_allocation()?;
        self.inner.allocate_empty_cmd(iface, oper)
    }

    fn handle_kind(&self, handle: Handle) -> Result<HandleKind, ArbError> {
        self.inner.handle_kind(handle)
    }

    fn clear(&mut self, handle: Handle) -> Result<(), ArbError> {
        self.inner.clear(handle)
    }

    fn set_metadata_blob(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError> {
        self.inner.set_metadata_blob(handle, bytes)
    }

    fn get_metadata_blob(&self, handle: Handle, buf: &mut [u8]) -> Result<usize, ArbError> {
        self.inner.get_metadata_blob(handle, buf)
    }

    fn push_binary_arg(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError> {
        spend(&mut self.pushes_left, "injected push failure")?;
        self.inner.push_binary_arg(handle, bytes)
    }

    fn get_binary_arg(
        &self,
        handle: Handle,
        index: usize,
        buf: &mut [u8],
    ) -> Result<Option<usize>, ArbError> {
        self.inner.get_binary_arg(handle, index, buf)
    }

    fn arg_count(&self, handle: Handle) -> Result<usize, ArbError> {
        self.inner.arg_count(handle)
    }

    fn set_cmd_identifiers(
        &mut self,
        handle: Handle,
        iface: &str,
        oper: &str,
    ) -> Result<(), ArbError> {
        self.inner.set_cmd_identifiers(handle, iface, oper)
    }

    fn cmd_identifiers(&self, handle: Handle) -> Result<(String, String), ArbError> {
        self.inner.cmd_identifiers(handle)
    }

    fn delete(&mut self, handle: Handle) -> Result<(), ArbError> {
        self.inner.delete(handle)
    }
}
