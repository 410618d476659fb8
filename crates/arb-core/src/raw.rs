//! Snapshotting values into, and reconstructing them from, bridge handles.
//!
//! `to_raw` writes the canonical metadata blob, then each argument in
//! order, then (for commands) the identifier pair. `from_raw` reads them
//! back with the growable-buffer protocol: every item is first read into a
//! probe buffer and, if the bridge reports a larger true length, read a
//! second time into a buffer of exactly that length.

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::bridge::{Handle, HandleBridge, HandleKind};
use crate::cmd::ArbCmd;
use crate::codec;
use crate::config::{TransportConfig, DEFAULT_PROBE_CAPACITY};
use crate::data::ArbData;
use crate::error::ArbError;
use crate::ident::Identifier;

type ProbeBuf = SmallVec<[u8; DEFAULT_PROBE_CAPACITY]>;

/// Run a probe-then-resize read.
///
/// `read` receives a buffer and returns the true item length, or `None`
/// when there is no item. It is called once with `probe_capacity` bytes
/// (at least one) and, only if the item is larger, once more with a buffer
/// of exactly the reported length.
///
/// # Errors
///
/// Whatever `read` returns, or [`ArbError::MalformedEncoding`] if the item
/// changes size or disappears between the two calls.
pub fn read_growable<F>(probe_capacity: usize, mut read: F) -> Result<Option<Vec<u8>>, ArbError>
where
    F: FnMut(&mut [u8]) -> Result<Option<usize>, ArbError>,
{
    let mut buf: ProbeBuf = smallvec::smallvec![0; probe_capacity.max(1)];
    let Some(len) = read(buf.as_mut_slice())? else {
        return Ok(None);
    };
    if len > buf.len() {
        trace!(probe = buf.len(), len, "probe buffer too small, reading again");
        buf.resize(len, 0);
        match read(buf.as_mut_slice())? {
            Some(again) if again == len => {}
            Some(again) => {
                return Err(ArbError::MalformedEncoding {
                    detail: format!("item length changed from {len} to {again} between reads"),
                })
            }
            None => {
                return Err(ArbError::MalformedEncoding {
                    detail: "item disappeared between reads".to_owned(),
                })
            }
        }
    }
    buf.truncate(len);
    Ok(Some(buf.into_vec()))
}

fn write_data<B: HandleBridge + ?Sized>(
    bridge: &mut B,
    handle: Handle,
    blob: &[u8],
    data: &ArbData,
) -> Result<(), ArbError> {
    bridge.set_metadata_blob(handle, blob)?;
    for arg in data.args() {
        bridge.push_binary_arg(handle, arg)?;
    }
    Ok(())
}

/// Hand out a freshly allocated handle only if filling it succeeded.
fn release_on_error<B: HandleBridge + ?Sized>(
    bridge: &mut B,
    handle: Handle,
    result: Result<(), ArbError>,
) -> Result<Handle, ArbError> {
    if let Err(e) = result {
        if let Err(cleanup) = bridge.delete(handle) {
            warn!(handle, error = %cleanup, "could not release half-written handle");
        }
        return Err(e);
    }
    Ok(handle)
}

fn read_data<B: HandleBridge + ?Sized>(
    bridge: &B,
    handle: Handle,
    config: &TransportConfig,
) -> Result<ArbData, ArbError> {
    let cap = config.probe_capacity;
    let blob = read_growable(cap, |buf| bridge.get_metadata_blob(handle, buf).map(Some))?
        .unwrap_or_default();
    let metadata = codec::decode(&blob)?;

    let mut args = Vec::with_capacity(bridge.arg_count(handle)?);
    loop {
        let index = args.len();
        match read_growable(cap, |buf| bridge.get_binary_arg(handle, index, buf))? {
            Some(arg) => args.push(arg),
            None => break,
        }
    }
    debug!(handle, args = args.len(), metadata_bytes = blob.len(), "read ArbData");
    Ok(ArbData::from_validated(args, metadata))
}

impl ArbData {
    /// Serialize into `handle`, or into a newly allocated handle if `None`.
    ///
    /// An existing handle is cleared first, so its previous contents are
    /// replaced rather than merged.
    ///
    /// # Errors
    ///
    /// [`ArbError::HandleAllocationFailed`] or [`ArbError::HandleNotFound`]
    /// from the bridge. A newly allocated handle is released again if
    /// writing into it fails.
    pub fn to_raw<B: HandleBridge + ?Sized>(
        &self,
        bridge: &mut B,
        handle: Option<Handle>,
    ) -> Result<Handle, ArbError> {
        let blob = codec::encode(self.metadata())?;
        let handle = match handle {
            Some(h) => {
                bridge.clear(h)?;
                write_data(bridge, h, &blob, self)?;
                h
            }
            None => {
                let h = bridge.allocate_empty_arb()?;
                let written = write_data(bridge, h, &blob, self);
                release_on_error(bridge, h, written)?
            }
        };
        debug!(handle, args = self.len(), metadata_bytes = blob.len(), "wrote ArbData");
        Ok(handle)
    }

    /// Reconstruct from the data portion of a data or command handle.
    pub fn from_raw<B: HandleBridge + ?Sized>(
        bridge: &B,
        handle: Handle,
    ) -> Result<Self, ArbError> {
        Self::from_raw_with(bridge, handle, &TransportConfig::default())
    }

    /// [`from_raw`](Self::from_raw) with explicit transport settings.
    pub fn from_raw_with<B: HandleBridge + ?Sized>(
        bridge: &B,
        handle: Handle,
        config: &TransportConfig,
    ) -> Result<Self, ArbError> {
        read_data(bridge, handle, config)
    }
}

impl ArbCmd {
    /// Serialize into `handle`, or into a newly allocated handle if `None`.
    ///
    /// An existing handle must be a command handle; it is cleared and its
    /// identifiers overwritten.
    pub fn to_raw<B: HandleBridge + ?Sized>(
        &self,
        bridge: &mut B,
        handle: Option<Handle>,
    ) -> Result<Handle, ArbError> {
        let blob = codec::encode(self.metadata())?;
        let handle = match handle {
            Some(h) => {
                if bridge.handle_kind(h)? != HandleKind::ArbCmd {
                    return Err(ArbError::HandleTypeMismatch {
                        handle: h,
                        expected: HandleKind::ArbCmd,
                    });
                }
                bridge.clear(h)?;
                write_data(bridge, h, &blob, self.data())?;
                bridge.set_cmd_identifiers(h, self.iface(), self.oper())?;
                h
            }
            None => {
                let h = bridge.allocate_empty_cmd(self.iface(), self.oper())?;
                let written = write_data(bridge, h, &blob, self.data());
                release_on_error(bridge, h, written)?
            }
        };
        debug!(handle, iface = self.iface(), oper = self.oper(), "wrote ArbCmd");
        Ok(handle)
    }

    /// Reconstruct from a command handle.
    ///
    /// # Errors
    ///
    /// Besides the [`ArbData::from_raw`] errors,
    /// [`ArbError::HandleTypeMismatch`] for a data handle and
    /// [`ArbError::InvalidIdentifier`] if the stored identifiers no longer
    /// satisfy the grammar.
    pub fn from_raw<B: HandleBridge + ?Sized>(
        bridge: &B,
        handle: Handle,
    ) -> Result<Self, ArbError> {
        Self::from_raw_with(bridge, handle, &TransportConfig::default())
    }

    /// [`from_raw`](Self::from_raw) with explicit transport settings.
    pub fn from_raw_with<B: HandleBridge + ?Sized>(
        bridge: &B,
        handle: Handle,
        config: &TransportConfig,
    ) -> Result<Self, ArbError> {
        if bridge.handle_kind(handle)? != HandleKind::ArbCmd {
            return Err(ArbError::HandleTypeMismatch {
                handle,
                expected: HandleKind::ArbCmd,
            });
        }
        let data = read_data(bridge, handle, config)?;
        let (iface, oper) = bridge.cmd_identifiers(handle)?;
        let iface = Identifier::new(iface)?;
        let oper = Identifier::new(oper)?;
        Ok(Self::from_identifiers(iface, oper, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_item_is_read_once() {
        let item = vec![7u8; 10];
        let mut calls = Vec::new();
        let out = read_growable(16, |buf| {
            calls.push(buf.len());
            if item.len() <= buf.len() {
                buf[..item.len()].copy_from_slice(&item);
            }
            Ok(Some(item.len()))
        })
        .unwrap();
        assert_eq!(out, Some(item.clone()));
        assert_eq!(calls, [16]);
    }

    #[test]
    fn large_item_is_read_twice_with_exact_buffer() {
        let item: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut calls = Vec::new();
        let out = read_growable(DEFAULT_PROBE_CAPACITY, |buf| {
            calls.push(buf.len());
            if item.len() <= buf.len() {
                buf[..item.len()].copy_from_slice(&item);
            }
            Ok(Some(item.len()))
        })
        .unwrap();
        assert_eq!(out, Some(item));
        assert_eq!(calls, [DEFAULT_PROBE_CAPACITY, 1000]);
    }

    #[test]
    fn missing_item_is_none() {
        assert_eq!(read_growable(8, |_| Ok(None)).unwrap(), None);
    }

    #[test]
    fn zero_probe_capacity_still_works() {
        let out = read_growable(0, |buf| {
            if buf.len() >= 3 {
                buf[..3].copy_from_slice(b"abc");
            }
            Ok(Some(3))
        })
        .unwrap();
        assert_eq!(out.as_deref(), Some(&b"abc"[..]));
    }

    #[test]
    fn length_change_between_reads_is_malformed() {
        let mut first = true;
        let r = read_growable(4, |_| {
            let len = if first { 10 } else { 11 };
            first = false;
            Ok(Some(len))
        });
        assert!(matches!(r, Err(ArbError::MalformedEncoding { .. })));
    }

    #[test]
    fn bridge_errors_propagate() {
        let r = read_growable(4, |_| Err(ArbError::HandleNotFound { handle: 9 }));
        assert_eq!(r, Err(ArbError::HandleNotFound { handle: 9 }));
    }

    #[test]
    fn empty_item_is_some_empty() {
        assert_eq!(read_growable(4, |_| Ok(Some(0))).unwrap(), Some(Vec::new()));
    }
}
