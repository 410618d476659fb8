//! [`ArbStore`]: the in-memory [`HandleBridge`].

use arb_core::codec::{self, EMPTY_MAP};
use arb_core::ident::validate_identifier;
use arb_core::{ArbError, ConfigError, Handle, HandleBridge, HandleKind};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::handle::HandleTable;

/// Interface/operation pair carried by a command handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CmdIdentifiers {
    /// Interface identifier.
    pub iface: String,
    /// Operation identifier.
    pub oper: String,
}

/// The serialized form of one ArbData or ArbCmd.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    metadata: Vec<u8>,
    args: Vec<Vec<u8>>,
    cmd: Option<CmdIdentifiers>,
}

impl StoredObject {
    fn empty(cmd: Option<CmdIdentifiers>) -> Self {
        Self {
            metadata: EMPTY_MAP.to_vec(),
            args: Vec::new(),
            cmd,
        }
    }

    /// Which kind of object this is.
    pub fn kind(&self) -> HandleKind {
        if self.cmd.is_some() {
            HandleKind::ArbCmd
        } else {
            HandleKind::ArbData
        }
    }

    /// The CBOR metadata blob.
    pub fn metadata_blob(&self) -> &[u8] {
        &self.metadata
    }

    /// The binary arguments.
    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }

    /// The identifiers, for a command.
    pub fn cmd_identifiers(&self) -> Option<&CmdIdentifiers> {
        self.cmd.as_ref()
    }
}

/// Serialized objects behind generation-checked `u64` handles.
///
/// # Examples
///
/// ```
/// use arb_core::ArbData;
/// use arb_store::ArbStore;
///
/// let mut store = ArbStore::new();
/// let data = ArbData::new().with_arg(b"payload".to_vec()).with_json("n", &1).unwrap();
/// let handle = data.to_raw(&mut store, None).unwrap();
/// assert_eq!(ArbData::from_raw(&store, handle).unwrap(), data);
/// ```
pub struct ArbStore {
    objects: HandleTable<StoredObject>,
    config: StoreConfig,
}

impl Default for ArbStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbStore {
    /// An empty, unbounded store.
    pub const fn new() -> Self {
        Self {
            objects: HandleTable::new(),
            config: StoreConfig::unbounded(),
        }
    }

    /// An empty store with explicit limits.
    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            objects: HandleTable::new(),
            config,
        })
    }

    /// The limits this store enforces.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no handles are live.
    pub fn is_empty(&self) -> bool {
        self.objects.len() == 0
    }

    /// Live handles in allocation-slot order.
    pub fn live_handles(&self) -> Vec<Handle> {
        self.objects.iter().map(|(h, _)| h).collect()
    }

    /// The stored form of `handle`.
    pub fn object(&self, handle: Handle) -> Result<&StoredObject, ArbError> {
        self.objects
            .get(handle)
            .ok_or(ArbError::HandleNotFound { handle })
    }

    fn object_mut(&mut self, handle: Handle) -> Result<&mut StoredObject, ArbError> {
        self.objects
            .get_mut(handle)
            .ok_or(ArbError::HandleNotFound { handle })
    }

    fn cmd_mut(&mut self, handle: Handle) -> Result<&mut CmdIdentifiers, ArbError> {
        self.object_mut(handle)?
            .cmd
            .as_mut()
            .ok_or(ArbError::HandleTypeMismatch {
                handle,
                expected: HandleKind::ArbCmd,
            })
    }

    fn allocate(&mut self, object: StoredObject) -> Result<Handle, ArbError> {
        if let Some(max) = self.config.max_live_handles {
            if self.objects.len() >= max {
                warn!(max, "handle limit reached, refusing allocation");
                return Err(ArbError::HandleAllocationFailed {
                    reason: format!("live handle limit of {max} reached"),
                });
            }
        }
        let kind = object.kind();
        let handle = self.objects.insert(object).ok_or_else(|| {
            warn!("handle slot space exhausted");
            ArbError::HandleAllocationFailed {
                reason: "handle slot space exhausted".to_owned(),
            }
        })?;
        debug!(handle, %kind, "allocated handle");
        Ok(handle)
    }

    /// Human-readable rendering of the object behind `handle`.
    ///
    /// Metadata is shown as JSON, arguments as escaped byte strings.
    pub fn dump(&self, handle: Handle) -> Result<String, ArbError> {
        let object = self.object(handle)?;
        let metadata = codec::decode(&object.metadata)?;
        let mut out = format!("{} handle {handle:#x}\n", object.kind());
        if let Some(ids) = &object.cmd {
            out.push_str(&format!("  iface: {}\n", ids.iface));
            out.push_str(&format!("  oper: {}\n", ids.oper));
        }
        out.push_str(&format!("  metadata: {}\n", codec::metadata_to_json(&metadata)));
        out.push_str(&format!("  args: {}\n", object.args.len()));
        for (i, arg) in object.args.iter().enumerate() {
            out.push_str(&format!("    [{i}] b'{}'\n", arg.escape_ascii()));
        }
        Ok(out)
    }
}

fn copy_if_fits(item: &[u8], buf: &mut [u8]) -> usize {
    if let Some(dst) = buf.get_mut(..item.len()) {
        dst.copy_from_slice(item);
    }
    item.len()
}

impl HandleBridge for ArbStore {
    fn allocate_empty_arb(&mut self) -> Result<Handle, ArbError> {
        self.allocate(StoredObject::empty(None))
    }

    fn allocate_empty_cmd(&mut self, iface: &str, oper: &str) -> Result<Handle, ArbError> {
        validate_identifier(iface)?;
        validate_identifier(oper)?;
        self.allocate(StoredObject::empty(Some(CmdIdentifiers {
            iface: iface.to_owned(),
            oper: oper.to_owned(),
        })))
    }

    fn handle_kind(&self, handle: Handle) -> Result<HandleKind, ArbError> {
        Ok(self.object(handle)?.kind())
    }

    fn clear(&mut self, handle: Handle) -> Result<(), ArbError> {
        let object = self.object_mut(handle)?;
        object.metadata = EMPTY_MAP.to_vec();
        object.args.clear();
        Ok(())
    }

    fn set_metadata_blob(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError> {
        let object = self.object_mut(handle)?;
        codec::decode(bytes)?;
        object.metadata = bytes.to_vec();
        Ok(())
    }

    fn get_metadata_blob(&self, handle: Handle, buf: &mut [u8]) -> Result<usize, ArbError> {
        Ok(copy_if_fits(&self.object(handle)?.metadata, buf))
    }

    fn push_binary_arg(&mut self, handle: Handle, bytes: &[u8]) -> Result<(), ArbError> {
        self.object_mut(handle)?.args.push(bytes.to_vec());
        Ok(())
    }

    fn get_binary_arg(
        &self,
        handle: Handle,
        index: usize,
        buf: &mut [u8],
    ) -> Result<Option<usize>, ArbError> {
        let object = self.object(handle)?;
        Ok(object.args.get(index).map(|arg| copy_if_fits(arg, buf)))
    }

    fn arg_count(&self, handle: Handle) -> Result<usize, ArbError> {
        Ok(self.object(handle)?.args.len())
    }

    fn set_cmd_identifiers(
        &mut self,
        handle: Handle,
        iface: &str,
        oper: &str,
    ) -> Result<(), ArbError> {
        validate_identifier(iface)?;
        validate_identifier(oper)?;
        let ids = self.cmd_mut(handle)?;
        ids.iface = iface.to_owned();
        ids.oper = oper.to_owned();
        Ok(())
    }

    fn cmd_identifiers(&self, handle: Handle) -> Result<(String, String), ArbError> {
        match &self.object(handle)?.cmd {
            Some(ids) => Ok((ids.iface.clone(), ids.oper.clone())),
            None => Err(ArbError::HandleTypeMismatch {
                handle,
                expected: HandleKind::ArbCmd,
            }),
        }
    }

    fn delete(&mut self, handle: Handle) -> Result<(), ArbError> {
        self.objects
            .remove(handle)
            .ok_or(ArbError::HandleNotFound { handle })?;
        debug!(handle, "deleted handle");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handles_hold_empty_map() {
        let mut store = ArbStore::new();
        let h = store.allocate_empty_arb().unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(store.get_metadata_blob(h, &mut buf).unwrap(), 1);
        assert_eq!(buf[0], 0xA0);
        assert_eq!(store.arg_count(h).unwrap(), 0);
        assert_eq!(store.handle_kind(h).unwrap(), HandleKind::ArbData);
    }

    #[test]
    fn small_buffer_reports_length_without_copying() {
        let mut store = ArbStore::new();
        let h = store.allocate_empty_arb().unwrap();
        store.push_binary_arg(h, b"hello").unwrap();
        let mut buf = [0xFFu8; 2];
        assert_eq!(store.get_binary_arg(h, 0, &mut buf).unwrap(), Some(5));
        assert_eq!(buf, [0xFF, 0xFF]);
        let mut buf = [0u8; 5];
        assert_eq!(store.get_binary_arg(h, 0, &mut buf).unwrap(), Some(5));
        assert_eq!(&buf, b"hello");
        assert_eq!(store.get_binary_arg(h, 1, &mut buf).unwrap(), None);
    }

    #[test]
    fn invalid_blob_is_rejected_and_old_blob_kept() {
        let mut store = ArbStore::new();
        let h = store.allocate_empty_arb().unwrap();
        let err = store.set_metadata_blob(h, &[0xFF, 0x00]).unwrap_err();
        assert!(matches!(err, ArbError::MalformedEncoding { .. }));
        // 0x41 0x00: a one-byte byte string, valid CBOR but not a map.
        assert!(store.set_metadata_blob(h, &[0x41, 0x00]).is_err());
        assert_eq!(store.object(h).unwrap().metadata_blob(), EMPTY_MAP);
    }

    #[test]
    fn cmd_identifiers_are_validated() {
        let mut store = ArbStore::new();
        assert!(matches!(
            store.allocate_empty_cmd("a b", "c"),
            Err(ArbError::InvalidIdentifier { .. })
        ));
        assert!(store.is_empty());
        let h = store.allocate_empty_cmd("a", "b").unwrap();
        assert!(store.set_cmd_identifiers(h, "x", "").is_err());
        assert_eq!(store.cmd_identifiers(h).unwrap(), ("a".into(), "b".into()));
        store.set_cmd_identifiers(h, "x", "y").unwrap();
        assert_eq!(store.cmd_identifiers(h).unwrap(), ("x".into(), "y".into()));
    }

    #[test]
    fn cmd_operations_on_data_handle_mismatch() {
        let mut store = ArbStore::new();
        let h = store.allocate_empty_arb().unwrap();
        let expected = ArbError::HandleTypeMismatch {
            handle: h,
            expected: HandleKind::ArbCmd,
        };
        assert_eq!(store.cmd_identifiers(h), Err(expected.clone()));
        assert_eq!(store.set_cmd_identifiers(h, "a", "b"), Err(expected));
    }

    #[test]
    fn clear_keeps_identifiers() {
        let mut store = ArbStore::new();
        let h = store.allocate_empty_cmd("a", "b").unwrap();
        store.push_binary_arg(h, b"x").unwrap();
        store.clear(h).unwrap();
        assert_eq!(store.arg_count(h).unwrap(), 0);
        assert_eq!(store.handle_kind(h).unwrap(), HandleKind::ArbCmd);
    }

    #[test]
    fn delete_twice_fails() {
        let mut store = ArbStore::new();
        let h = store.allocate_empty_arb().unwrap();
        store.delete(h).unwrap();
        assert_eq!(store.delete(h), Err(ArbError::HandleNotFound { handle: h }));
        assert_eq!(
            store.arg_count(h),
            Err(ArbError::HandleNotFound { handle: h })
        );
    }

    #[test]
    fn limit_refuses_allocation_until_a_handle_is_freed() {
        let config = StoreConfig::default().with_max_live_handles(2);
        let mut store = ArbStore::with_config(config).unwrap();
        let a = store.allocate_empty_arb().unwrap();
        store.allocate_empty_cmd("i", "o").unwrap();
        assert!(matches!(
            store.allocate_empty_arb(),
            Err(ArbError::HandleAllocationFailed { .. })
        ));
        store.delete(a).unwrap();
        assert!(store.allocate_empty_arb().is_ok());
    }

    #[test]
    fn zero_limit_config_rejected() {
        let config = StoreConfig::default().with_max_live_handles(0);
        assert!(matches!(
            ArbStore::with_config(config),
            Err(ConfigError::ZeroHandleLimit)
        ));
    }

    #[test]
    fn dump_shows_identifiers_metadata_and_args() {
        let mut store = ArbStore::new();
        let h = store.allocate_empty_cmd("qx", "run").unwrap();
        // {"n": 1}
        store.set_metadata_blob(h, &[0xA1, 0x61, b'n', 0x01]).unwrap();
        store.push_binary_arg(h, b"a\0").unwrap();
        let dump = store.dump(h).unwrap();
        let header = format!("ArbCmd handle {h:#x}\n");
        let body = concat!(
            "  iface: qx\n  oper: run\n",
            "  metadata: {\"n\":1}\n  args: 1\n    [0] b'a\\x00'\n",
        );
        assert_eq!(dump, header + body);
    }

    #[test]
    fn live_handles_tracks_allocation_and_deletion() {
        let mut store = ArbStore::new();
        let a = store.allocate_empty_arb().unwrap();
        let b = store.allocate_empty_arb().unwrap();
        store.delete(a).unwrap();
        assert_eq!(store.live_handles(), [b]);
        assert_eq!(store.len(), 1);
    }
}
