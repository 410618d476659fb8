//! Reconstructing whichever kind of object a handle holds.

use std::fmt;

use crate::bridge::{Handle, HandleBridge, HandleKind};
use crate::cmd::ArbCmd;
use crate::config::TransportConfig;
use crate::data::ArbData;
use crate::error::ArbError;

/// An ArbData or ArbCmd, as found behind a handle of unknown kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArbObject {
    /// A plain data object.
    Data(ArbData),
    /// A command object.
    Cmd(ArbCmd),
}

impl ArbObject {
    /// Reconstruct the object behind `handle`, dispatching on its kind.
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
        match bridge.handle_kind(handle)? {
            HandleKind::ArbData => ArbData::from_raw_with(bridge, handle, config).map(Self::Data),
            HandleKind::ArbCmd => ArbCmd::from_raw_with(bridge, handle, config).map(Self::Cmd),
        }
    }

    /// Serialize into `handle`, or into a newly allocated handle.
    pub fn to_raw<B: HandleBridge + ?Sized>(
        &self,
        bridge: &mut B,
        handle: Option<Handle>,
    ) -> Result<Handle, ArbError> {
        match self {
            Self::Data(data) => data.to_raw(bridge, handle),
            Self::Cmd(cmd) => cmd.to_raw(bridge, handle),
        }
    }

    /// The handle kind this object serializes to.
    pub fn kind(&self) -> HandleKind {
        match self {
            Self::Data(_) => HandleKind::ArbData,
            Self::Cmd(_) => HandleKind::ArbCmd,
        }
    }

    /// The data portion, for either kind.
    pub fn data(&self) -> &ArbData {
        match self {
            Self::Data(data) => data,
            Self::Cmd(cmd) => cmd.data(),
        }
    }

    /// The command, if this is one.
    pub fn as_cmd(&self) -> Option<&ArbCmd> {
        match self {
            Self::Cmd(cmd) => Some(cmd),
            Self::Data(_) => None,
        }
    }

    /// Discard any identifiers and keep the data portion.
    pub fn into_data(self) -> ArbData {
        match self {
            Self::Data(data) => data,
            Self::Cmd(cmd) => cmd.into_data(),
        }
    }
}

impl From<ArbData> for ArbObject {
    fn from(data: ArbData) -> Self {
        Self::Data(data)
    }
}

impl From<ArbCmd> for ArbObject {
    fn from(cmd: ArbCmd) -> Self {
        Self::Cmd(cmd)
    }
}

impl fmt::Display for ArbObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => fmt::Display::fmt(data, f),
            Self::Cmd(cmd) => fmt::Display::fmt(cmd, f),
        }
    }
}
