//! Error types for the ArbData/ArbCmd data-interchange layer.
//!
//! [`ArbError`] has one variant per failure kind. Validation errors are
//! raised by the mutating call that caused them; handle-boundary errors
//! only come out of `to_raw`/`from_raw` and the [`HandleBridge`] methods.
//!
//! [`HandleBridge`]: crate::bridge::HandleBridge

use std::error::Error;
use std::fmt;

use crate::bridge::{Handle, HandleKind};

/// Errors raised by the containers, the codec and the handle transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArbError {
    /// An interface or operation identifier violates the naming grammar.
    InvalidIdentifier {
        /// The offending identifier, verbatim.
        identifier: String,
    },
    /// A positional argument is not a materialized byte sequence.
    InvalidBinaryArgument {
        /// Why the argument was rejected.
        reason: String,
    },
    /// A metadata value falls outside the JSON-compatible value model.
    InvalidMetadataValue {
        /// Diagnostic rendering of the rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A positional index is past the end of the argument list.
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of arguments at the time of the call.
        len: usize,
    },
    /// A metadata key does not exist.
    KeyNotFound {
        /// The missing key.
        key: String,
    },
    /// Bytes do not parse as a single top-level CBOR map.
    MalformedEncoding {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A decoded value is valid CBOR but not JSON-compatible.
    UnsupportedValueType {
        /// Human-readable description of the offending value.
        detail: String,
    },
    /// The handle was never allocated, or was already deleted.
    HandleNotFound {
        /// The unresolved handle.
        handle: Handle,
    },
    /// The handle exists but holds a different kind of object.
    HandleTypeMismatch {
        /// The handle that was looked up.
        handle: Handle,
        /// The kind the operation required.
        expected: HandleKind,
    },
    /// The bridge could not provide a new handle.
    HandleAllocationFailed {
        /// Why allocation was refused.
        reason: String,
    },
}

impl fmt::Display for ArbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier { identifier } => {
                write!(f, "invalid identifier {identifier:?}")
            }
            Self::InvalidBinaryArgument { reason } => {
                write!(f, "invalid binary argument: {reason}")
            }
            Self::InvalidMetadataValue { value, reason } => {
                write!(f, "invalid metadata value {value}: {reason}")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "argument index {index} out of range for length {len}")
            }
            Self::KeyNotFound { key } => write!(f, "metadata key {key:?} not found"),
            Self::MalformedEncoding { detail } => write!(f, "malformed encoding: {detail}"),
            Self::UnsupportedValueType { detail } => {
                write!(f, "unsupported value type: {detail}")
            }
            Self::HandleNotFound { handle } => write!(f, "handle {handle:#x} not found"),
            Self::HandleTypeMismatch { handle, expected } => {
                write!(f, "handle {handle:#x} does not hold an {expected}")
            }
            Self::HandleAllocationFailed { reason } => {
                write!(f, "handle allocation failed: {reason}")
            }
        }
    }
}

impl Error for ArbError {}

/// Errors detected by `validate()` on the configuration structs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The growable-buffer probe capacity must be at least one byte.
    ZeroProbeCapacity,
    /// A live-handle limit of zero would refuse every allocation.
    ZeroHandleLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroProbeCapacity => write!(f, "probe_capacity must be at least 1"),
            Self::ZeroHandleLimit => write!(f, "max_live_handles must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
