//! C-compatible status codes.
//!
//! [`ArbStatus`] is a `repr(i32)` enum with one code per [`ArbError`]
//! kind plus the conditions only the C boundary can hit.

use arb_core::ArbError;

/// Status code returned by every `arb_*` function.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArbStatus {
    /// Success.
    Ok = 0,
    /// Handle is unknown or was already deleted.
    InvalidHandle = -1,
    /// A pointer argument is null or otherwise unusable.
    InvalidArgument = -2,
    /// Caller-provided buffer is too small; the required length was written.
    BufferTooSmall = -3,
    /// Interface or operation identifier violates the grammar.
    InvalidIdentifier = -4,
    /// A binary argument pointer was null with a non-zero length.
    InvalidBinaryArgument = -5,
    /// Metadata value is not representable in the JSON model.
    InvalidMetadataValue = -6,
    /// Argument index is past the end.
    IndexOutOfRange = -7,
    /// Metadata key is absent.
    KeyNotFound = -8,
    /// Metadata blob or JSON text could not be parsed.
    MalformedEncoding = -9,
    /// Metadata blob holds a value outside the JSON model.
    UnsupportedValueType = -10,
    /// The store refused to allocate a handle.
    HandleAllocationFailed = -11,
    /// Command-only operation on a data handle.
    HandleTypeMismatch = -12,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ArbError> for ArbStatus {
    fn from(e: &ArbError) -> Self {
        match e {
            ArbError::InvalidIdentifier { .. } => ArbStatus::InvalidIdentifier,
            ArbError::InvalidBinaryArgument { .. } => ArbStatus::InvalidBinaryArgument,
            ArbError::InvalidMetadataValue { .. } => ArbStatus::InvalidMetadataValue,
            ArbError::IndexOutOfRange { .. } => ArbStatus::IndexOutOfRange,
            ArbError::KeyNotFound { .. } => ArbStatus::KeyNotFound,
            ArbError::MalformedEncoding { .. } => ArbStatus::MalformedEncoding,
            ArbError::UnsupportedValueType { .. } => ArbStatus::UnsupportedValueType,
            ArbError::HandleNotFound { .. } => ArbStatus::InvalidHandle,
            ArbError::HandleTypeMismatch { .. } => ArbStatus::HandleTypeMismatch,
            ArbError::HandleAllocationFailed { .. } => ArbStatus::HandleAllocationFailed,
        }
    }
}

/// Collapse a store result into a status code.
pub(crate) fn status_of(result: Result<(), ArbError>) -> i32 {
    match result {
        Ok(()) => ArbStatus::Ok as i32,
        Err(e) => ArbStatus::from(&e) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arb_core::HandleKind;

    #[test]
    fn every_error_maps_to_a_distinct_negative_code() {
        let errors = [
            ArbError::InvalidIdentifier {
                identifier: String::new(),
            },
            ArbError::InvalidBinaryArgument {
                reason: String::new(),
            },
            ArbError::InvalidMetadataValue {
                value: String::new(),
                reason: String::new(),
            },
            ArbError::IndexOutOfRange { index: 1, len: 0 },
            ArbError::KeyNotFound { key: String::new() },
            ArbError::MalformedEncoding {
                detail: String::new(),
            },
            ArbError::UnsupportedValueType {
                detail: String::new(),
            },
            ArbError::HandleNotFound { handle: 0 },
            ArbError::HandleTypeMismatch {
                handle: 0,
                expected: HandleKind::ArbCmd,
            },
            ArbError::HandleAllocationFailed {
                reason: String::new(),
            },
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| ArbStatus::from(e) as i32).collect();
        assert!(codes.iter().all(|&c| c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn status_of_ok_is_zero() {
        assert_eq!(status_of(Ok(())), 0);
        assert_eq!(
            status_of(Err(ArbError::HandleNotFound { handle: 3 })),
            ArbStatus::InvalidHandle as i32
        );
    }
}
