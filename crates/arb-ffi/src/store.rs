//! The process-wide store and handle lifecycle entry points.

use std::fmt;
use std::os::raw::c_char;
use std::sync::Mutex;

use arb_core::HandleBridge;
use arb_store::ArbStore;

use crate::buffer::{write_out, write_str};
use crate::status::{status_of, ArbStatus};
use crate::types::ArbHandleKind;

static STORE: Mutex<ArbStore> = Mutex::new(ArbStore::new());

pub(crate) fn store() -> &'static Mutex<ArbStore> {
    &STORE
}

/// The shared store's lock was poisoned by a panic in another caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorePoisoned;

impl fmt::Display for StorePoisoned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("arb handle store lock is poisoned")
    }
}

impl std::error::Error for StorePoisoned {}

/// Run `f` against the store that the `arb_*` functions use.
///
/// Lets Rust code pass values to C callers as handles and read back
/// handles produced on the C side.
///
/// ```
/// use arb_core::ArbData;
///
/// let data = ArbData::new().with_arg(b"x".to_vec());
/// let h = arb_ffi::with_store(|store| data.to_raw(store, None)).unwrap().unwrap();
/// let mut n = 0usize;
/// assert_eq!(arb_ffi::store::arb_len(h, &mut n), 0);
/// assert_eq!(n, 1);
/// ```
pub fn with_store<R>(f: impl FnOnce(&mut ArbStore) -> R) -> Result<R, StorePoisoned> {
    let mut guard = STORE.lock().map_err(|_| StorePoisoned)?;
    Ok(f(&mut guard))
}

/// Allocate an empty ArbData. Writes the handle to `*out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_data_new(out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return ArbStatus::InvalidArgument as i32;
        }
        match ffi_lock!(STORE).allocate_empty_arb() {
            Ok(handle) => write_out(out, handle),
            Err(e) => ArbStatus::from(&e) as i32,
        }
    })
}

/// Release a handle. Deleting twice returns `ARB_STATUS_INVALID_HANDLE`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_handle_delete(handle: u64) -> i32 {
    ffi_guard!({ status_of(ffi_lock!(STORE).delete(handle)) })
}

/// Write the [`ArbHandleKind`] of `handle` to `*out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_handle_type(handle: u64, out: *mut ArbHandleKind) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return ArbStatus::InvalidArgument as i32;
        }
        match ffi_lock!(STORE).handle_kind(handle) {
            Ok(kind) => write_out(out, ArbHandleKind::from(kind)),
            Err(e) => ArbStatus::from(&e) as i32,
        }
    })
}

/// Render a human-readable dump of `handle` as a NUL-terminated string.
///
/// `*out_len` receives the text length excluding the terminator; returns
/// `ARB_STATUS_BUFFER_TOO_SMALL` unless `buf_len > *out_len`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_handle_dump(
    handle: u64,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({
        let dump = ffi_lock!(STORE).dump(handle);
        match dump {
            Ok(text) => write_str(&text, buf, buf_len, out_len),
            Err(e) => ArbStatus::from(&e) as i32,
        }
    })
}

/// Reset the data portion of `handle`. Command identifiers are kept.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_clear(handle: u64) -> i32 {
    ffi_guard!({ status_of(ffi_lock!(STORE).clear(handle)) })
}

/// Write the number of binary arguments of `handle` to `*out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_len(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return ArbStatus::InvalidArgument as i32;
        }
        match ffi_lock!(STORE).arg_count(handle) {
            Ok(n) => write_out(out, n),
            Err(e) => ArbStatus::from(&e) as i32,
        }
    })
}
