//! C ABI for the arb data exchange.
//!
//! All handles live in one process-wide [`ArbStore`](arb_store::ArbStore)
//! behind a mutex. Every entry point catches panics (reporting
//! `ARB_STATUS_PANICKED`) and maps a poisoned lock to
//! `ARB_STATUS_INTERNAL_ERROR`. This is the only arb crate that contains
//! `unsafe` code.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::os::raw::c_char;

thread_local! {
    pub(crate) static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Remember the message of a caught panic for `arb_last_panic_message`.
pub(crate) fn record_panic(payload: &(dyn Any + Send)) {
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    };
    tracing::error!(message = %msg, "panic caught at FFI boundary");
    LAST_PANIC.with(|cell| *cell.borrow_mut() = msg);
}

/// Run `$body`, turning a panic into `$default`.
macro_rules! ffi_guard_or {
    ($default:expr, $body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                $crate::record_panic(&*payload);
                $default
            }
        }
    };
}

/// Run `$body`, turning a panic into `ArbStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::ArbStatus::Panicked as i32, $body)
    };
}

/// Lock a mutex, returning `ArbStatus::InternalError` if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::ArbStatus::InternalError as i32,
        }
    };
}

mod buffer;
pub mod cmd;
pub mod data;
pub mod status;
pub mod store;
pub mod types;

pub use status::ArbStatus;
pub use store::{with_store, StorePoisoned};
pub use types::ArbHandleKind;

/// Copy the message of the last panic caught on this thread into `buf`.
///
/// Returns the message length in bytes, excluding the terminator. The
/// message is truncated to `buf_len - 1` bytes and always NUL-terminated
/// when `buf` is non-null and `buf_len > 0`. Pass a null `buf` to query
/// the length only. Returns 0 if no panic has been recorded.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_last_panic_message(buf: *mut c_char, buf_len: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let msg = cell.borrow();
        let bytes = msg.as_bytes();
        if !buf.is_null() && buf_len > 0 {
            let copy_len = bytes.len().min(buf_len - 1);
            // SAFETY: buf points to buf_len writable bytes per caller contract.
            unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf as *mut u8, copy_len);
                *buf.add(copy_len) = 0;
            }
        }
        i32::try_from(bytes.len()).unwrap_or(i32::MAX)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ArbStatus;

    #[test]
    fn ffi_guard_catches_panic_and_stores_message() {
        LAST_PANIC.with(|cell| cell.borrow_mut().clear());

        let status = ffi_guard!({
            panic!("deliberate test panic");
        });
        assert_eq!(status, ArbStatus::Panicked as i32);

        let len = arb_last_panic_message(std::ptr::null_mut(), 0);
        assert!(len > 0);
        let mut buf = vec![0u8; len as usize + 1];
        let len2 = arb_last_panic_message(buf.as_mut_ptr() as *mut c_char, buf.len());
        assert_eq!(len, len2);
        let msg = std::str::from_utf8(&buf[..len as usize]).unwrap();
        assert!(msg.contains("deliberate test panic"), "got {msg:?}");
        assert_eq!(buf[len as usize], 0);
    }

    #[test]
    fn panic_message_is_truncated_to_buffer() {
        LAST_PANIC.with(|cell| *cell.borrow_mut() = "abcdef".to_owned());
        let mut buf = [0xFFu8; 4];
        let len = arb_last_panic_message(buf.as_mut_ptr() as *mut c_char, buf.len());
        assert_eq!(len, 6);
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn ffi_guard_or_returns_default_on_panic() {
        let v: u64 = ffi_guard_or!(7, {
            panic!("boom");
        });
        assert_eq!(v, 7);
    }
}
