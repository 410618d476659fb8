//! Pointer plumbing shared by the entry points.
//!
//! Output follows the growable-buffer protocol: the true length is always
//! written to `*out_len`; the item is copied only if it fits, otherwise
//! the call returns `BufferTooSmall` and the caller retries with a buffer
//! of the reported size.

#![allow(unsafe_code)]

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::status::ArbStatus;

/// Write `item` to `buf` if it fits and its length to `out_len`.
pub(crate) fn write_bytes(item: &[u8], buf: *mut u8, buf_len: usize, out_len: *mut usize) -> i32 {
    if out_len.is_null() || (buf.is_null() && buf_len > 0) {
        return ArbStatus::InvalidArgument as i32;
    }
    // SAFETY: out_len is non-null and valid per caller contract.
    unsafe { *out_len = item.len() };
    if item.len() > buf_len {
        return ArbStatus::BufferTooSmall as i32;
    }
    if !item.is_empty() {
        // SAFETY: buf points to at least buf_len >= item.len() writable bytes.
        unsafe { std::ptr::copy_nonoverlapping(item.as_ptr(), buf, item.len()) };
    }
    ArbStatus::Ok as i32
}

/// Like [`write_bytes`] for text: the buffer must also hold the NUL
/// terminator, and `*out_len` excludes it.
pub(crate) fn write_str(text: &str, buf: *mut c_char, buf_len: usize, out_len: *mut usize) -> i32 {
    if out_len.is_null() || (buf.is_null() && buf_len > 0) {
        return ArbStatus::InvalidArgument as i32;
    }
    let bytes = text.as_bytes();
    // SAFETY: out_len is non-null and valid per caller contract.
    unsafe { *out_len = bytes.len() };
    if bytes.len() >= buf_len {
        return ArbStatus::BufferTooSmall as i32;
    }
    // SAFETY: buf points to buf_len > bytes.len() writable bytes.
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf as *mut u8, bytes.len());
        *buf.add(bytes.len()) = 0;
    }
    ArbStatus::Ok as i32
}

/// View `len` bytes at `ptr`. A null pointer is only allowed for `len == 0`.
pub(crate) fn read_bytes<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    // SAFETY: ptr is non-null and points to len readable bytes per caller contract.
    Some(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// View a NUL-terminated string. Returns `None` for null; invalid UTF-8 is
/// passed on lossily so validation can report the offending text.
pub(crate) fn read_str<'a>(ptr: *const c_char) -> Option<std::borrow::Cow<'a, str>> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: ptr is a valid NUL-terminated string per caller contract.
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
}

/// Write a scalar through an out-pointer.
pub(crate) fn write_out<T>(out: *mut T, value: T) -> i32 {
    if out.is_null() {
        return ArbStatus::InvalidArgument as i32;
    }
    // SAFETY: out is non-null, aligned and writable per caller contract.
    unsafe { *out = value };
    ArbStatus::Ok as i32
}
