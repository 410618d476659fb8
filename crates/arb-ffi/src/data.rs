//! Metadata and binary-argument entry points, valid for data and command
//! handles alike.

use std::os::raw::c_char;

use arb_core::{codec, ArbError, HandleBridge};

use crate::buffer::{read_bytes, read_str, write_bytes, write_str};
use crate::status::{status_of, ArbStatus};
use crate::store::store;

/// Replace the metadata of `handle` with the CBOR map in `bytes[..len]`.
///
/// The blob must be a single CBOR map of JSON-compatible values.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_cbor_set(handle: u64, bytes: *const u8, len: usize) -> i32 {
    ffi_guard!({
        let Some(bytes) = read_bytes(bytes, len) else {
            return ArbStatus::InvalidArgument as i32;
        };
        status_of(ffi_lock!(store()).set_metadata_blob(handle, bytes))
    })
}

/// Copy the CBOR metadata blob of `handle` into `buf`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_cbor_get(
    handle: u64,
    buf: *mut u8,
    buf_len: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({
        let store = ffi_lock!(store());
        match store.object(handle) {
            Ok(object) => write_bytes(object.metadata_blob(), buf, buf_len, out_len),
            Err(e) => ArbStatus::from(&e) as i32,
        }
    })
}

/// Replace the metadata of `handle` with a JSON object.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_json_set(handle: u64, json: *const c_char) -> i32 {
    ffi_guard!({
        let Some(text) = read_str(json) else {
            return ArbStatus::InvalidArgument as i32;
        };
        let blob = match codec::metadata_from_json(&text).and_then(|m| codec::encode(&m)) {
            Ok(blob) => blob,
            Err(e) => return ArbStatus::from(&e) as i32,
        };
        status_of(ffi_lock!(store()).set_metadata_blob(handle, &blob))
    })
}

/// Copy the metadata of `handle`, rendered as a JSON object, into `buf`
/// as a NUL-terminated string.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_json_get(
    handle: u64,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({
        let json = {
            let store = ffi_lock!(store());
            store
                .object(handle)
                .and_then(|object| codec::decode(object.metadata_blob()))
                .map(|metadata| codec::metadata_to_json(&metadata))
        };
        match json {
            Ok(text) => write_str(&text, buf, buf_len, out_len),
            Err(e) => ArbStatus::from(&e) as i32,
        }
    })
}

/// Append `bytes[..len]` as a binary argument.
///
/// A null `bytes` with non-zero `len` is `ARB_STATUS_INVALID_BINARY_ARGUMENT`;
/// with zero `len` it appends an empty argument.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_push_raw(handle: u64, bytes: *const u8, len: usize) -> i32 {
    ffi_guard!({
        let Some(bytes) = read_bytes(bytes, len) else {
            let e = ArbError::InvalidBinaryArgument {
                reason: format!("null pointer with length {len}"),
            };
            return ArbStatus::from(&e) as i32;
        };
        status_of(ffi_lock!(store()).push_binary_arg(handle, bytes))
    })
}

/// Copy binary argument `index` of `handle` into `buf`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_get_raw(
    handle: u64,
    index: usize,
    buf: *mut u8,
    buf_len: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({
        let store = ffi_lock!(store());
        let object = match store.object(handle) {
            Ok(object) => object,
            Err(e) => return ArbStatus::from(&e) as i32,
        };
        match object.args().get(index) {
            Some(arg) => write_bytes(arg, buf, buf_len, out_len),
            None => ArbStatus::IndexOutOfRange as i32,
        }
    })
}
