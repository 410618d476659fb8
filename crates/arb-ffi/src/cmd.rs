//! Command handle entry points.

use std::os::raw::c_char;

use arb_core::HandleBridge;

use crate::buffer::{read_str, write_out, write_str};
use crate::status::ArbStatus;
use crate::store::store;

/// Allocate an empty ArbCmd with the given identifiers. Writes the handle
/// to `*out`.
///
/// Identifiers that violate the grammar, including non-UTF-8 text, yield
/// `ARB_STATUS_INVALID_IDENTIFIER`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_cmd_new(iface: *const c_char, oper: *const c_char, out: *mut u64) -> i32 {
    ffi_guard!({
        let (Some(iface), Some(oper)) = (read_str(iface), read_str(oper)) else {
            return ArbStatus::InvalidArgument as i32;
        };
        if out.is_null() {
            return ArbStatus::InvalidArgument as i32;
        }
        match ffi_lock!(store()).allocate_empty_cmd(&iface, &oper) {
            Ok(handle) => write_out(out, handle),
            Err(e) => ArbStatus::from(&e) as i32,
        }
    })
}

fn identifier_get(
    handle: u64,
    pick: fn((String, String)) -> String,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> i32 {
    let ids = ffi_lock!(store()).cmd_identifiers(handle);
    match ids {
        Ok(ids) => write_str(&pick(ids), buf, buf_len, out_len),
        Err(e) => ArbStatus::from(&e) as i32,
    }
}

/// Copy the interface identifier of a command handle into `buf` as a
/// NUL-terminated string.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_cmd_iface_get(
    handle: u64,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({ identifier_get(handle, |(iface, _)| iface, buf, buf_len, out_len) })
}

/// Copy the operation identifier of a command handle into `buf` as a
/// NUL-terminated string.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arb_cmd_oper_get(
    handle: u64,
    buf: *mut c_char,
    buf_len: usize,
    out_len: *mut usize,
) -> i32 {
    ffi_guard!({ identifier_get(handle, |(_, oper)| oper, buf, buf_len, out_len) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{arb_data_new, arb_handle_delete, arb_handle_type, with_store};
    use crate::types::ArbHandleKind;
    use arb_core::ArbCmd;
    use arb_test_utils::fixtures::reference_cmd;
    use std::ffi::CString;

    fn read(
        f: extern "C" fn(u64, *mut c_char, usize, *mut usize) -> i32,
        h: u64,
    ) -> Result<String, i32> {
        let mut buf = [0 as c_char; 64];
        let mut len = 0usize;
        match f(h, buf.as_mut_ptr(), buf.len(), &mut len) {
            0 => Ok(buf[..len].iter().map(|&c| c as u8 as char).collect()),
            status => Err(status),
        }
    }

    #[test]
    fn new_cmd_reports_identifiers() {
        let iface = CString::new("qx.backend").unwrap();
        let oper = CString::new("run").unwrap();
        let mut h = 0u64;
        assert_eq!(arb_cmd_new(iface.as_ptr(), oper.as_ptr(), &mut h), 0);
        let mut kind = ArbHandleKind::Data;
        assert_eq!(arb_handle_type(h, &mut kind), 0);
        assert_eq!(kind, ArbHandleKind::Cmd);
        assert_eq!(read(arb_cmd_iface_get, h).as_deref(), Ok("qx.backend"));
        assert_eq!(read(arb_cmd_oper_get, h).as_deref(), Ok("run"));
        arb_handle_delete(h);
    }

    #[test]
    fn invalid_identifiers_rejected() {
        let good = CString::new("a").unwrap();
        let mut h = 0u64;
        for bad in [" a", "a b", "", "$#^"] {
            let bad = CString::new(bad).unwrap();
            assert_eq!(
                arb_cmd_new(bad.as_ptr(), good.as_ptr(), &mut h),
                ArbStatus::InvalidIdentifier as i32
            );
            assert_eq!(
                arb_cmd_new(good.as_ptr(), bad.as_ptr(), &mut h),
                ArbStatus::InvalidIdentifier as i32
            );
        }
        assert_eq!(h, 0);
        assert_eq!(
            arb_cmd_new(std::ptr::null(), good.as_ptr(), &mut h),
            ArbStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn identifiers_of_data_handle_mismatch() {
        let mut h = 0u64;
        arb_data_new(&mut h);
        assert_eq!(
            read(arb_cmd_iface_get, h),
            Err(ArbStatus::HandleTypeMismatch as i32)
        );
        arb_handle_delete(h);
    }

    #[test]
    fn cmd_built_in_rust_is_visible_from_c() {
        let cmd = reference_cmd();
        let h = with_store(|s| cmd.to_raw(s, None)).unwrap().unwrap();
        assert_eq!(read(arb_cmd_iface_get, h).as_deref(), Ok("x"));
        assert_eq!(read(arb_cmd_oper_get, h).as_deref(), Ok("y"));
        let back = with_store(|s| ArbCmd::from_raw(s, h)).unwrap().unwrap();
        assert_eq!(back, cmd);
        arb_handle_delete(h);
    }
}
