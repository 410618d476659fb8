//! Benchmark payloads for the arb codec and transport.
//!
//! - [`metadata_profile`]: a flat mapping of mixed scalar types
//! - [`nested_metadata`]: a deep mapping exercising canonical key sorting
//! - [`payload_profile`]: an [`ArbData`] with configurable argument sizes
//! - [`command_profile`]: a command wrapping [`payload_profile`]

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use arb_core::{ArbCmd, ArbData, Identifier, Metadata, Value};
use serde_json::json;

/// `n_keys` entries cycling through integer, float, string, bool and list values.
pub fn metadata_profile(n_keys: usize) -> Metadata {
    (0..n_keys)
        .map(|i| {
            let value = match i % 5 {
                0 => json!(i),
                1 => json!(i as f64 * 0.5),
                2 => json!(format!("value-{i}")),
                3 => json!(i % 2 == 0),
                _ => json!([i, i + 1, i + 2]),
            };
            (format!("key_{i}"), value)
        })
        .collect()
}

/// A mapping nested `depth` levels deep with `width` keys per level.
pub fn nested_metadata(depth: usize, width: usize) -> Metadata {
    let mut level = Metadata::new();
    for d in 0..depth {
        let mut next = Metadata::new();
        for w in (0..width).rev() {
            next.insert(format!("{}{w}", "k".repeat(w + 1)), json!(d * width + w));
        }
        next.insert("child".to_owned(), Value::Object(level));
        level = next;
    }
    level
}

/// `n_args` arguments of `arg_len` bytes each, plus [`metadata_profile`].
pub fn payload_profile(n_args: usize, arg_len: usize, n_keys: usize) -> Option<ArbData> {
    let args = (0..n_args).map(|i| vec![(i % 256) as u8; arg_len]);
    ArbData::from_parts(args, metadata_profile(n_keys)).ok()
}

/// A `bench`/`step` command around [`payload_profile`].
pub fn command_profile(n_args: usize, arg_len: usize, n_keys: usize) -> Option<ArbCmd> {
    let iface = Identifier::new("bench").ok()?;
    let oper = Identifier::new("step").ok()?;
    Some(ArbCmd::from_identifiers(
        iface,
        oper,
        payload_profile(n_args, arg_len, n_keys)?,
    ))
}
