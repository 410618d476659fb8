//! Ready-made values for tests and benches.

use arb_core::{ArbCmd, ArbData, Identifier, Metadata, Value};
use serde_json::json;

fn object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

fn data<const N: usize>(args: [Vec<u8>; N], metadata: Value) -> ArbData {
    ArbData::from_parts(args, object(metadata))
        .unwrap_or_else(|e| panic!("bad fixture metadata: {e}"))
}

fn ident(name: &str) -> Identifier {
    // Fixture names are literals that satisfy the grammar.
    Identifier::new(name).unwrap_or_else(|e| panic!("bad fixture identifier: {e}"))
}

/// Deterministic byte pattern of the given length.
pub fn large_arg(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Command `x`/`y` with args `a`, `b`, `c` and metadata `b=3, c=4, d=5`.
pub fn reference_cmd() -> ArbCmd {
    let payload = data(
        [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()],
        json!({"b": 3, "c": 4, "d": 5}),
    );
    ArbCmd::from_identifiers(ident("x"), ident("y"), payload)
}

/// Args with NUL and high bytes plus nested metadata of every JSON type.
pub fn mixed_data() -> ArbData {
    data(
        [b"".to_vec(), vec![0x00, 0xFF, 0x7F], b"plain".to_vec()],
        json!({
            "null": null,
            "flag": true,
            "neg": -17,
            "big": u64::MAX,
            "pi": 3.25,
            "text": "h\u{e9}llo",
            "list": [1, "two", [3.5], {"four": 4}],
            "nested": {"inner": {"deep": [false, null]}},
        }),
    )
}

/// Items on both sides of the default probe capacity.
pub fn large_data() -> ArbData {
    data(
        [0, 255, 256, 257, 4096].map(large_arg),
        json!({
            "blob": "z".repeat(1000),
            "many": (0..200).collect::<Vec<u32>>(),
        }),
    )
}

/// A command around [`mixed_data`].
pub fn mixed_cmd() -> ArbCmd {
    ArbCmd::from_identifiers(ident("qx.backend"), ident("run:step_1"), mixed_data())
}
