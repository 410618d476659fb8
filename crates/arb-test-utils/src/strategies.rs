//! Proptest strategies for identifiers and values.

use arb_core::{ArbCmd, ArbData, Identifier, Metadata, Value};
use proptest::prelude::*;
use serde_json::Number;

/// Valid identifiers.
pub fn identifier() -> impl Strategy<Value = Identifier> {
    "[A-Za-z0-9_.:-]{1,16}".prop_filter_map("identifier grammar", |s| Identifier::new(s).ok())
}

/// Strings that fail identifier validation.
pub fn invalid_identifier() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z]{0,4}[ \t\n$#^/@][a-z]{0,4}",
        "[a-z]{1,4}\u{e9}",
    ]
}

/// Scalar JSON values, floats restricted to finite ones.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>().prop_filter_map("finite float", |f| Number::from_f64(f).map(Value::Number)),
        ".{0,12}".prop_map(Value::String),
    ]
}

/// Arbitrary JSON values up to a few levels of nesting.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(".{0,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

pub fn metadata() -> impl Strategy<Value = Metadata> {
    prop::collection::btree_map(".{0,8}", json_value(), 0..6)
        .prop_map(|m| m.into_iter().collect())
}

/// Binary args, sometimes longer than the default probe buffer.
pub fn binary_arg() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 0..32),
        1 => prop::collection::vec(any::<u8>(), 200..600),
    ]
}

pub fn arb_data() -> impl Strategy<Value = ArbData> {
    (prop::collection::vec(binary_arg(), 0..5), metadata())
        .prop_filter_map("mapping within the depth limit", |(args, metadata)| {
            ArbData::from_parts(args, metadata).ok()
        })
}

pub fn arb_cmd() -> impl Strategy<Value = ArbCmd> {
    (identifier(), identifier(), arb_data())
        .prop_map(|(iface, oper, data)| ArbCmd::from_identifiers(iface, oper, data))
}
