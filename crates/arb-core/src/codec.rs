//! Canonical CBOR encoding of the metadata mapping.
//!
//! The metadata blob is always a single top-level CBOR map with text keys.
//! Encoding is deterministic: shortest-form integers and floats, map keys
//! ordered length-first then bytewise at every nesting level. Decoding is
//! all-or-nothing; either the complete mapping is returned or an error.

use ciborium::value::Value as CborValue;

use crate::error::ArbError;
use crate::value::{self, Metadata, Value, MAX_DEPTH};

/// Encoding of the empty mapping (`{}`), the content of a fresh handle.
pub const EMPTY_MAP: [u8; 1] = [0xA0];

/// Encode a metadata mapping into its canonical CBOR form.
///
/// # Errors
///
/// [`ArbError::MalformedEncoding`] if the CBOR writer fails. Writing into
/// memory does not fail in practice.
pub fn encode(metadata: &Metadata) -> Result<Vec<u8>, ArbError> {
    let mut out = Vec::with_capacity(16 * metadata.len() + 1);
    ciborium::into_writer(&value::map_to_cbor(metadata), &mut out).map_err(|e| {
        ArbError::MalformedEncoding {
            detail: format!("CBOR encoder failed: {e}"),
        }
    })?;
    Ok(out)
}

/// Decode a canonical or non-canonical CBOR map into a metadata mapping.
///
/// # Errors
///
/// - [`ArbError::MalformedEncoding`] if `bytes` is not exactly one CBOR
///   data item, the item is not a map, or it nests deeper than
///   [`MAX_DEPTH`].
/// - [`ArbError::UnsupportedValueType`] if any value (or key) lies outside
///   the JSON-compatible model. Non-text keys are rejected, never coerced.
pub fn decode(bytes: &[u8]) -> Result<Metadata, ArbError> {
    let mut reader = bytes;
    let parsed: Result<CborValue, _> =
        ciborium::de::from_reader_with_recursion_limit(&mut reader, MAX_DEPTH);
    let item = parsed.map_err(|e| ArbError::MalformedEncoding {
        detail: match e {
            ciborium::de::Error::RecursionLimitExceeded => {
                format!("nesting deeper than {MAX_DEPTH} levels")
            }
            other => other.to_string(),
        },
    })?;
    if !reader.is_empty() {
        return Err(ArbError::MalformedEncoding {
            detail: format!("{} trailing bytes after top-level item", reader.len()),
        });
    }
    if !item.is_map() {
        return Err(ArbError::MalformedEncoding {
            detail: "top-level item is not a map".to_owned(),
        });
    }
    value::metadata_from_cbor(item).map_err(|r| r.into_unsupported())
}

/// Parse JSON text into a metadata mapping.
///
/// # Errors
///
/// [`ArbError::MalformedEncoding`] if `text` is not valid JSON, or
/// [`ArbError::InvalidMetadataValue`] if it is valid but not an object or
/// nests deeper than [`MAX_DEPTH`].
pub fn metadata_from_json(text: &str) -> Result<Metadata, ArbError> {
    let parsed: Value = serde_json::from_str(text).map_err(|e| ArbError::MalformedEncoding {
        detail: format!("invalid JSON: {e}"),
    })?;
    match parsed {
        Value::Object(map) => {
            value::check_metadata(&map)?;
            Ok(map)
        }
        other => Err(ArbError::InvalidMetadataValue {
            value: other.to_string(),
            reason: "top-level JSON value must be an object".to_owned(),
        }),
    }
}

/// Render a metadata mapping as compact JSON text.
pub fn metadata_to_json(metadata: &Metadata) -> String {
    Value::Object(metadata.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(v: Value) -> Metadata {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn empty_map_encodes_to_single_byte() {
        assert_eq!(encode(&Metadata::new()).unwrap(), EMPTY_MAP);
        assert_eq!(decode(&EMPTY_MAP).unwrap(), Metadata::new());
    }

    #[test]
    fn small_map_matches_hand_encoding() {
        // {"b": 3, "c": 4, "d": 5}
        let m = meta(json!({"d": 5, "b": 3, "c": 4}));
        assert_eq!(
            encode(&m).unwrap(),
            [0xA3, 0x61, b'b', 0x03, 0x61, b'c', 0x04, 0x61, b'd', 0x05]
        );
    }

    #[test]
    fn encoding_is_independent_of_insertion_order() {
        let a = meta(json!({"x": {"b": 1, "a": [true, null]}, "long_key": "v"}));
        let mut b = Metadata::new();
        b.insert("long_key".into(), json!("v"));
        b.insert("x".into(), json!({"a": [true, null], "b": 1}));
        assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
    }

    #[test]
    fn nested_values_round_trip() {
        let m = meta(json!({
            "null": null,
            "flag": false,
            "neg": -12345678901i64,
            "big": u64::MAX,
            "pi": 3.14159,
            "text": "héllo",
            "list": [1, "two", [3.5]],
            "obj": {"inner": {"deeper": []}},
        }));
        assert_eq!(decode(&encode(&m).unwrap()).unwrap(), m);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode(&[0xFF, 0x00]),
            Err(ArbError::MalformedEncoding { .. })
        ));
        assert!(matches!(decode(&[]), Err(ArbError::MalformedEncoding { .. })));
    }

    #[test]
    fn truncated_map_is_malformed() {
        // Map header announcing one entry, then nothing.
        assert!(matches!(
            decode(&[0xA1, 0x61]),
            Err(ArbError::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn non_map_top_level_is_malformed() {
        // Unsigned integer 1.
        let err = decode(&[0x01]).unwrap_err();
        assert_eq!(
            err,
            ArbError::MalformedEncoding {
                detail: "top-level item is not a map".into()
            }
        );
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        assert!(matches!(
            decode(&[0xA0, 0xA0]),
            Err(ArbError::MalformedEncoding { .. })
        ));
    }

    #[test]
    fn integer_keys_are_unsupported() {
        // {1: 2}
        assert!(matches!(
            decode(&[0xA1, 0x01, 0x02]),
            Err(ArbError::UnsupportedValueType { .. })
        ));
    }

    #[test]
    fn byte_string_values_are_unsupported() {
        // {"a": h'00'}
        assert!(matches!(
            decode(&[0xA1, 0x61, b'a', 0x41, 0x00]),
            Err(ArbError::UnsupportedValueType { .. })
        ));
    }

    fn nested(levels: usize) -> Metadata {
        let mut v = json!(true);
        for _ in 1..levels {
            v = json!({ "n": v });
        }
        let mut m = Metadata::new();
        m.insert("n".into(), v);
        m
    }

    #[test]
    fn mapping_at_depth_limit_round_trips() {
        let m = nested(MAX_DEPTH);
        assert!(value::check_metadata(&m).is_ok());
        assert_eq!(decode(&encode(&m).unwrap()).unwrap(), m);
    }

    #[test]
    fn blob_past_depth_limit_is_malformed() {
        // MAX_DEPTH + 1 one-element arrays inside a single-entry map.
        let mut blob = vec![0xA1, 0x61, b'k'];
        blob.extend(std::iter::repeat(0x81).take(MAX_DEPTH));
        blob.push(0xF6);
        assert_eq!(
            decode(&blob),
            Err(ArbError::MalformedEncoding {
                detail: format!("nesting deeper than {MAX_DEPTH} levels"),
            })
        );

        // One array fewer fits exactly.
        let mut fits = vec![0xA1, 0x61, b'k'];
        fits.extend(std::iter::repeat(0x81).take(MAX_DEPTH - 1));
        fits.push(0xF6);
        assert!(decode(&fits).is_ok());
    }

    #[test]
    fn json_text_past_depth_limit_is_rejected() {
        let (open, close) = ("[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        let text = format!("{{\"k\":{open}null{close}}}");
        assert!(matches!(
            metadata_from_json(&text),
            Err(ArbError::InvalidMetadataValue { .. })
        ));
    }

    #[test]
    fn json_text_helpers() {
        let m = metadata_from_json(r#"{"answer": 42}"#).unwrap();
        assert_eq!(m["answer"], json!(42));
        assert_eq!(metadata_to_json(&m), r#"{"answer":42}"#);

        assert!(matches!(
            metadata_from_json("{"),
            Err(ArbError::MalformedEncoding { .. })
        ));
        assert!(matches!(
            metadata_from_json("[1]"),
            Err(ArbError::InvalidMetadataValue { .. })
        ));
    }
}
