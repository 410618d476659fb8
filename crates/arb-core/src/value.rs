//! The JSON-compatible value model and its mapping onto CBOR.
//!
//! Metadata values are [`serde_json::Value`]s. Anything that enters the
//! model from outside (a `Serialize` type, a decoded CBOR blob) passes
//! through [`from_cbor`], which rejects what JSON cannot express: byte
//! strings, tags, non-finite floats, non-text map keys, duplicate keys and
//! integers outside `i64 ∪ u64`. Values handed over already in the JSON
//! model go through [`check_value`] or [`check_metadata`] instead.
//!
//! Every path enforces the same nesting limit, [`MAX_DEPTH`], so a mapping
//! that was accepted can always be encoded and decoded again.

use std::cmp::Ordering;
use std::fmt;

use ciborium::value::{Integer, Value as CborValue};
use serde::Serialize;
use serde_json::Number;

use crate::error::ArbError;

pub use serde_json::{Map, Value};

/// The metadata mapping carried by an [`ArbData`](crate::ArbData).
pub type Metadata = Map<String, Value>;

/// Deepest container nesting a metadata mapping may have, counting the
/// mapping itself. A value stored under a key may therefore nest at most
/// `MAX_DEPTH - 1` arrays or objects.
pub const MAX_DEPTH: usize = 64;

const TOO_DEEP: &str = "nesting deeper than MAX_DEPTH";

/// Why a CBOR value could not be brought into the JSON model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// Location of the offending value, e.g. `$.a[2]`.
    pub path: String,
    /// Diagnostic rendering of the offending value.
    pub value: String,
    /// What is wrong with it.
    pub reason: &'static str,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} ({})", self.reason, self.path, self.value)
    }
}

impl Rejection {
    fn new(path: &str, value: &CborValue, reason: &'static str) -> Self {
        Self {
            path: path.to_owned(),
            value: format!("{value:?}"),
            reason,
        }
    }

    /// Report as a rejected insertion.
    pub fn into_invalid_metadata(self) -> ArbError {
        ArbError::InvalidMetadataValue {
            value: self.value,
            reason: format!("{} at {}", self.reason, self.path),
        }
    }

    /// Report as a decoded value outside the model.
    pub fn into_unsupported(self) -> ArbError {
        ArbError::UnsupportedValueType {
            detail: self.to_string(),
        }
    }
}

/// Convert any serializable value into a validated metadata value.
///
/// # Errors
///
/// [`ArbError::InvalidMetadataValue`] if the value cannot be represented in
/// the JSON-compatible model.
///
/// # Examples
///
/// ```
/// use arb_core::value::to_value;
///
/// assert_eq!(to_value(&42u8).unwrap(), serde_json::json!(42));
/// assert!(to_value(&f64::NAN).is_err());
/// ```
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, ArbError> {
    let cbor = CborValue::serialized(value).map_err(|e| ArbError::InvalidMetadataValue {
        value: std::any::type_name::<T>().to_owned(),
        reason: e.to_string(),
    })?;
    from_cbor(cbor).map_err(Rejection::into_invalid_metadata)
}

/// Bring a CBOR value destined for a single metadata key into the JSON
/// model.
pub fn from_cbor(value: CborValue) -> Result<Value, Rejection> {
    convert(value, &mut String::from("$"), MAX_DEPTH - 1)
}

/// Bring a whole CBOR map into the JSON model as a metadata mapping.
pub(crate) fn metadata_from_cbor(value: CborValue) -> Result<Metadata, Rejection> {
    match convert(value, &mut String::from("$"), MAX_DEPTH)? {
        Value::Object(map) => Ok(map),
        other => Err(Rejection {
            path: "$".to_owned(),
            value: other.to_string(),
            reason: "top-level item is not a map",
        }),
    }
}

/// Check that an already-built value may be stored under a metadata key.
///
/// # Errors
///
/// [`ArbError::InvalidMetadataValue`] if the value nests deeper than
/// `MAX_DEPTH - 1` containers.
pub fn check_value(value: &Value) -> Result<(), ArbError> {
    check_entry("$", value)
}

/// Check every entry of an already-built metadata mapping.
///
/// # Errors
///
/// [`ArbError::InvalidMetadataValue`] for the first entry that nests too
/// deeply.
///
/// # Examples
///
/// ```
/// use arb_core::value::{check_metadata, Metadata, Value, MAX_DEPTH};
///
/// let mut deep = Value::Null;
/// for _ in 0..MAX_DEPTH {
///     deep = Value::Array(vec![deep]);
/// }
/// let mut m = Metadata::new();
/// m.insert("k".into(), deep);
/// assert!(check_metadata(&m).is_err());
/// ```
pub fn check_metadata(metadata: &Metadata) -> Result<(), ArbError> {
    for (key, value) in metadata {
        check_entry(&format!("$.{key}"), value)?;
    }
    Ok(())
}

fn check_entry(path: &str, value: &Value) -> Result<(), ArbError> {
    if nesting_exceeds(value, MAX_DEPTH - 1) {
        return Err(ArbError::InvalidMetadataValue {
            value: container_kind(value).to_owned(),
            reason: format!("{TOO_DEEP} ({MAX_DEPTH}) at {path}"),
        });
    }
    Ok(())
}

// Explicit stack: an over-deep value is never recursed into.
fn nesting_exceeds(value: &Value, limit: usize) -> bool {
    let mut stack = vec![(value, 0usize)];
    while let Some((v, enclosing)) = stack.pop() {
        let level = enclosing + 1;
        match v {
            Value::Array(items) => {
                if level > limit {
                    return true;
                }
                stack.extend(items.iter().map(|item| (item, level)));
            }
            Value::Object(map) => {
                if level > limit {
                    return true;
                }
                stack.extend(map.values().map(|item| (item, level)));
            }
            _ => {}
        }
    }
    false
}

fn container_kind(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        _ => "scalar",
    }
}

fn too_deep(path: &str, kind: &str) -> Rejection {
    Rejection {
        path: path.to_owned(),
        value: kind.to_owned(),
        reason: TOO_DEEP,
    }
}

fn convert(value: CborValue, path: &mut String, budget: usize) -> Result<Value, Rejection> {
    match value {
        CborValue::Null => Ok(Value::Null),
        CborValue::Bool(b) => Ok(Value::Bool(b)),
        CborValue::Text(s) => Ok(Value::String(s)),
        CborValue::Integer(i) => integer_to_number(i)
            .map(Value::Number)
            .ok_or_else(|| Rejection::new(path, &value, "integer outside the i64/u64 range")),
        CborValue::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| Rejection::new(path, &value, "non-finite float")),
        CborValue::Array(_) if budget == 0 => Err(too_deep(path, "array")),
        CborValue::Map(_) if budget == 0 => Err(too_deep(path, "map")),
        CborValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let mark = path.len();
                path.push_str(&format!("[{i}]"));
                out.push(convert(item, path, budget - 1)?);
                path.truncate(mark);
            }
            Ok(Value::Array(out))
        }
        CborValue::Map(entries) => {
            let mut out = Map::new();
            for (key, item) in entries {
                let key = match key {
                    CborValue::Text(k) => k,
                    other => return Err(Rejection::new(path, &other, "non-text map key")),
                };
                let mark = path.len();
                path.push('.');
                path.push_str(&key);
                let item = convert(item, path, budget - 1)?;
                if out.contains_key(&key) {
                    return Err(Rejection {
                        path: path.clone(),
                        value: format!("{key:?}"),
                        reason: "duplicate map key",
                    });
                }
                path.truncate(mark);
                out.insert(key, item);
            }
            Ok(Value::Object(out))
        }
        CborValue::Bytes(_) => Err(Rejection::new(path, &value, "byte string")),
        CborValue::Tag(..) => Err(Rejection::new(path, &value, "tagged value")),
        other => Err(Rejection::new(path, &other, "unsupported CBOR item")),
    }
}

fn integer_to_number(i: Integer) -> Option<Number> {
    let wide = i128::from(i);
    if let Ok(v) = i64::try_from(wide) {
        Some(Number::from(v))
    } else {
        u64::try_from(wide).ok().map(Number::from)
    }
}

/// Convert a JSON-model value into its canonical CBOR form.
///
/// Map entries are ordered length-first, then bytewise, so equal values
/// always produce identical encodings.
pub fn to_cbor(value: &Value) -> CborValue {
    match value {
        Value::Null => CborValue::Null,
        Value::Bool(b) => CborValue::Bool(*b),
        Value::Number(n) => number_to_cbor(n),
        Value::String(s) => CborValue::Text(s.clone()),
        Value::Array(items) => CborValue::Array(items.iter().map(to_cbor).collect()),
        Value::Object(map) => map_to_cbor(map),
    }
}

/// Convert a metadata mapping into a canonical CBOR map.
pub fn map_to_cbor(map: &Metadata) -> CborValue {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_by(|a, b| canonical_key_order(a, b));
    CborValue::Map(
        keys.into_iter()
            .map(|k| (CborValue::Text(k.clone()), to_cbor(&map[k.as_str()])))
            .collect(),
    )
}

fn canonical_key_order(a: &str, b: &str) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

fn number_to_cbor(n: &Number) -> CborValue {
    if let Some(u) = n.as_u64() {
        CborValue::Integer(u.into())
    } else if let Some(i) = n.as_i64() {
        CborValue::Integer(i.into())
    } else {
        // Without arbitrary_precision every non-integer Number is a finite f64.
        CborValue::Float(n.as_f64().unwrap_or_default())
    }
}
