//! [`ArbData`]: ordered binary arguments plus a JSON-compatible mapping.
//!
//! Positional arguments and metadata entries have separate accessor sets.
//! Every mutation validates its input before touching the container, so a
//! failed call leaves the value exactly as it was.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::ArbError;
use crate::value::{self, Metadata, Value};

/// Binary argument list and metadata mapping exchanged between plugins.
///
/// Two values are equal when their argument lists are equal element-wise
/// and their mappings hold the same entries, in any order.
///
/// # Examples
///
/// ```
/// use arb_core::ArbData;
///
/// let mut data = ArbData::try_new([b"test1".to_vec(), b"test2".to_vec()], [("answer", 42)])
///     .unwrap();
/// assert_eq!(data.len(), 2);
/// assert_eq!(data.get("answer").unwrap(), &serde_json::json!(42));
///
/// data.push(b"test3".to_vec());
/// assert_eq!(data.to_string(), "ArbData(b'test1', b'test2', b'test3', answer=42)");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArbData {
    args: Vec<Vec<u8>>,
    json: Metadata,
}

impl ArbData {
    /// An empty value: no arguments, empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from positional arguments and an already-built mapping.
    ///
    /// # Errors
    ///
    /// [`ArbError::InvalidMetadataValue`] if an entry nests deeper than
    /// [`MAX_DEPTH`](value::MAX_DEPTH) allows.
    pub fn from_parts<I, A>(args: I, metadata: Metadata) -> Result<Self, ArbError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        value::check_metadata(&metadata)?;
        Ok(Self::from_validated(args, metadata))
    }

    pub(crate) fn from_validated<I, A>(args: I, metadata: Metadata) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            json: metadata,
        }
    }

    /// Build from positional arguments and named metadata entries.
    ///
    /// All-or-nothing: if any entry is rejected no value is produced.
    ///
    /// # Errors
    ///
    /// [`ArbError::InvalidMetadataValue`] for the first entry outside the
    /// JSON-compatible model.
    pub fn try_new<I, A, E, K, V>(args: I, entries: E) -> Result<Self, ArbError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
        E: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Serialize,
    {
        let mut json = Metadata::new();
        for (key, v) in entries {
            json.insert(key.into(), value::to_value(&v)?);
        }
        Ok(Self::from_validated(args, json))
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_arg(mut self, arg: impl Into<Vec<u8>>) -> Self {
        self.push(arg);
        self
    }

    /// Builder-style [`set`](Self::set).
    pub fn with_json<V: Serialize + ?Sized>(
        mut self,
        key: impl Into<String>,
        value: &V,
    ) -> Result<Self, ArbError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// True when there are no arguments and no metadata entries.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.json.is_empty()
    }

    /// Number of binary arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Number of metadata entries.
    pub fn metadata_len(&self) -> usize {
        self.json.len()
    }

    // ── Positional arguments ────────────────────────────────────

    fn check_index(&self, index: usize) -> Result<(), ArbError> {
        if index < self.args.len() {
            Ok(())
        } else {
            Err(ArbError::IndexOutOfRange {
                index,
                len: self.args.len(),
            })
        }
    }

    /// All binary arguments, in order.
    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }

    /// Iterate over the binary arguments as slices.
    pub fn iter_args(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.args.iter().map(Vec::as_slice)
    }

    /// The argument at `index`.
    pub fn arg(&self, index: usize) -> Result<&[u8], ArbError> {
        self.check_index(index)?;
        Ok(&self.args[index])
    }

    /// Replace the argument at `index`, returning the previous one.
    pub fn set_arg(&mut self, index: usize, arg: impl Into<Vec<u8>>) -> Result<Vec<u8>, ArbError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.args[index], arg.into()))
    }

    /// Remove and return the argument at `index`.
    pub fn remove_arg(&mut self, index: usize) -> Result<Vec<u8>, ArbError> {
        self.check_index(index)?;
        Ok(self.args.remove(index))
    }

    /// Whether an argument equal to `arg` is present.
    pub fn contains_arg(&self, arg: &[u8]) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Append an argument.
    pub fn push(&mut self, arg: impl Into<Vec<u8>>) {
        self.args.push(arg.into());
    }

    /// Alias of [`push`](Self::push).
    pub fn append(&mut self, arg: impl Into<Vec<u8>>) {
        self.push(arg);
    }

    /// Insert an argument before `index`; `index == len()` appends.
    pub fn insert(&mut self, index: usize, arg: impl Into<Vec<u8>>) -> Result<(), ArbError> {
        if index > self.args.len() {
            return Err(ArbError::IndexOutOfRange {
                index,
                len: self.args.len(),
            });
        }
        self.args.insert(index, arg.into());
        Ok(())
    }

    /// Append every argument yielded by `args`.
    pub fn extend<I, A>(&mut self, args: I)
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        self.args.extend(args.into_iter().map(Into::into));
    }

    /// Remove all binary arguments.
    pub fn clear_args(&mut self) {
        self.args.clear();
    }

    // ── Metadata ────────────────────────────────────────────────

    /// The whole metadata mapping.
    pub fn metadata(&self) -> &Metadata {
        &self.json
    }

    /// Replace the whole metadata mapping.
    ///
    /// # Errors
    ///
    /// [`ArbError::InvalidMetadataValue`] if an entry nests too deeply; the
    /// current mapping is kept.
    pub fn set_metadata(&mut self, metadata: Metadata) -> Result<(), ArbError> {
        value::check_metadata(&metadata)?;
        self.json = metadata;
        Ok(())
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Result<&Value, ArbError> {
        self.json.get(key).ok_or_else(|| ArbError::KeyNotFound {
            key: key.to_owned(),
        })
    }

    /// The value stored under `key`, deserialized into `T`.
    ///
    /// A value that does not fit `T` is reported as
    /// [`ArbError::UnsupportedValueType`].
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, ArbError> {
        let v = self.get(key)?;
        serde_json::from_value(v.clone()).map_err(|e| ArbError::UnsupportedValueType {
            detail: format!("{key}: {e}"),
        })
    }

    /// Insert or overwrite `key`, returning the previous value if any.
    ///
    /// # Errors
    ///
    /// [`ArbError::InvalidMetadataValue`] if `value` is not JSON-compatible;
    /// the mapping is left untouched.
    pub fn set<V: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &V,
    ) -> Result<Option<Value>, ArbError> {
        let v = value::to_value(value)?;
        Ok(self.json.insert(key.into(), v))
    }

    /// Insert or overwrite `key` with a value already in the JSON model.
    pub fn set_value(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, ArbError> {
        value::check_value(&value)?;
        Ok(self.json.insert(key.into(), value))
    }

    /// Remove and return the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Result<Value, ArbError> {
        // shift_remove keeps the insertion order of the remaining entries.
        self.json
            .shift_remove(key)
            .ok_or_else(|| ArbError::KeyNotFound {
                key: key.to_owned(),
            })
    }

    /// Whether `key` is present in the mapping.
    pub fn contains_key(&self, key: &str) -> bool {
        self.json.contains_key(key)
    }

    /// Metadata keys, in insertion order.
    pub fn keys(&self) -> serde_json::map::Keys<'_> {
        self.json.keys()
    }

    /// Metadata values, in insertion order.
    pub fn values(&self) -> serde_json::map::Values<'_> {
        self.json.values()
    }

    /// Metadata entries, in insertion order.
    pub fn items(&self) -> serde_json::map::Iter<'_> {
        self.json.iter()
    }

    /// Remove all metadata entries.
    pub fn clear_metadata(&mut self) {
        self.json.clear();
    }

    /// Remove all arguments and metadata entries.
    pub fn clear(&mut self) {
        self.clear_args();
        self.clear_metadata();
    }

    // ── Whole-mapping encodings ─────────────────────────────────

    /// The mapping as compact JSON text.
    pub fn get_json(&self) -> String {
        codec::metadata_to_json(&self.json)
    }

    /// Replace the mapping with the object parsed from `text`.
    pub fn set_json(&mut self, text: &str) -> Result<(), ArbError> {
        self.json = codec::metadata_from_json(text)?;
        Ok(())
    }

    /// The mapping in canonical CBOR.
    pub fn get_cbor(&self) -> Result<Vec<u8>, ArbError> {
        codec::encode(&self.json)
    }

    /// Replace the mapping with the CBOR map in `bytes`.
    pub fn set_cbor(&mut self, bytes: &[u8]) -> Result<(), ArbError> {
        self.json = codec::decode(bytes)?;
        Ok(())
    }

    /// Split into arguments and mapping.
    pub fn into_parts(self) -> (Vec<Vec<u8>>, Metadata) {
        (self.args, self.json)
    }

    /// Write the comma-separated body shared by the `ArbData` and `ArbCmd`
    /// renderings. `needs_sep` is set when something precedes the body.
    pub(crate) fn fmt_entries(
        &self,
        f: &mut fmt::Formatter<'_>,
        mut needs_sep: bool,
    ) -> fmt::Result {
        for arg in &self.args {
            if needs_sep {
                f.write_str(", ")?;
            }
            needs_sep = true;
            write!(f, "b'{}'", arg.escape_ascii())?;
        }
        let mut entries: Vec<_> = self.json.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            if needs_sep {
                f.write_str(", ")?;
            }
            needs_sep = true;
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ArbData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ArbData(")?;
        self.fmt_entries(f, false)?;
        f.write_str(")")
    }
}

impl TryFrom<Metadata> for ArbData {
    type Error = ArbError;

    fn try_from(metadata: Metadata) -> Result<Self, ArbError> {
        Self::from_parts(Vec::<Vec<u8>>::new(), metadata)
    }
}

impl<A: Into<Vec<u8>>> FromIterator<A> for ArbData {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::from_validated(iter, Metadata::new())
    }
}
