//! [`ArbCmd`]: an [`ArbData`] tagged with an interface/operation pair.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::Serialize;

use crate::data::ArbData;
use crate::error::ArbError;
use crate::ident::Identifier;

/// A command for dispatch: two validated identifiers plus an [`ArbData`].
///
/// The identifiers are fixed for the lifetime of the command. Data-shaped
/// operations are reached through `Deref`/`DerefMut` or
/// [`data`](Self::data)/[`data_mut`](Self::data_mut).
///
/// # Examples
///
/// ```
/// use arb_core::ArbCmd;
///
/// let mut cmd = ArbCmd::new("a", "b").unwrap();
/// cmd.push(b"c".to_vec());
/// cmd.set("d", "e").unwrap();
/// assert_eq!(cmd.to_string(), r#"ArbCmd('a', 'b', b'c', d="e")"#);
///
/// assert!(ArbCmd::new("$#^", "x").is_err());
/// assert!(ArbCmd::new(" hello ", "x").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArbCmd {
    // Field order drives the derived equality: identifiers first.
    iface: Identifier,
    oper: Identifier,
    data: ArbData,
}

impl ArbCmd {
    /// A command with empty data.
    pub fn new(iface: &str, oper: &str) -> Result<Self, ArbError> {
        Self::with_data(iface, oper, ArbData::new())
    }

    /// A command carrying `data`.
    ///
    /// # Errors
    ///
    /// [`ArbError::InvalidIdentifier`] if either identifier is invalid,
    /// regardless of `data`.
    pub fn with_data(iface: &str, oper: &str, data: ArbData) -> Result<Self, ArbError> {
        Ok(Self {
            iface: Identifier::new(iface)?,
            oper: Identifier::new(oper)?,
            data,
        })
    }

    /// A command from already-validated identifiers.
    pub fn from_identifiers(iface: Identifier, oper: Identifier, data: ArbData) -> Self {
        Self { iface, oper, data }
    }

    /// Build from identifiers, positional arguments and metadata entries.
    ///
    /// Identifiers are checked before any metadata conversion is attempted.
    pub fn try_new<I, A, E, K, V>(
        iface: &str,
        oper: &str,
        args: I,
        entries: E,
    ) -> Result<Self, ArbError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
        E: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Serialize,
    {
        let iface = Identifier::new(iface)?;
        let oper = Identifier::new(oper)?;
        let data = ArbData::try_new(args, entries)?;
        Ok(Self::from_identifiers(iface, oper, data))
    }

    /// The interface identifier.
    pub fn iface(&self) -> &str {
        self.iface.as_str()
    }

    /// The operation identifier.
    pub fn oper(&self) -> &str {
        self.oper.as_str()
    }

    /// The interface identifier as a typed value.
    pub fn iface_identifier(&self) -> &Identifier {
        &self.iface
    }

    /// The operation identifier as a typed value.
    pub fn oper_identifier(&self) -> &Identifier {
        &self.oper
    }

    /// The carried data.
    pub fn data(&self) -> &ArbData {
        &self.data
    }

    /// The carried data, mutably.
    pub fn data_mut(&mut self) -> &mut ArbData {
        &mut self.data
    }

    /// Drop the identifiers and keep the data.
    pub fn into_data(self) -> ArbData {
        self.data
    }

    /// Split into identifiers and data.
    pub fn into_parts(self) -> (Identifier, Identifier, ArbData) {
        (self.iface, self.oper, self.data)
    }
}

impl Deref for ArbCmd {
    type Target = ArbData;

    fn deref(&self) -> &ArbData {
        &self.data
    }
}

impl DerefMut for ArbCmd {
    fn deref_mut(&mut self) -> &mut ArbData {
        &mut self.data
    }
}

impl fmt::Display for ArbCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArbCmd('{}', '{}'", self.iface, self.oper)?;
        self.data.fmt_entries(f, true)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constructor_and_getters() {
        let c = ArbCmd::new("a", "b").unwrap();
        assert_eq!(c.iface(), "a");
        assert_eq!(c.oper(), "b");
        assert!(c.is_empty());
        assert_eq!(c.to_string(), "ArbCmd('a', 'b')");
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        assert_eq!(
            ArbCmd::new("$#^", "dkbng"),
            Err(ArbError::InvalidIdentifier {
                identifier: "$#^".into()
            })
        );
        assert_eq!(
            ArbCmd::new(" hello ", "dkbng"),
            Err(ArbError::InvalidIdentifier {
                identifier: " hello ".into()
            })
        );
        assert!(ArbCmd::new("a", "").is_err());
    }

    #[test]
    fn identifier_errors_win_over_data_errors() {
        let r = ArbCmd::try_new("bad iface", "x", Vec::<Vec<u8>>::new(), [("k", f64::NAN)]);
        assert!(matches!(r, Err(ArbError::InvalidIdentifier { .. })));

        let r = ArbCmd::try_new("ok", "x", Vec::<Vec<u8>>::new(), [("k", f64::NAN)]);
        assert!(matches!(r, Err(ArbError::InvalidMetadataValue { .. })));
    }

    #[test]
    fn equality() {
        let a = ArbCmd::new("a", "b").unwrap();
        assert_eq!(a, ArbCmd::new("a", "b").unwrap());
        assert_ne!(a, ArbCmd::new("a", "x").unwrap());
        assert_ne!(a, ArbCmd::new("x", "b").unwrap());
        let with_arg = ArbCmd::with_data("a", "b", ArbData::new().with_arg(b"a".to_vec())).unwrap();
        assert_ne!(a, with_arg);
    }

    #[test]
    fn delegates_to_data() {
        let mut c = ArbCmd::try_new("x", "y", [b"a".to_vec()], [("b", 3)]).unwrap();
        c.push(b"b".to_vec());
        c.set("c", &4).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("c").unwrap(), &json!(4));
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.iface(), "x");
    }

    #[test]
    fn display_lists_data_after_identifiers() {
        let c = ArbCmd::try_new("a", "b", [b"c".to_vec()], [("d", "e")]).unwrap();
        assert_eq!(c.to_string(), r#"ArbCmd('a', 'b', b'c', d="e")"#);
    }

    #[test]
    fn into_parts_returns_everything() {
        let c = ArbCmd::try_new("a", "b", [b"c".to_vec()], [("d", 1)]).unwrap();
        let (iface, oper, data) = c.clone().into_parts();
        assert_eq!(iface, "a");
        assert_eq!(oper, "b");
        assert_eq!(&data, c.data());
        assert_eq!(c.into_data(), data);
    }
}
