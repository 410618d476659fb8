//! Interface and operation identifiers for [`ArbCmd`](crate::ArbCmd).
//!
//! An identifier is a non-empty string of ASCII letters, ASCII digits and
//! the namespacing punctuation `_`, `-`, `.` and `:`. Whitespace is never
//! allowed, so leading, trailing and embedded whitespace are all rejected.

use std::fmt;
use std::str::FromStr;

use crate::error::ArbError;

/// Punctuation allowed in identifiers besides ASCII letters and digits.
pub const IDENTIFIER_PUNCTUATION: [char; 4] = ['_', '-', '.', ':'];

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || IDENTIFIER_PUNCTUATION.contains(&c)
}

/// Returns whether `name` satisfies the identifier grammar.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_identifier_char)
}

/// Validate `name` against the identifier grammar.
///
/// # Errors
///
/// Returns [`ArbError::InvalidIdentifier`] carrying `name` verbatim.
pub fn validate_identifier(name: &str) -> Result<(), ArbError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(ArbError::InvalidIdentifier {
            identifier: name.to_owned(),
        })
    }
}

/// A validated interface or operation identifier.
///
/// The only way to obtain one is through validation, so holding an
/// `Identifier` proves the grammar is satisfied.
///
/// # Examples
///
/// ```
/// use arb_core::Identifier;
///
/// let iface: Identifier = "qx.backend".parse().unwrap();
/// assert_eq!(iface.as_str(), "qx.backend");
/// assert!(Identifier::new("$#^").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Validate and wrap an identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, ArbError> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self(name))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = ArbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = ArbError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = ArbError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
