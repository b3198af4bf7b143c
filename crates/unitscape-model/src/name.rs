//! Qualified type identities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a declared type: namespace plus name
///
/// Serialized as the dotted form `Namespace.Name`; the last segment is the
/// name, everything before it the namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeName {
    namespace: String,
    name: String,
}

impl TypeName {
    /// Create a type name from its parts
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Type name without namespace
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self::new(String::new(), name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

/// Error produced when parsing a malformed dotted type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTypeName(String);

impl fmt::Display for InvalidTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid type name '{}'", self.0)
    }
}

impl std::error::Error for InvalidTypeName {}

impl FromStr for TypeName {
    type Err = InvalidTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = s.rsplit_once('.').unwrap_or(("", s));
        let well_formed = !name.is_empty()
            && !name.contains(char::is_whitespace)
            && (namespace.is_empty() || namespace.split('.').all(|segment| !segment.is_empty()));

        if well_formed {
            Ok(Self::new(namespace, name))
        } else {
            Err(InvalidTypeName(s.to_string()))
        }
    }
}

impl TryFrom<String> for TypeName {
    type Error = InvalidTypeName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.to_string()
    }
}
