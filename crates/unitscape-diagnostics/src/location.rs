//! Declaration locations attached to diagnostics
//!
//! The resolution engine never inspects a location; it only carries the token
//! handed over by the declaration extraction stage so that every diagnostic can
//! point back at the declaration that caused it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a declaration in its source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line number (1-based, 0 when unknown)
    #[serde(default)]
    pub line: usize,
    /// Column number (1-based, 0 when unknown)
    #[serde(default)]
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub const fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Set the source file
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Whether this location carries no position information
    pub fn is_unknown(&self) -> bool {
        self.file.is_none() && self.line == 0 && self.column == 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file)?;
        }
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(SourceLocation::new(3, 7).to_string(), "3:7");
        assert_eq!(
            SourceLocation::new(3, 7).in_file("units.json").to_string(),
            "units.json:3:7"
        );
    }

    #[test]
    fn test_unknown_location() {
        assert!(SourceLocation::default().is_unknown());
        assert!(!SourceLocation::new(1, 1).is_unknown());
        assert!(!SourceLocation::default().in_file("a.json").is_unknown());
    }
}
