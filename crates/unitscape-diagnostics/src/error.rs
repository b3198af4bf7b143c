//! Unitscape diagnostic and error types

use crate::{ErrorCode, SourceLocation, FILE_NOT_FOUND, INTERNAL_ERROR, INVALID_MANIFEST, IO_ERROR};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - the offending declaration is dropped
    Error,
    /// Warning - the declaration is kept but probably not what was intended
    Warning,
    /// Information - redundant declaration
    Info,
    /// Hint - suggestion for improvement
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Location of the declaration the diagnostic is attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Declared type the diagnostic concerns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Structured context (e.g. the unresolved name)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub context: IndexMap<String, String>,
    /// Additional help
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Related information
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            subject: None,
            context: IndexMap::new(),
            help: None,
            related: Vec::new(),
        }
    }

    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Create a new informational diagnostic
    pub fn info(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the declared type the diagnostic concerns
    pub fn with_subject(mut self, subject: impl fmt::Display) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Add a structured context entry
    pub fn with_context(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add related information
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// Whether this diagnostic has error severity
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render the diagnostic with terminal colors
    #[cfg(feature = "colored")]
    pub fn to_colored_string(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().blue().bold(),
            Severity::Hint => self.severity.to_string().cyan(),
        };

        let mut rendered = format!("{}[{}]: {}", severity, self.code, self.message);
        if let Some(location) = &self.location {
            rendered.push_str(&format!("\n  {} {}", "-->".blue(), location));
        }
        if let Some(help) = self.help.as_deref().or(self.code.info().help) {
            rendered.push_str(&format!("\n  {} {}", "help:".green(), help));
        }
        rendered
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Related diagnostic information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    /// Location of the related declaration
    pub location: Option<SourceLocation>,
    /// Message explaining the relationship
    pub message: String,
}

impl RelatedInfo {
    /// Create new related info
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            location: None,
            message: message.into(),
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Host-level failures that are not declaration diagnostics
#[derive(Debug, Error)]
pub enum UnitscapeError {
    /// Reading a declaration manifest failed
    #[error("{code}: failed to read '{path}': {source}")]
    Io {
        code: ErrorCode,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A declaration manifest could not be decoded
    #[error("{code}: invalid manifest '{path}': {message}")]
    Manifest {
        code: ErrorCode,
        path: String,
        message: String,
    },

    /// Internal invariant violated
    #[error("{code}: {message}")]
    Internal { code: ErrorCode, message: String },
}

impl UnitscapeError {
    /// Create an I/O error, classifying missing files separately
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let code = if source.kind() == std::io::ErrorKind::NotFound {
            FILE_NOT_FOUND
        } else {
            IO_ERROR
        };
        Self::Io {
            code,
            path: path.into(),
            source,
        }
    }

    /// Create a manifest decoding error
    pub fn manifest(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Manifest {
            code: INVALID_MANIFEST,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: INTERNAL_ERROR,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io { code, .. } => *code,
            Self::Manifest { code, .. } => *code,
            Self::Internal { code, .. } => *code,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            Self::Io { path, .. } | Self::Manifest { path, .. } => {
                diag.with_location(SourceLocation::default().in_file(path.clone()))
            }
            Self::Internal { .. } => diag,
        }
    }
}
