//! Diagnostic result algebra
//!
//! Every resolution stage reports through three small value types instead of
//! returning `Err` for an expected validation failure:
//!
//! - [`Validity`]: valid or invalid, plus diagnostics
//! - [`Outcome`]: maybe a value, plus diagnostics
//! - [`WithDiagnostics`]: always a value, plus diagnostics
//!
//! Diagnostics are only ever appended. No combinator drops or deduplicates
//! them, so a later stage discovering that a value is unusable never loses the
//! context collected before.

use crate::Diagnostic;

/// Validity of a declaration together with the diagnostics raised checking it
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Validity {
    valid: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Validity {
    /// Valid, without diagnostics
    pub fn valid() -> Self {
        Self {
            valid: true,
            diagnostics: Vec::new(),
        }
    }

    /// Valid, carrying non-fatal diagnostics
    pub fn valid_with(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        Self {
            valid: true,
            diagnostics: diagnostics.into_iter().collect(),
        }
    }

    /// Invalid because of a single diagnostic
    pub fn invalid(diagnostic: Diagnostic) -> Self {
        Self::invalid_with([diagnostic])
    }

    /// Invalid because of the given diagnostics
    pub fn invalid_with(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        Self {
            valid: false,
            diagnostics: diagnostics.into_iter().collect(),
        }
    }

    /// Invalid, with the reason already reported elsewhere
    pub fn invalid_without_diagnostics() -> Self {
        Self {
            valid: false,
            diagnostics: Vec::new(),
        }
    }

    /// Valid when `condition` holds, otherwise invalid with a lazily built diagnostic
    pub fn conditional(condition: bool, diagnostic: impl FnOnce() -> Diagnostic) -> Self {
        if condition {
            Self::valid()
        } else {
            Self::invalid(diagnostic())
        }
    }

    /// Always valid, but reports a lazily built diagnostic when `condition` holds
    pub fn report_if(condition: bool, diagnostic: impl FnOnce() -> Diagnostic) -> Self {
        if condition {
            Self::valid_with([diagnostic()])
        } else {
            Self::valid()
        }
    }

    /// Combine many validities: valid only if all are valid
    pub fn all(validities: impl IntoIterator<Item = Validity>) -> Self {
        validities
            .into_iter()
            .fold(Self::valid(), |acc, validity| acc.validate(validity))
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_invalid(&self) -> bool {
        !self.valid
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// AND this validity with an already computed one, concatenating diagnostics
    pub fn validate(mut self, other: Validity) -> Self {
        self.valid &= other.valid;
        self.diagnostics.extend(other.diagnostics);
        self
    }

    /// Run a further check only while still valid
    ///
    /// Once invalid, `check` is not executed and the accumulated diagnostics
    /// are returned unchanged.
    pub fn and_then(self, check: impl FnOnce() -> Validity) -> Self {
        if self.is_invalid() {
            return self;
        }
        let other = check();
        self.validate(other)
    }

    /// Produce an optional value if valid, keeping every diagnostic
    pub fn merge<T>(self, produce: impl FnOnce() -> Outcome<T>) -> Outcome<T> {
        if self.is_invalid() {
            return Outcome::empty_with(self.diagnostics);
        }
        let mut outcome = produce();
        let mut diagnostics = self.diagnostics;
        diagnostics.append(&mut outcome.diagnostics);
        outcome.diagnostics = diagnostics;
        outcome
    }

    /// Produce a value if valid, keeping every diagnostic
    pub fn transform<T>(self, produce: impl FnOnce() -> T) -> Outcome<T> {
        if self.is_invalid() {
            return Outcome::empty_with(self.diagnostics);
        }
        Outcome::with_diagnostics(produce(), self.diagnostics)
    }
}

impl Default for Validity {
    fn default() -> Self {
        Self::valid()
    }
}

/// An optional value together with the diagnostics raised producing it
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Outcome<T> {
    value: Option<T>,
    diagnostics: Vec<Diagnostic>,
}

impl<T> Outcome<T> {
    /// A value without diagnostics
    pub fn of(value: T) -> Self {
        Self {
            value: Some(value),
            diagnostics: Vec::new(),
        }
    }

    /// A value carrying non-fatal diagnostics
    pub fn with_diagnostics(value: T, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        Self {
            value: Some(value),
            diagnostics: diagnostics.into_iter().collect(),
        }
    }

    /// No value, because of a single diagnostic
    pub fn empty(diagnostic: Diagnostic) -> Self {
        Self::empty_with([diagnostic])
    }

    /// No value, because of the given diagnostics
    pub fn empty_with(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        Self {
            value: None,
            diagnostics: diagnostics.into_iter().collect(),
        }
    }

    /// No value, with the reason already reported elsewhere
    pub fn none() -> Self {
        Self {
            value: None,
            diagnostics: Vec::new(),
        }
    }

    /// A value when `condition` holds, otherwise a lazily built diagnostic
    pub fn conditional(
        condition: bool,
        value: impl FnOnce() -> T,
        diagnostic: impl FnOnce() -> Diagnostic,
    ) -> Self {
        if condition {
            Self::of(value())
        } else {
            Self::empty(diagnostic())
        }
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn lacks_value(&self) -> bool {
        self.value.is_none()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn into_parts(self) -> (Option<T>, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }

    /// Append diagnostics, whether or not a value is present
    pub fn add_diagnostics(mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        self.diagnostics.extend(diagnostics);
        self
    }

    /// Check the held value; an invalid check discards the value but not the diagnostics
    pub fn validate(self, check: impl FnOnce(&T) -> Validity) -> Self {
        let Some(value) = self.value else {
            return self;
        };
        let validity = check(&value);
        let mut diagnostics = self.diagnostics;
        let valid = validity.is_valid();
        diagnostics.extend(validity.into_diagnostics());
        Self {
            value: valid.then_some(value),
            diagnostics,
        }
    }

    /// Monadic bind: feed the held value to a step that may itself fail
    pub fn merge<U>(self, step: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        let Some(value) = self.value else {
            return Outcome::empty_with(self.diagnostics);
        };
        let next = step(value);
        let mut diagnostics = self.diagnostics;
        diagnostics.extend(next.diagnostics);
        Outcome {
            value: next.value,
            diagnostics,
        }
    }

    /// Map the held value
    pub fn transform<U>(self, map: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: self.value.map(map),
            diagnostics: self.diagnostics,
        }
    }

    /// Collapse to a validity: valid exactly when a value is present
    pub fn reduce(self) -> Validity {
        if self.value.is_some() {
            Validity::valid_with(self.diagnostics)
        } else {
            Validity::invalid_with(self.diagnostics)
        }
    }

    /// Drop the value, keeping the diagnostics, re-typed for another stage
    pub fn as_empty<U>(self) -> Outcome<U> {
        Outcome::empty_with(self.diagnostics)
    }

    /// Substitute a fallback for a missing value
    pub fn unwrap_or_else(self, fallback: impl FnOnce() -> T) -> WithDiagnostics<T> {
        WithDiagnostics {
            value: self.value.unwrap_or_else(fallback),
            diagnostics: self.diagnostics,
        }
    }
}

impl<T> From<WithDiagnostics<T>> for Outcome<T> {
    fn from(result: WithDiagnostics<T>) -> Self {
        Self {
            value: Some(result.value),
            diagnostics: result.diagnostics,
        }
    }
}

/// A value that is always present, together with the diagnostics raised producing it
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct WithDiagnostics<T> {
    value: T,
    diagnostics: Vec<Diagnostic>,
}

impl<T> WithDiagnostics<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(value: T, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        Self {
            value,
            diagnostics: diagnostics.into_iter().collect(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }

    pub fn add_diagnostics(mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        self.diagnostics.extend(diagnostics);
        self
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn map<U>(self, map: impl FnOnce(T) -> U) -> WithDiagnostics<U> {
        WithDiagnostics {
            value: map(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Chain a step that cannot fail, concatenating diagnostics
    pub fn merge<U>(self, step: impl FnOnce(T) -> WithDiagnostics<U>) -> WithDiagnostics<U> {
        let next = step(self.value);
        let mut diagnostics = self.diagnostics;
        diagnostics.extend(next.diagnostics);
        WithDiagnostics {
            value: next.value,
            diagnostics,
        }
    }
}

/// Run `process` over every item, keeping the items that produced a value
///
/// Diagnostics of every item are kept in input order, including those of
/// items that were dropped.
pub fn filter<I, T, U, F>(items: I, mut process: F) -> WithDiagnostics<Vec<U>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Outcome<U>,
{
    let mut values = Vec::new();
    let mut diagnostics = Vec::new();

    for item in items {
        let (value, item_diagnostics) = process(item).into_parts();
        diagnostics.extend(item_diagnostics);
        values.extend(value);
    }

    WithDiagnostics { value: values, diagnostics }
}
