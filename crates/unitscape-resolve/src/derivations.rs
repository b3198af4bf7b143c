//! Derivation signatures of units and the derived instances that use them

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::sync::LazyLock;
use unitscape_diagnostics::{
    AMBIGUOUS_DERIVATION, DERIVATION_ARITY_MISMATCH, DUPLICATE_DERIVATION_ID,
    DUPLICATE_DERIVATION_SIGNATURE, Diagnostic, INVALID_DERIVATION_EXPRESSION,
    INVALID_DERIVATION_SIGNATURE, Outcome, UNIT_INCLUDES_BIAS_TERM,
    UNRECOGNIZED_DERIVATION_ID, UNRECOGNIZED_UNIT_INSTANCE_NAME, Validity, WithDiagnostics,
    filter,
};
use unitscape_model::{DerivationSignature, RawUnit, RawUnitInstance, Signature, TypeName};

use crate::population::{DeclaredTypes, Kind};
use crate::units::InstanceNames;

/// ID given to the only derivation of a unit when it is left unnamed
pub const IMPLICIT_DERIVATION_ID: &str = "default";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"));

/// Check that `expression` references every element of a signature of `arity`
/// through `{index}` placeholders, and nothing else
pub fn check_expression(expression: &str, arity: usize) -> Result<(), String> {
    if expression.trim().is_empty() {
        return Err("the expression is empty".to_string());
    }

    let mut referenced = IndexSet::new();
    for capture in PLACEHOLDER.captures_iter(expression) {
        let index = capture[1]
            .parse::<usize>()
            .ok()
            .filter(|index| *index < arity)
            .ok_or_else(|| {
                format!(
                    "placeholder '{}' does not index a signature of {} elements",
                    &capture[0], arity
                )
            })?;
        referenced.insert(index);
    }

    match (0..arity).find(|index| !referenced.contains(index)) {
        Some(unused) => Err(format!("signature element {{{}}} is never referenced", unused)),
        None => Ok(()),
    }
}

/// Validate the derivation signatures declared by `unit`
pub fn validate_signatures(
    unit: &RawUnit,
    declared: &DeclaredTypes<'_>,
) -> WithDiagnostics<IndexMap<String, DerivationSignature>> {
    if unit.derivations.is_empty() {
        return WithDiagnostics::new(IndexMap::new());
    }

    if unit.bias_term {
        return WithDiagnostics::with_diagnostics(
            IndexMap::new(),
            [Diagnostic::error(
                UNIT_INCLUDES_BIAS_TERM,
                format!(
                    "'{}' includes a bias term and cannot be derived from other units",
                    unit.type_name
                ),
            )
            .with_location(unit.location.clone())
            .with_subject(&unit.type_name)],
        );
    }

    let single = unit.derivations.len() == 1;
    let mut ids: IndexSet<String> = IndexSet::new();
    let mut signatures: IndexSet<Signature> = IndexSet::new();

    filter(&unit.derivations, |raw| {
        let located = |diagnostic: Diagnostic| {
            diagnostic
                .with_location(raw.location.clone())
                .with_subject(&unit.type_name)
        };

        let id = match (&raw.id, single) {
            (Some(id), _) => id.clone(),
            (None, true) => IMPLICIT_DERIVATION_ID.to_string(),
            (None, false) => {
                return Outcome::empty(located(Diagnostic::error(
                    AMBIGUOUS_DERIVATION,
                    format!(
                        "'{}' declares {} derivations, so each must be named",
                        unit.type_name,
                        unit.derivations.len()
                    ),
                )));
            }
        };

        if raw.signature.is_empty() {
            return Outcome::empty(located(Diagnostic::error(
                INVALID_DERIVATION_SIGNATURE,
                format!("derivation '{}' has an empty signature", id),
            )));
        }

        let elements = Validity::all(raw.signature.iter().map(|element| {
            match declared.expect_kind(element, Kind::Unit) {
                Ok(()) => Validity::valid(),
                Err(diagnostic) => Validity::invalid(located(diagnostic)),
            }
        }));

        elements
            .and_then(|| {
                Validity::conditional(!ids.contains(&id), || {
                    located(
                        Diagnostic::error(
                            DUPLICATE_DERIVATION_ID,
                            format!("derivation ID '{}' is already used", id),
                        )
                        .with_context("id", &id),
                    )
                })
            })
            .and_then(|| {
                Validity::conditional(!signatures.contains(&raw.signature), || {
                    located(Diagnostic::error(
                        DUPLICATE_DERIVATION_SIGNATURE,
                        format!(
                            "derivation '{}' repeats the signature of another derivation",
                            id
                        ),
                    ))
                })
            })
            .and_then(|| match check_expression(&raw.expression, raw.signature.len()) {
                Ok(()) => Validity::valid(),
                Err(reason) => Validity::invalid(located(
                    Diagnostic::error(
                        INVALID_DERIVATION_EXPRESSION,
                        format!("invalid expression of derivation '{}': {}", id, reason),
                    )
                    .with_context("expression", &raw.expression),
                )),
            })
            .transform(|| {
                ids.insert(id.clone());
                signatures.insert(raw.signature.clone());
                DerivationSignature {
                    id,
                    expression: raw.expression.clone(),
                    signature: raw.signature.clone(),
                }
            })
    })
    .map(|signatures| {
        signatures
            .into_iter()
            .map(|signature| (signature.id.clone(), signature))
            .collect()
    })
}

/// Validate a derived instance against the signatures of its unit
///
/// Every positional name must be a resolvable instance of the unit at that
/// position of the signature.
pub fn validate_derived_instance(
    unit: &TypeName,
    instance: &RawUnitInstance,
    derivation: Option<&str>,
    units: &[String],
    signatures: &IndexMap<String, DerivationSignature>,
    resolvable: &InstanceNames,
) -> Validity {
    let located = |diagnostic: Diagnostic| {
        diagnostic
            .with_location(instance.location.clone())
            .with_subject(unit)
            .with_context("instance", &instance.name)
    };

    let signature = match derivation {
        Some(id) => signatures.get(id).ok_or_else(|| {
            Diagnostic::error(
                UNRECOGNIZED_DERIVATION_ID,
                format!("'{}' declares no derivation with ID '{}'", unit, id),
            )
            .with_context("id", id)
        }),
        None => match signatures.len() {
            1 => signatures.values().next().ok_or_else(|| {
                Diagnostic::error(
                    UNRECOGNIZED_DERIVATION_ID,
                    format!("'{}' declares no derivation", unit),
                )
            }),
            0 => Err(Diagnostic::error(
                UNRECOGNIZED_DERIVATION_ID,
                format!("'{}' declares no derivation", unit),
            )),
            count => Err(Diagnostic::error(
                AMBIGUOUS_DERIVATION,
                format!(
                    "'{}' declares {} derivations, so the derivation ID must be stated",
                    unit, count
                ),
            )),
        },
    };

    let signature = match signature {
        Ok(signature) => signature,
        Err(diagnostic) => return Validity::invalid(located(diagnostic)),
    };

    if units.len() != signature.arity() {
        return Validity::invalid(located(
            Diagnostic::error(
                DERIVATION_ARITY_MISMATCH,
                format!(
                    "derivation '{}' expects {} unit instances, but {} were given",
                    signature.id,
                    signature.arity(),
                    units.len()
                ),
            )
            .with_context("derivation", &signature.id),
        ));
    }

    Validity::all(
        signature
            .signature
            .iter()
            .zip(units)
            .enumerate()
            .map(|(position, (element, name))| {
                let known = resolvable
                    .get(element)
                    .is_some_and(|names| names.contains(name));
                Validity::conditional(known, || {
                    located(
                        Diagnostic::error(
                            UNRECOGNIZED_UNIT_INSTANCE_NAME,
                            format!(
                                "'{}' is not a resolvable instance of '{}', expected at position {} of derivation '{}'",
                                name, element, position, signature.id
                            ),
                        )
                        .with_context("position", position)
                        .with_context("unit", element),
                    )
                })
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("{0} / {1}", 2)]
    #[case("{1} * {0} * {0}", 2)]
    #[case("1 / {0}", 1)]
    fn test_valid_expressions(#[case] expression: &str, #[case] arity: usize) {
        assert_eq!(check_expression(expression, arity), Ok(()));
    }

    #[rstest]
    #[case("", 1)]
    #[case("   ", 1)]
    #[case("{0} / {2}", 2)]
    #[case("{0}", 2)]
    fn test_invalid_expressions(#[case] expression: &str, #[case] arity: usize) {
        assert!(check_expression(expression, arity).is_err());
    }
}
