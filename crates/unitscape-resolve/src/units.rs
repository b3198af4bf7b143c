//! Validation of unit declarations

use indexmap::{IndexMap, IndexSet};
use unitscape_diagnostics::{
    DUPLICATE_UNIT_INSTANCE_NAME, DUPLICATE_UNIT_INSTANCE_PLURAL_FORM, Diagnostic,
    INVALID_EXPRESSION, INVALID_UNIT_INSTANCE_NAME, INVALID_UNIT_INSTANCE_PLURAL_FORM,
    MISSING_REQUIRED_PROPERTY, Outcome, UNIT_NOT_INCLUDING_BIAS_TERM, Validity, WithDiagnostics,
    filter,
};
use unitscape_model::{
    Coefficient, RawUnit, RawUnitInstance, TypeName, UnitInstanceKind, UnitType,
};

use crate::derivations::{validate_derived_instance, validate_signatures};
use crate::instances::resolve_instances;
use crate::population::{DeclaredTypes, Kind};

/// Whether `name` can be used as an identifier by generated code
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Instance names per unit that survive instance validation
pub type InstanceNames = IndexMap<TypeName, IndexSet<String>>;

/// Names of the instances of `raw` that can be resolved
///
/// Derived instances count as resolvable here; their arguments are checked
/// against these names when the unit itself is validated. A unit that fails
/// validation has no resolvable instances.
pub fn resolvable_instances(raw: &RawUnit, declared: &DeclaredTypes<'_>) -> IndexSet<String> {
    if described_quantity(raw, declared).is_err() {
        return IndexSet::new();
    }

    let (instances, _) = checked_instances(raw, |_| Validity::valid()).into_parts();
    let (table, _) = resolve_instances(&raw.type_name, instances).into_parts();
    table.into_keys().collect()
}

/// Validate a unit, its derivation signatures and its instances
///
/// The unit itself only fails when its described quantity is missing or is not
/// a scalar; invalid instances and signatures are dropped individually. The
/// arguments of derived instances must be among the `resolvable` instances of
/// the unit at that position.
pub fn validate_unit(
    raw: &RawUnit,
    declared: &DeclaredTypes<'_>,
    resolvable: &InstanceNames,
) -> Outcome<UnitType> {
    log::trace!("validating unit {}", raw.type_name);

    let quantity = match described_quantity(raw, declared) {
        Ok(quantity) => quantity,
        Err(diagnostic) => return Outcome::empty(diagnostic),
    };

    let (signatures, signature_diagnostics) = validate_signatures(raw, declared).into_parts();

    let (instances, instance_diagnostics) = checked_instances(raw, |instance| {
        match &instance.kind {
            UnitInstanceKind::Derived { derivation, units } => validate_derived_instance(
                &raw.type_name,
                instance,
                derivation.as_deref(),
                units,
                &signatures,
                resolvable,
            ),
            _ => Validity::valid(),
        }
    })
    .into_parts();

    let (instances, graph_diagnostics) =
        resolve_instances(&raw.type_name, instances).into_parts();

    Outcome::with_diagnostics(
        UnitType {
            type_name: raw.type_name.clone(),
            location: raw.location.clone(),
            quantity: quantity.clone(),
            bias_term: raw.bias_term,
            derivations: signatures,
            instances,
        },
        signature_diagnostics
            .into_iter()
            .chain(instance_diagnostics)
            .chain(graph_diagnostics),
    )
}

fn described_quantity<'a>(
    raw: &'a RawUnit,
    declared: &DeclaredTypes<'_>,
) -> Result<&'a TypeName, Diagnostic> {
    let located = |diagnostic: Diagnostic| {
        diagnostic
            .with_location(raw.location.clone())
            .with_subject(&raw.type_name)
    };

    let Some(quantity) = &raw.quantity else {
        return Err(located(
            Diagnostic::error(
                MISSING_REQUIRED_PROPERTY,
                format!("unit '{}' does not state the quantity it describes", raw.type_name),
            )
            .with_context("property", "quantity"),
        ));
    };
    declared
        .expect_kind(quantity, Kind::Scalar)
        .map(|()| quantity)
        .map_err(located)
}

/// Instances of `raw` passing the per-instance checks and `derived`, in
/// declaration order
fn checked_instances(
    raw: &RawUnit,
    mut derived: impl FnMut(&RawUnitInstance) -> Validity,
) -> WithDiagnostics<Vec<RawUnitInstance>> {
    let mut names: IndexSet<&str> = IndexSet::new();
    let mut plurals: IndexSet<&str> = IndexSet::new();
    filter(&raw.instances, |instance| {
        validate_instance(raw, instance, &names, &plurals)
            .and_then(|| derived(instance))
            .transform(|| {
                names.insert(instance.name.as_str());
                plurals.insert(instance.plural.as_str());
                instance.clone()
            })
    })
}

fn validate_instance(
    unit: &RawUnit,
    instance: &RawUnitInstance,
    names: &IndexSet<&str>,
    plurals: &IndexSet<&str>,
) -> Validity {
    let located = |diagnostic: Diagnostic| {
        diagnostic
            .with_location(instance.location.clone())
            .with_subject(&unit.type_name)
            .with_context("instance", &instance.name)
    };

    Validity::conditional(is_identifier(&instance.name), || {
        located(Diagnostic::error(
            INVALID_UNIT_INSTANCE_NAME,
            format!("'{}' is not a valid unit instance name", instance.name),
        ))
    })
    .and_then(|| {
        Validity::conditional(is_identifier(&instance.plural), || {
            located(Diagnostic::error(
                INVALID_UNIT_INSTANCE_PLURAL_FORM,
                format!(
                    "'{}' is not a valid plural form of '{}'",
                    instance.plural, instance.name
                ),
            ))
        })
    })
    .and_then(|| {
        Validity::conditional(!names.contains(instance.name.as_str()), || {
            located(Diagnostic::error(
                DUPLICATE_UNIT_INSTANCE_NAME,
                format!(
                    "'{}' already declares an instance named '{}'",
                    unit.type_name, instance.name
                ),
            ))
        })
    })
    .and_then(|| {
        Validity::conditional(!plurals.contains(instance.plural.as_str()), || {
            located(Diagnostic::error(
                DUPLICATE_UNIT_INSTANCE_PLURAL_FORM,
                format!(
                    "'{}' already declares an instance with the plural form '{}'",
                    unit.type_name, instance.plural
                ),
            ))
        })
    })
    .and_then(|| match &instance.kind {
        UnitInstanceKind::Biased { bias, .. } => Validity::conditional(unit.bias_term, || {
            located(Diagnostic::error(
                UNIT_NOT_INCLUDING_BIAS_TERM,
                format!(
                    "'{}' is biased, but '{}' does not include a bias term",
                    instance.name, unit.type_name
                ),
            ))
        })
        .and_then(|| validate_coefficient(bias, &located)),
        UnitInstanceKind::Scaled { scale, .. } => validate_coefficient(scale, &located),
        _ => Validity::valid(),
    })
}

fn validate_coefficient(
    coefficient: &Coefficient,
    located: &impl Fn(Diagnostic) -> Diagnostic,
) -> Validity {
    match coefficient {
        Coefficient::Value(value) => Validity::conditional(value.is_finite(), || {
            located(Diagnostic::error(
                INVALID_EXPRESSION,
                format!("{} is not a finite value", value),
            ))
        }),
        Coefficient::Expression(expression) => {
            Validity::conditional(!expression.trim().is_empty(), || {
                located(Diagnostic::error(INVALID_EXPRESSION, "the expression is empty"))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Metre", true)]
    #[case("_Metre2", true)]
    #[case("Ångström", true)]
    #[case("", false)]
    #[case("2Metre", false)]
    #[case("Square Metre", false)]
    fn test_is_identifier(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_identifier(name), expected);
    }
}
