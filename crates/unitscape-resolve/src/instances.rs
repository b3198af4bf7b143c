//! Unit instance dependency resolution
//!
//! Fixed and derived instances stand on their own. Every other instance is
//! defined in terms of another instance of the same unit and is only kept once
//! that instance is known to be resolvable.

use indexmap::{IndexMap, IndexSet};
use unitscape_diagnostics::{Diagnostic, UNRESOLVABLE_UNIT_INSTANCE, WithDiagnostics};
use unitscape_model::{RawUnitInstance, TypeName, UnitInstance};

/// Resolve the instances of `unit` to a fixed point
///
/// Instances that never become resolvable, whether their chain is cyclic or
/// ends in a name the unit does not declare, are reported once each and left
/// out of the table. The table keeps declaration order.
pub fn resolve_instances(
    unit: &TypeName,
    instances: Vec<RawUnitInstance>,
) -> WithDiagnostics<IndexMap<String, UnitInstance>> {
    let mut resolved: IndexSet<&str> = instances
        .iter()
        .filter(|instance| instance.kind.dependency().is_none())
        .map(|instance| instance.name.as_str())
        .collect();
    let mut unresolved: Vec<(&str, &str)> = instances
        .iter()
        .filter_map(|instance| {
            instance
                .kind
                .dependency()
                .map(|dependency| (instance.name.as_str(), dependency))
        })
        .collect();

    loop {
        let before = unresolved.len();
        unresolved.retain(|(name, dependency)| {
            if resolved.contains(dependency) {
                resolved.insert(*name);
                false
            } else {
                true
            }
        });
        if unresolved.len() == before {
            break;
        }
    }

    log::trace!(
        "{}: {} instances resolved, {} unresolvable",
        unit,
        resolved.len(),
        unresolved.len()
    );

    let unresolvable: IndexMap<String, String> = unresolved
        .into_iter()
        .map(|(name, dependency)| (name.to_string(), dependency.to_string()))
        .collect();
    let mut diagnostics = Vec::new();
    for instance in &instances {
        if let Some(dependency) = unresolvable.get(&instance.name) {
            diagnostics.push(
                Diagnostic::error(
                    UNRESOLVABLE_UNIT_INSTANCE,
                    format!(
                        "{} instance '{}' of '{}' cannot be resolved through '{}'",
                        instance.kind.describe(),
                        instance.name,
                        unit,
                        dependency
                    ),
                )
                .with_location(instance.location.clone())
                .with_subject(unit)
                .with_context("instance", &instance.name)
                .with_context("dependency", dependency),
            );
        }
    }

    let table = instances
        .into_iter()
        .filter(|instance| !unresolvable.contains_key(&instance.name))
        .map(|instance| {
            let RawUnitInstance {
                name, plural, kind, ..
            } = instance;
            (name.clone(), UnitInstance { name, plural, kind })
        })
        .collect();

    WithDiagnostics::with_diagnostics(table, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use unitscape_diagnostics::SourceLocation;
    use unitscape_model::{Coefficient, MetricPrefix, Prefix, UnitInstanceKind};

    fn instance(name: &str, kind: UnitInstanceKind) -> RawUnitInstance {
        RawUnitInstance {
            name: name.to_string(),
            plural: format!("{name}s"),
            kind,
            location: SourceLocation::default(),
        }
    }

    fn alias(name: &str, of: &str) -> RawUnitInstance {
        instance(name, UnitInstanceKind::Alias { of: of.to_string() })
    }

    fn unit() -> TypeName {
        TypeName::new("Test", "UnitOfLength")
    }

    #[test]
    fn test_chains_resolve_regardless_of_order() {
        let instances = vec![
            instance(
                "Kilometre",
                UnitInstanceKind::Prefixed {
                    of: "Metre".into(),
                    prefix: Prefix::Metric(MetricPrefix::Kilo),
                },
            ),
            alias("Klick", "Kilometre"),
            instance(
                "Megametre",
                UnitInstanceKind::Scaled {
                    of: "Klick".into(),
                    scale: Coefficient::Value(1000.0),
                },
            ),
            instance("Metre", UnitInstanceKind::Fixed),
        ];

        let (table, diagnostics) = resolve_instances(&unit(), instances).into_parts();

        assert!(diagnostics.is_empty());
        let names: Vec<_> = table.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Kilometre", "Klick", "Megametre", "Metre"]);
    }

    #[test]
    fn test_cycle_reported_once_per_instance() {
        let instances = vec![alias("X", "Y"), alias("Y", "X")];

        let first = resolve_instances(&unit(), instances.clone());
        let second = resolve_instances(&unit(), instances);

        assert!(first.value().is_empty());
        assert_eq!(first.diagnostics().len(), 2);
        assert!(first
            .diagnostics()
            .iter()
            .all(|d| d.code == UNRESOLVABLE_UNIT_INSTANCE));
        assert_eq!(first, second);
    }

    #[test]
    fn test_dangling_dependency_reported_like_cycle() {
        let instances = vec![
            instance("Metre", UnitInstanceKind::Fixed),
            alias("Meter", "Metre"),
            alias("Inch", "Thumb"),
            alias("Foot", "Inch"),
        ];

        let (table, diagnostics) = resolve_instances(&unit(), instances).into_parts();

        assert_eq!(table.len(), 2);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].context.get("instance").map(String::as_str), Some("Inch"));
        assert_eq!(diagnostics[1].context.get("dependency").map(String::as_str), Some("Inch"));
    }
}
