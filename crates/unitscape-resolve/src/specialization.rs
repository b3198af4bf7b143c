//! Inheritance along specialization chains
//!
//! List facets collect the items of ancestors, root first, before the items of
//! the quantity itself, as far up the chain as the inherit flags allow.
//! Single-value properties take the nearest value set along the chain.

use indexmap::{IndexMap, IndexSet};
use std::hash::Hash;
use unitscape_diagnostics::{
    CIRCULAR_SPECIALIZATION, CONSTANT_SHARES_NAME_WITH_UNIT, DUPLICATE_CONSTANT_NAME,
    DUPLICATE_LISTING, DUPLICATE_PROCESS_NAME, DUPLICATE_QUANTITY_OPERATION, Diagnostic,
    INTERNAL_ERROR, Outcome, SourceLocation, WithDiagnostics,
};
use unitscape_model::{
    Constant, InheritFlags, QuantityOperation, ResolvedQuantity, TypeName, UnitType,
};

use crate::inclusion::{ListKind, resolve_included};
use crate::population::Population;
use crate::quantities::{LocalQuantity, Shape, Site, broken_ancestor};

/// The chain of `quantity` through validated quantities, current type first
///
/// Fails when an ancestor did not survive local validation.
pub fn local_chain<'a, S>(
    quantity: &'a LocalQuantity<S>,
    locals: &'a IndexMap<TypeName, LocalQuantity<S>>,
) -> Result<Vec<&'a LocalQuantity<S>>, Diagnostic> {
    let mut chain = vec![quantity];
    let mut visited: IndexSet<&TypeName> = IndexSet::from([&quantity.type_name]);
    let mut current = quantity;

    while let Some(original) = &current.original {
        if !visited.insert(original) {
            return Err(quantity.site().at(Diagnostic::error(
                CIRCULAR_SPECIALIZATION,
                format!("the specialization chain of '{}' is circular", quantity.type_name),
            )));
        }
        let Some(next) = locals.get(original) else {
            return Err(broken_ancestor(&quantity.site(), original));
        };
        chain.push(next);
        current = next;
    }

    Ok(chain)
}

/// Items of the ancestors `inherits` reaches, root first
///
/// Each level contributes only while every level below it inherits.
pub fn collect_inherited<'a, S, T>(
    chain: &[&'a LocalQuantity<S>],
    items: impl Fn(&'a LocalQuantity<S>) -> &'a [T],
    inherits: impl Fn(&InheritFlags) -> bool,
) -> Vec<&'a T> {
    let depth = chain
        .iter()
        .take_while(|level| inherits(&level.inherit))
        .count()
        .min(chain.len().saturating_sub(1));

    chain[1..=depth]
        .iter()
        .rev()
        .copied()
        .flat_map(|level| items(level).iter())
        .collect()
}

/// Nearest value set along the chain, current type first
pub fn nearest<S, T: Clone>(
    chain: &[&LocalQuantity<S>],
    property: impl Fn(&LocalQuantity<S>) -> &Option<T>,
) -> Option<T> {
    chain.iter().find_map(|level| property(level).clone())
}

/// Inherited items followed by the local items whose key is not inherited
///
/// Repeats among inherited items are dropped silently, they were reported
/// where they were declared. Each local repeat is reported through `duplicate`.
fn merge_unique<T: Clone, K: Hash + Eq>(
    inherited: Vec<&T>,
    local: &[T],
    key: impl Fn(&T) -> K,
    duplicate: impl Fn(&T) -> Diagnostic,
) -> WithDiagnostics<Vec<T>> {
    let mut keys = IndexSet::new();
    let mut items: Vec<T> = inherited
        .into_iter()
        .filter(|item| keys.insert(key(*item)))
        .cloned()
        .collect();
    let mut diagnostics = Vec::new();

    for item in local {
        if keys.insert(key(item)) {
            items.push(item.clone());
        } else {
            diagnostics.push(duplicate(item));
        }
    }

    WithDiagnostics::with_diagnostics(items, diagnostics)
}

/// Resolve a locally validated quantity against its validated ancestors
pub fn resolve_quantity<S: Shape>(
    quantity: &LocalQuantity<S>,
    locals: &IndexMap<TypeName, LocalQuantity<S>>,
    units: &Population<UnitType>,
) -> Outcome<ResolvedQuantity<S::Resolved>> {
    log::trace!("resolving inheritance of {}", quantity.type_name);
    let site = quantity.site();

    let chain = match local_chain(quantity, locals) {
        Ok(chain) => chain,
        Err(diagnostic) => return Outcome::empty(diagnostic),
    };
    let Some(unit) = units.get(&quantity.unit) else {
        return Outcome::empty(site.at(Diagnostic::error(
            INTERNAL_ERROR,
            format!("validated unit '{}' is missing", quantity.unit),
        )));
    };
    let at =
        |diagnostic: Diagnostic, location: &SourceLocation| site.at_item(diagnostic, location);

    let (included_bases, bases_diagnostics) =
        resolve_included(&chain, unit, ListKind::Bases).into_parts();
    let (included_units, units_diagnostics) =
        resolve_included(&chain, unit, ListKind::Units).into_parts();

    let (constants, constant_diagnostics) = merge_unique(
        collect_inherited(&chain, |level| level.constants.as_slice(), |flags| flags.constants),
        &quantity.constants,
        |constant| constant.name.clone(),
        |constant| {
            at(
                Diagnostic::error(
                    DUPLICATE_CONSTANT_NAME,
                    format!(
                        "constant '{}' is already inherited by '{}'",
                        constant.name, quantity.type_name
                    ),
                )
                .with_context("constant", &constant.name),
                &constant.location,
            )
        },
    )
    .merge(|constants| {
        check_constant_names(quantity, constants, unit, &included_bases, &included_units, &site)
    })
    .into_parts();

    let (conversions, conversion_diagnostics) = merge_unique(
        collect_inherited(
            &chain,
            |level| level.conversions.as_slice(),
            |flags| flags.conversions,
        ),
        &quantity.conversions,
        TypeName::clone,
        |target| {
            site.at(
                Diagnostic::info(
                    DUPLICATE_LISTING,
                    format!("conversion to '{}' is already inherited", target),
                )
                .with_context("conversion", target),
            )
        },
    )
    .into_parts();

    let derivations = collect_inherited(
        &chain,
        |level| level.derivations.as_slice(),
        |flags| flags.derivations,
    )
    .into_iter()
    .chain(&quantity.derivations)
    .cloned()
    .collect();

    let (operations, operation_diagnostics) = merge_unique(
        collect_inherited(
            &chain,
            |level| level.operations.as_slice(),
            |flags| flags.operations,
        ),
        &quantity.operations,
        |operation: &QuantityOperation| {
            let (result, other, operator, position) = operation.signature();
            (result.clone(), other.clone(), operator, position)
        },
        |operation| {
            at(
                Diagnostic::error(
                    DUPLICATE_QUANTITY_OPERATION,
                    format!(
                        "operation {:?} with '{}' resulting in '{}' is already inherited",
                        operation.operator, operation.other, operation.result
                    ),
                ),
                &operation.location,
            )
        },
    )
    .into_parts();

    let (processes, process_diagnostics) = merge_unique(
        collect_inherited(&chain, |level| level.processes.as_slice(), |flags| flags.processes),
        &quantity.processes,
        |process| process.name.clone(),
        |process| {
            at(
                Diagnostic::error(
                    DUPLICATE_PROCESS_NAME,
                    format!("process '{}' is already inherited", process.name),
                )
                .with_context("process", &process.name),
                &process.location,
            )
        },
    )
    .into_parts();

    let implement_sum = nearest(&chain, |level| &level.properties.implement_sum).unwrap_or(true);
    let implement_difference =
        nearest(&chain, |level| &level.properties.implement_difference).unwrap_or(true);
    let difference = if implement_difference {
        nearest(&chain, |level| &level.properties.difference)
            .or_else(|| Some(quantity.type_name.clone()))
    } else {
        None
    };
    let shapes: Vec<&S> = chain.iter().map(|level| &level.shape).collect();

    Outcome::with_diagnostics(
        ResolvedQuantity {
            type_name: quantity.type_name.clone(),
            location: quantity.location.clone(),
            original: quantity.original.clone(),
            base: quantity.base.clone(),
            unit: quantity.unit.clone(),
            use_unit_bias: quantity.use_unit_bias,
            default_unit: nearest(&chain, |level| &level.properties.default_unit),
            default_symbol: nearest(&chain, |level| &level.properties.default_symbol),
            implement_sum,
            implement_difference,
            difference,
            shape: S::resolve(&shapes),
            constants,
            conversions,
            derivations,
            operations,
            processes,
            included_bases,
            included_units,
        },
        bases_diagnostics
            .into_iter()
            .chain(units_diagnostics)
            .chain(constant_diagnostics)
            .chain(conversion_diagnostics)
            .chain(operation_diagnostics)
            .chain(process_diagnostics),
    )
}

/// Drop local constants whose name collides with an included unit instance,
/// or whose multiples collide with the plural form of one
fn check_constant_names<S>(
    quantity: &LocalQuantity<S>,
    constants: Vec<Constant>,
    unit: &UnitType,
    included_bases: &IndexSet<String>,
    included_units: &IndexSet<String>,
    site: &Site<'_>,
) -> WithDiagnostics<Vec<Constant>> {
    let plurals: IndexSet<&str> = included_units
        .iter()
        .filter_map(|name| unit.instance(name))
        .map(|instance| instance.plural.as_str())
        .collect();
    let local: IndexSet<&str> = quantity
        .constants
        .iter()
        .map(|constant| constant.name.as_str())
        .collect();
    let mut diagnostics = Vec::new();

    let constants = constants
        .into_iter()
        .filter(|constant| {
            if !local.contains(constant.name.as_str()) {
                return true;
            }
            let clash = if included_bases.contains(&constant.name) {
                Some(constant.name.as_str())
            } else {
                constant
                    .multiples
                    .as_deref()
                    .filter(|multiples| plurals.contains(multiples))
            };
            match clash {
                Some(name) => {
                    diagnostics.push(site.at_item(
                        Diagnostic::error(
                            CONSTANT_SHARES_NAME_WITH_UNIT,
                            format!(
                                "constant '{}' would share the name '{}' with an instance of '{}'",
                                constant.name, name, unit.type_name
                            ),
                        )
                        .with_context("constant", &constant.name),
                        &constant.location,
                    ));
                    false
                }
                None => true,
            }
        })
        .collect();

    WithDiagnostics::with_diagnostics(constants, diagnostics)
}
