//! Local validation of scalar and vector quantities
//!
//! Everything that can be checked from a single declaration, its chain of raw
//! ancestors and the validated units is checked here. What depends on the
//! resolved facets of ancestors is left to the specialization stage.

use indexmap::IndexSet;
use unitscape_diagnostics::{
    DIFFERENCE_DISABLED_BUT_QUANTITY_SPECIFIED, DUPLICATE_CONSTANT_NAME, DUPLICATE_LISTING,
    DUPLICATE_PROCESS_NAME, DUPLICATE_QUANTITY_OPERATION, Diagnostic, INVALID_CONSTANT_NAME,
    INVALID_DERIVATION_EXPRESSION, INVALID_DERIVATION_SIGNATURE, INVALID_EXPRESSION,
    INVALID_PROCESS_NAME, Outcome, QUANTITY_CONVERTIBLE_TO_SELF, SourceLocation,
    UNIT_NOT_INCLUDING_BIAS_TERM, UNRECOGNIZED_ORIGINAL_QUANTITY,
    UNRECOGNIZED_UNIT_INSTANCE_NAME, VECTOR_UNEXPECTED_DIMENSION, Validity, WithDiagnostics,
    filter,
};
use unitscape_model::{
    Constant, InheritFlags, QuantityDerivation, QuantityKind, QuantityOperation,
    QuantityProcess, QuantityProperties, RawQuantity, TypeName, UnitType,
};

use crate::derivations::check_expression;
use crate::inclusion::{InclusionLists, validate_lists};
use crate::population::{
    ChainError, DeclaredTypes, Kind, Population, QuantityPopulation, chain_diagnostic,
};
use crate::units::is_identifier;

/// What differs between scalar and vector quantities
pub trait Shape: Clone + Send + Sync + Sized {
    /// Shape once inherited properties have been resolved
    type Resolved: Clone + Send + Sync;

    const KIND: Kind;

    /// Validate the shape declared by `raw`, whose chain ends in `base`
    fn validate(
        raw: &RawQuantity<Self>,
        base: &RawQuantity<Self>,
        declared: &DeclaredTypes<'_>,
        site: &Site<'_>,
    ) -> Outcome<Self>;

    /// Resolve the shape from the local shapes of a chain, current type first
    fn resolve(levels: &[&Self]) -> Self::Resolved;

    /// Number of components of a constant, given the shape of the base
    fn components(base: &Self) -> Option<usize>;
}

/// The declaration diagnostics are attached to
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub type_name: &'a TypeName,
    pub location: &'a SourceLocation,
}

impl<'a> Site<'a> {
    pub fn new(type_name: &'a TypeName, location: &'a SourceLocation) -> Self {
        Self {
            type_name,
            location,
        }
    }

    /// Attach the diagnostic to the declaration itself
    pub fn at(&self, diagnostic: Diagnostic) -> Diagnostic {
        self.at_item(diagnostic, self.location)
    }

    /// Attach the diagnostic to an item of the declaration, falling back to
    /// the declaration when the item carries no location
    pub fn at_item(&self, diagnostic: Diagnostic, location: &SourceLocation) -> Diagnostic {
        let location = if location.is_unknown() {
            self.location
        } else {
            location
        };
        diagnostic
            .with_location(location.clone())
            .with_subject(self.type_name)
    }
}

/// A quantity whose own declaration has been validated
#[derive(Debug, Clone, PartialEq)]
pub struct LocalQuantity<S> {
    pub type_name: TypeName,
    pub location: SourceLocation,
    pub original: Option<TypeName>,
    /// Inherit flags; nothing is inherited by a base
    pub inherit: InheritFlags,
    /// Root of the specialization chain
    pub base: TypeName,
    pub unit: TypeName,
    pub use_unit_bias: bool,
    pub properties: QuantityProperties,
    pub shape: S,
    pub constants: Vec<Constant>,
    pub conversions: Vec<TypeName>,
    pub derivations: Vec<QuantityDerivation>,
    pub operations: Vec<QuantityOperation>,
    pub processes: Vec<QuantityProcess>,
    pub lists: InclusionLists,
}

impl<S> LocalQuantity<S> {
    pub fn site(&self) -> Site<'_> {
        Site::new(&self.type_name, &self.location)
    }
}

/// Diagnostic for a quantity dropped because an ancestor could not be resolved
pub fn broken_ancestor(site: &Site<'_>, ancestor: &TypeName) -> Diagnostic {
    site.at(
        Diagnostic::error(
            UNRECOGNIZED_ORIGINAL_QUANTITY,
            format!(
                "'{}' cannot be resolved, '{}' in its specialization chain is invalid",
                site.type_name, ancestor
            ),
        )
        .with_context("original", ancestor),
    )
}

/// Validate the declaration of a single quantity
pub fn validate_local<S: Shape>(
    raw: &RawQuantity<S>,
    quantities: &QuantityPopulation<S>,
    units: &Population<UnitType>,
    declared: &DeclaredTypes<'_>,
) -> Outcome<LocalQuantity<S>> {
    log::trace!("validating {} {}", S::KIND, raw.type_name);
    let site = Site::new(&raw.type_name, &raw.location);

    let chain = match quantities.chain(&raw.type_name) {
        Ok(chain) => chain,
        Err(error) => {
            let found = match &error {
                ChainError::Unrecognized { missing } => declared.kind_of(missing),
                ChainError::Circular { .. } => None,
            };
            return Outcome::empty(site.at(chain_diagnostic(
                &raw.type_name,
                S::KIND,
                &error,
                found,
            )));
        }
    };
    let Some(base) = chain.last().copied() else {
        return Outcome::none();
    };
    let QuantityKind::Base {
        unit: unit_name,
        use_unit_bias,
    } = &base.kind
    else {
        return Outcome::none();
    };

    let Some(unit) = units.get(unit_name) else {
        if raw.is_base() {
            let diagnostic = match declared.expect_kind(unit_name, Kind::Unit) {
                Err(diagnostic) => diagnostic,
                Ok(()) => Diagnostic::error(
                    Kind::Unit.mismatch_code(),
                    format!("unit '{}' of '{}' is invalid", unit_name, raw.type_name),
                )
                .with_context("reference", unit_name),
            };
            return Outcome::empty(site.at(diagnostic));
        }
        return Outcome::empty(broken_ancestor(&site, &base.type_name));
    };

    if raw.is_base() && *use_unit_bias && !unit.bias_term {
        return Outcome::empty(site.at(Diagnostic::error(
            UNIT_NOT_INCLUDING_BIAS_TERM,
            format!(
                "'{}' uses the unit bias, but '{}' does not include a bias term",
                raw.type_name, unit.type_name
            ),
        )));
    }

    let inherit = match &raw.kind {
        QuantityKind::Base { .. } => InheritFlags::NONE,
        QuantityKind::Specialization { inherit, .. } => *inherit,
    };

    S::validate(raw, base, declared, &site).merge(|shape| {
        let components = S::components(&base.shape);
        let (properties, property_diagnostics) =
            validate_properties::<S>(raw, unit, declared, &site).into_parts();
        let (constants, constant_diagnostics) =
            validate_constants(&raw.facets.constants, unit, components, &site).into_parts();
        let (conversions, conversion_diagnostics) =
            validate_conversions::<S>(raw, declared, &site).into_parts();
        let (derivations, derivation_diagnostics) =
            validate_derivations(&raw.facets.derivations, declared, &site).into_parts();
        let (operations, operation_diagnostics) =
            validate_operations(&raw.facets.operations, declared, &site).into_parts();
        let (processes, process_diagnostics) =
            validate_processes(&raw.facets.processes, &site).into_parts();
        let (lists, list_diagnostics) = validate_lists(&raw.facets, unit, &site).into_parts();

        Outcome::with_diagnostics(
            LocalQuantity {
                type_name: raw.type_name.clone(),
                location: raw.location.clone(),
                original: raw.original().cloned(),
                inherit,
                base: base.type_name.clone(),
                unit: unit.type_name.clone(),
                use_unit_bias: *use_unit_bias,
                properties,
                shape,
                constants,
                conversions,
                derivations,
                operations,
                processes,
                lists,
            },
            property_diagnostics
                .into_iter()
                .chain(constant_diagnostics)
                .chain(conversion_diagnostics)
                .chain(derivation_diagnostics)
                .chain(operation_diagnostics)
                .chain(process_diagnostics)
                .chain(list_diagnostics),
        )
    })
}

/// Drop a reference that is not of the `expected` kind
pub fn checked_reference(
    reference: &Option<TypeName>,
    expected: Kind,
    declared: &DeclaredTypes<'_>,
    site: &Site<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<TypeName> {
    let reference = reference.as_ref()?;
    match declared.expect_kind(reference, expected) {
        Ok(()) => Some(reference.clone()),
        Err(diagnostic) => {
            diagnostics.push(site.at(diagnostic));
            None
        }
    }
}

fn validate_properties<S: Shape>(
    raw: &RawQuantity<S>,
    unit: &UnitType,
    declared: &DeclaredTypes<'_>,
    site: &Site<'_>,
) -> WithDiagnostics<QuantityProperties> {
    let mut diagnostics = Vec::new();
    let properties = &raw.properties;

    let default_unit = properties.default_unit.as_ref().and_then(|name| {
        if unit.has_instance(name) {
            Some(name.clone())
        } else {
            diagnostics.push(site.at(
                Diagnostic::error(
                    UNRECOGNIZED_UNIT_INSTANCE_NAME,
                    format!(
                        "default unit '{}' is not an instance of '{}'",
                        name, unit.type_name
                    ),
                )
                .with_context("instance", name),
            ));
            None
        }
    });

    let mut difference =
        checked_reference(&properties.difference, S::KIND, declared, site, &mut diagnostics);
    if properties.implement_difference == Some(false) && difference.is_some() {
        diagnostics.push(site.at(Diagnostic::warning(
            DIFFERENCE_DISABLED_BUT_QUANTITY_SPECIFIED,
            format!(
                "'{}' disables the difference, but specifies a difference quantity",
                raw.type_name
            ),
        )));
        difference = None;
    }

    WithDiagnostics::with_diagnostics(
        QuantityProperties {
            default_unit,
            default_symbol: properties.default_symbol.clone(),
            implement_sum: properties.implement_sum,
            implement_difference: properties.implement_difference,
            difference,
        },
        diagnostics,
    )
}

fn validate_constants(
    constants: &[Constant],
    unit: &UnitType,
    components: Option<usize>,
    site: &Site<'_>,
) -> WithDiagnostics<Vec<Constant>> {
    let mut names: IndexSet<&str> = IndexSet::new();

    filter(constants, |constant| {
        let at = |diagnostic: Diagnostic| {
            site.at_item(diagnostic.with_context("constant", &constant.name), &constant.location)
        };

        Validity::conditional(is_identifier(&constant.name), || {
            at(Diagnostic::error(
                INVALID_CONSTANT_NAME,
                format!("'{}' is not a valid constant name", constant.name),
            ))
        })
        .and_then(|| match &constant.multiples {
            Some(multiples) => Validity::conditional(is_identifier(multiples), || {
                at(Diagnostic::error(
                    INVALID_CONSTANT_NAME,
                    format!("'{}' is not a valid name for multiples of a constant", multiples),
                ))
            }),
            None => Validity::valid(),
        })
        .and_then(|| {
            Validity::conditional(unit.has_instance(&constant.unit), || {
                at(Diagnostic::error(
                    UNRECOGNIZED_UNIT_INSTANCE_NAME,
                    format!(
                        "'{}' is not an instance of '{}'",
                        constant.unit, unit.type_name
                    ),
                ))
            })
        })
        .and_then(|| match components {
            Some(expected) => {
                let found = constant.value.components();
                Validity::conditional(found == expected, || {
                    at(Diagnostic::error(
                        VECTOR_UNEXPECTED_DIMENSION,
                        format!(
                            "constant '{}' has {} components, expected {}",
                            constant.name, found, expected
                        ),
                    ))
                })
            }
            None => Validity::valid(),
        })
        .and_then(|| {
            Validity::conditional(!names.contains(constant.name.as_str()), || {
                at(Diagnostic::error(
                    DUPLICATE_CONSTANT_NAME,
                    format!("a constant named '{}' is already declared", constant.name),
                ))
            })
        })
        .transform(|| {
            names.insert(constant.name.as_str());
            constant.clone()
        })
    })
}

fn validate_conversions<S: Shape>(
    raw: &RawQuantity<S>,
    declared: &DeclaredTypes<'_>,
    site: &Site<'_>,
) -> WithDiagnostics<Vec<TypeName>> {
    let mut listed: IndexSet<&TypeName> = IndexSet::new();
    let targets = raw
        .facets
        .conversions
        .iter()
        .flat_map(|conversion| conversion.quantities.iter().map(move |q| (q, &conversion.location)));

    filter(targets, |(target, location)| {
        let at = |diagnostic: Diagnostic| {
            site.at_item(diagnostic.with_context("conversion", target), location)
        };

        let kind = match declared.expect_kind(target, S::KIND) {
            Ok(()) => Validity::valid(),
            Err(diagnostic) => Validity::invalid(at(diagnostic)),
        };

        kind.and_then(|| {
            Validity::conditional(target != &raw.type_name, || {
                at(Diagnostic::warning(
                    QUANTITY_CONVERTIBLE_TO_SELF,
                    format!("'{}' is listed as convertible to itself", raw.type_name),
                ))
            })
        })
        .and_then(|| {
            Validity::conditional(!listed.contains(target), || {
                at(Diagnostic::info(
                    DUPLICATE_LISTING,
                    format!("conversion to '{}' is already listed", target),
                ))
            })
        })
        .transform(|| {
            listed.insert(target);
            target.clone()
        })
    })
}

fn validate_derivations(
    derivations: &[QuantityDerivation],
    declared: &DeclaredTypes<'_>,
    site: &Site<'_>,
) -> WithDiagnostics<Vec<QuantityDerivation>> {
    filter(derivations, |derivation| {
        let at = |diagnostic: Diagnostic| site.at_item(diagnostic, &derivation.location);

        Validity::conditional(!derivation.signature.is_empty(), || {
            at(Diagnostic::error(
                INVALID_DERIVATION_SIGNATURE,
                "a quantity derivation needs a non-empty signature",
            ))
        })
        .and_then(|| {
            Validity::all(derivation.signature.iter().map(|element| {
                match declared.expect_quantity(element) {
                    Ok(()) => Validity::valid(),
                    Err(diagnostic) => Validity::invalid(at(diagnostic)),
                }
            }))
        })
        .and_then(|| {
            match check_expression(&derivation.expression, derivation.signature.len()) {
                Ok(()) => Validity::valid(),
                Err(reason) => Validity::invalid(at(
                    Diagnostic::error(
                        INVALID_DERIVATION_EXPRESSION,
                        format!("invalid derivation expression: {}", reason),
                    )
                    .with_context("expression", &derivation.expression),
                )),
            }
        })
        .transform(|| derivation.clone())
    })
}

fn validate_operations(
    operations: &[QuantityOperation],
    declared: &DeclaredTypes<'_>,
    site: &Site<'_>,
) -> WithDiagnostics<Vec<QuantityOperation>> {
    let mut seen = IndexSet::new();

    filter(operations, |operation| {
        let at = |diagnostic: Diagnostic| site.at_item(diagnostic, &operation.location);
        let reference = |name: &TypeName| match declared.expect_quantity(name) {
            Ok(()) => Validity::valid(),
            Err(diagnostic) => Validity::invalid(at(diagnostic)),
        };

        reference(&operation.result)
            .validate(reference(&operation.other))
            .and_then(|| {
                Validity::conditional(!seen.contains(&operation.signature()), || {
                    at(Diagnostic::error(
                        DUPLICATE_QUANTITY_OPERATION,
                        format!(
                            "operation {:?} with '{}' resulting in '{}' is already declared",
                            operation.operator, operation.other, operation.result
                        ),
                    ))
                })
            })
            .transform(|| {
                seen.insert(operation.signature());
                operation.clone()
            })
    })
}

fn validate_processes(
    processes: &[QuantityProcess],
    site: &Site<'_>,
) -> WithDiagnostics<Vec<QuantityProcess>> {
    let mut names: IndexSet<&str> = IndexSet::new();

    filter(processes, |process| {
        let at = |diagnostic: Diagnostic| {
            site.at_item(diagnostic.with_context("process", &process.name), &process.location)
        };

        Validity::conditional(is_identifier(&process.name), || {
            at(Diagnostic::error(
                INVALID_PROCESS_NAME,
                format!("'{}' is not a valid process name", process.name),
            ))
        })
        .and_then(|| {
            Validity::conditional(!process.expression.trim().is_empty(), || {
                at(Diagnostic::error(
                    INVALID_EXPRESSION,
                    format!("process '{}' has an empty expression", process.name),
                ))
            })
        })
        .and_then(|| {
            Validity::conditional(!names.contains(process.name.as_str()), || {
                at(Diagnostic::error(
                    DUPLICATE_PROCESS_NAME,
                    format!("a process named '{}' is already declared", process.name),
                ))
            })
        })
        .transform(|| {
            names.insert(process.name.as_str());
            process.clone()
        })
    })
}
