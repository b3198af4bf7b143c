//! Resolution pipeline
//!
//! Sequences the passes over one set of declarations:
//!
//! 1. separate identities declared as more than one kind
//! 2. build the raw unit, scalar and vector populations
//! 3. find the resolvable instances of every unit, validate every unit
//!    against them, then build the unit population
//! 4. validate every scalar and vector on its own
//! 5. resolve inheritance and instance sets of every scalar and vector
//!
//! No failing type prevents any other type from being processed. Per-type work
//! runs on the rayon thread pool unless disabled; results are collected in
//! declaration order either way.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use unitscape_diagnostics::{Diagnostic, Outcome, Severity, filter};
use unitscape_model::{
    Declarations, RawQuantity, ResolvedQuantity, ScalarType, TypeName, UnitType, VectorType,
};

use crate::population::{DeclaredTypes, Kind, Population, QuantityPopulation, separate_kinds};
use crate::quantities::{LocalQuantity, Shape, validate_local};
use crate::specialization::resolve_quantity;
use crate::units::{InstanceNames, resolvable_instances, validate_unit};

/// Resolution options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Validate types on the rayon thread pool
    pub parallel: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Resolved populations together with every diagnostic raised
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub units: Population<UnitType>,
    pub scalars: Population<ScalarType>,
    pub vectors: Population<VectorType>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// No diagnostic of any severity
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Resolves declarations into validated populations
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve every declaration
    pub fn resolve(&self, declarations: Declarations) -> Resolution {
        log::debug!(
            "resolving {} units, {} scalars, {} vectors",
            declarations.units.len(),
            declarations.scalars.len(),
            declarations.vectors.len()
        );

        let (declarations, mut diagnostics) = separate_kinds(declarations).into_parts();

        let (raw_units, unit_duplicates) = Population::build(declarations.units).into_parts();
        let (raw_scalars, scalar_duplicates) =
            QuantityPopulation::build(Kind::Scalar, declarations.scalars).into_parts();
        let (raw_vectors, vector_duplicates) =
            QuantityPopulation::build(Kind::Vector, declarations.vectors).into_parts();
        diagnostics.extend(unit_duplicates);
        diagnostics.extend(scalar_duplicates);
        diagnostics.extend(vector_duplicates);

        let declared = DeclaredTypes {
            units: &raw_units,
            scalars: &raw_scalars,
            vectors: &raw_vectors,
        };

        log::debug!("validating {} units", raw_units.len());
        let resolvable: InstanceNames = raw_units
            .iter()
            .map(|(name, raw)| (name.clone(), resolvable_instances(raw, &declared)))
            .collect();
        let units = self.collect(
            raw_units.values().collect(),
            |raw| validate_unit(raw, &declared, &resolvable),
            &mut diagnostics,
        );
        let units = Population::from_unique(units);

        log::debug!(
            "validating {} scalars and {} vectors",
            raw_scalars.population().len(),
            raw_vectors.population().len()
        );
        let local_scalars =
            self.validate_quantities(&raw_scalars, &units, &declared, &mut diagnostics);
        let local_vectors =
            self.validate_quantities(&raw_vectors, &units, &declared, &mut diagnostics);

        log::debug!("resolving specializations");
        let scalars = self.resolve_quantities(&local_scalars, &units, &mut diagnostics);
        let vectors = self.resolve_quantities(&local_vectors, &units, &mut diagnostics);

        log::debug!(
            "resolved {} units, {} scalars, {} vectors with {} diagnostics",
            units.len(),
            scalars.len(),
            vectors.len(),
            diagnostics.len()
        );

        Resolution {
            units,
            scalars,
            vectors,
            diagnostics,
        }
    }

    fn validate_quantities<S: Shape>(
        &self,
        quantities: &QuantityPopulation<S>,
        units: &Population<UnitType>,
        declared: &DeclaredTypes<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> IndexMap<TypeName, LocalQuantity<S>>
    where
        RawQuantity<S>: Sync,
    {
        self.collect(
            quantities.population().values().collect(),
            |raw| validate_local(raw, quantities, units, declared),
            diagnostics,
        )
        .into_iter()
        .map(|local| (local.type_name.clone(), local))
        .collect()
    }

    fn resolve_quantities<S: Shape>(
        &self,
        locals: &IndexMap<TypeName, LocalQuantity<S>>,
        units: &Population<UnitType>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Population<ResolvedQuantity<S::Resolved>> {
        Population::from_unique(self.collect(
            locals.values().collect(),
            |local| resolve_quantity(local, locals, units),
            diagnostics,
        ))
    }

    /// Run `process` over `items`, keeping the values and appending the
    /// diagnostics in item order
    fn collect<'a, T, U, F>(
        &self,
        items: Vec<&'a T>,
        process: F,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<U>
    where
        T: Sync + 'a,
        U: Send,
        F: Fn(&'a T) -> Outcome<U> + Sync + Send,
    {
        let outcomes: Vec<Outcome<U>> = if self.options.parallel {
            items.into_par_iter().map(process).collect()
        } else {
            items.into_iter().map(process).collect()
        };

        let (values, item_diagnostics) = filter(outcomes, |outcome| outcome).into_parts();
        diagnostics.extend(item_diagnostics);
        values
    }
}

/// Resolve declarations with default options
pub fn resolve(declarations: Declarations) -> Resolution {
    Resolver::new().resolve(declarations)
}
