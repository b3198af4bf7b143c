//! Populations of declared types
//!
//! A population maps every identity to the first definition declared under it.
//! Later declarations of the same identity are reported and remembered in a
//! separate duplicates map. Populations are built once and never mutated.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use unitscape_diagnostics::{
    CIRCULAR_SPECIALIZATION, DUPLICATE_DEFINITION, Diagnostic, ErrorCode, RelatedInfo,
    TYPE_ALREADY_DEFINED, TYPE_NOT_QUANTITY, TYPE_NOT_SCALAR, TYPE_NOT_UNIT, TYPE_NOT_VECTOR,
    UNRECOGNIZED_ORIGINAL_QUANTITY, WithDiagnostics,
};
use unitscape_model::{
    Declarations, Declared, RawQuantity, RawUnit, ScalarShape, TypeName, VectorShape,
};

/// The kind a type identity is declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Unit,
    Scalar,
    Vector,
}

impl Kind {
    /// Code reported when a reference expected to be of this kind is not
    pub const fn mismatch_code(self) -> ErrorCode {
        match self {
            Self::Unit => TYPE_NOT_UNIT,
            Self::Scalar => TYPE_NOT_SCALAR,
            Self::Vector => TYPE_NOT_VECTOR,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "unit"),
            Self::Scalar => write!(f, "scalar quantity"),
            Self::Vector => write!(f, "vector quantity"),
        }
    }
}

/// Identity to definition map, plus the identities that were declared more than once
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "T: Serialize"))]
pub struct Population<T> {
    definitions: IndexMap<TypeName, T>,
    #[serde(skip)]
    duplicates: IndexMap<TypeName, T>,
}

impl<T> Default for Population<T> {
    fn default() -> Self {
        Self {
            definitions: IndexMap::new(),
            duplicates: IndexMap::new(),
        }
    }
}

impl<T: Declared + Clone> Population<T> {
    /// Register definitions in order, keeping the first of every identity
    ///
    /// Each repeated declaration yields one `DuplicateDefinition` diagnostic at
    /// its own location and is otherwise discarded.
    pub fn build(items: impl IntoIterator<Item = T>) -> WithDiagnostics<Self> {
        let mut population = Self::default();
        let mut diagnostics = Vec::new();

        for item in items {
            if let Some(first) = population.definitions.get(item.type_name()) {
                diagnostics.push(
                    Diagnostic::error(
                        DUPLICATE_DEFINITION,
                        format!("'{}' is declared more than once", item.type_name()),
                    )
                    .with_location(item.location().clone())
                    .with_subject(item.type_name())
                    .with_related(
                        RelatedInfo::new("first declared here")
                            .with_location(first.location().clone()),
                    ),
                );
                if !population.duplicates.contains_key(item.type_name()) {
                    population
                        .duplicates
                        .insert(item.type_name().clone(), first.clone());
                }
                continue;
            }
            population.definitions.insert(item.type_name().clone(), item);
        }

        WithDiagnostics::with_diagnostics(population, diagnostics)
    }
}

impl<T> Population<T> {
    /// Population of already validated, unique definitions
    pub fn from_unique(definitions: impl IntoIterator<Item = T>) -> Self
    where
        T: Declared,
    {
        Self {
            definitions: definitions
                .into_iter()
                .map(|definition| (definition.type_name().clone(), definition))
                .collect(),
            duplicates: IndexMap::new(),
        }
    }

    pub fn get(&self, name: &TypeName) -> Option<&T> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeName, &T)> {
        self.definitions.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.definitions.values()
    }

    /// Identities declared more than once, with their first-seen definition
    pub fn duplicates(&self) -> &IndexMap<TypeName, T> {
        &self.duplicates
    }

    pub fn definitions(&self) -> &IndexMap<TypeName, T> {
        &self.definitions
    }
}

/// Drop declarations whose identity is already declared as another kind
///
/// Units take precedence over scalars, and scalars over vectors.
pub fn separate_kinds(declarations: Declarations) -> WithDiagnostics<Declarations> {
    let Declarations {
        units,
        scalars,
        vectors,
    } = declarations;
    let mut diagnostics = Vec::new();

    let unit_names: IndexMap<TypeName, Kind> = units
        .iter()
        .map(|unit| (unit.type_name.clone(), Kind::Unit))
        .collect();
    let scalars = retain_unclaimed(scalars, Kind::Scalar, &unit_names, &mut diagnostics);

    let mut claimed = unit_names;
    claimed.extend(scalars.iter().map(|scalar| (scalar.type_name.clone(), Kind::Scalar)));
    let vectors = retain_unclaimed(vectors, Kind::Vector, &claimed, &mut diagnostics);

    WithDiagnostics::with_diagnostics(
        Declarations {
            units,
            scalars,
            vectors,
        },
        diagnostics,
    )
}

fn retain_unclaimed<T: Declared>(
    items: Vec<T>,
    kind: Kind,
    claimed: &IndexMap<TypeName, Kind>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| match claimed.get(item.type_name()) {
            Some(existing) => {
                diagnostics.push(
                    Diagnostic::error(
                        TYPE_ALREADY_DEFINED,
                        format!(
                            "'{}' cannot be declared as a {}, it is already declared as a {}",
                            item.type_name(),
                            kind,
                            existing
                        ),
                    )
                    .with_location(item.location().clone())
                    .with_subject(item.type_name()),
                );
                false
            }
            None => true,
        })
        .collect()
}

/// Why the specialization chain of a quantity does not reach a base
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// `missing` is referenced as an original quantity but not declared as this kind
    Unrecognized { missing: TypeName },
    /// The chain returns to `repeated`
    Circular { repeated: TypeName },
}

/// A quantity population that knows the specialization chain of every type
#[derive(Debug, Clone)]
pub struct QuantityPopulation<S> {
    kind: Kind,
    population: Population<RawQuantity<S>>,
    bases: IndexMap<TypeName, TypeName>,
}

impl<S: Clone> QuantityPopulation<S> {
    pub fn build(kind: Kind, items: Vec<RawQuantity<S>>) -> WithDiagnostics<Self> {
        Population::build(items).map(|population| {
            let bases = population
                .definitions
                .keys()
                .filter_map(|name| {
                    let chain = chain_in(&population, name).ok()?;
                    let base = chain.last()?;
                    Some((name.clone(), base.type_name.clone()))
                })
                .collect();
            Self {
                kind,
                population,
                bases,
            }
        })
    }
}

impl<S> QuantityPopulation<S> {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn population(&self) -> &Population<RawQuantity<S>> {
        &self.population
    }

    pub fn get(&self, name: &TypeName) -> Option<&RawQuantity<S>> {
        self.population.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.population.contains(name)
    }

    /// Root of the chain of `name`, when the chain reaches a base
    pub fn ultimate_base(&self, name: &TypeName) -> Option<&RawQuantity<S>> {
        self.bases.get(name).and_then(|base| self.population.get(base))
    }

    /// The chain from `name` up to its base, current type first
    pub fn chain(&self, name: &TypeName) -> Result<Vec<&RawQuantity<S>>, ChainError> {
        chain_in(&self.population, name)
    }
}

fn chain_in<'a, S>(
    population: &'a Population<RawQuantity<S>>,
    name: &TypeName,
) -> Result<Vec<&'a RawQuantity<S>>, ChainError> {
    let mut chain: Vec<&RawQuantity<S>> = Vec::new();
    let mut current = name;

    loop {
        let Some(quantity) = population.get(current) else {
            return Err(ChainError::Unrecognized {
                missing: current.clone(),
            });
        };
        if chain.iter().any(|visited| visited.type_name == quantity.type_name) {
            return Err(ChainError::Circular {
                repeated: quantity.type_name.clone(),
            });
        }
        chain.push(quantity);

        match quantity.original() {
            Some(original) => current = original,
            None => return Ok(chain),
        }
    }
}

/// Read-only view of every raw population, used to check references
#[derive(Debug, Clone, Copy)]
pub struct DeclaredTypes<'a> {
    pub units: &'a Population<RawUnit>,
    pub scalars: &'a QuantityPopulation<ScalarShape>,
    pub vectors: &'a QuantityPopulation<VectorShape>,
}

impl DeclaredTypes<'_> {
    /// Kind `name` is declared as, if any
    pub fn kind_of(&self, name: &TypeName) -> Option<Kind> {
        if self.units.contains(name) {
            Some(Kind::Unit)
        } else if self.scalars.contains(name) {
            Some(Kind::Scalar)
        } else if self.vectors.contains(name) {
            Some(Kind::Vector)
        } else {
            None
        }
    }

    /// Check that `name` is declared as `expected`
    pub fn expect_kind(&self, name: &TypeName, expected: Kind) -> Result<(), Diagnostic> {
        match self.kind_of(name) {
            Some(kind) if kind == expected => Ok(()),
            found => Err(mismatch(name, expected.mismatch_code(), &expected, found)),
        }
    }

    /// Check that `name` is declared as a scalar or vector quantity
    pub fn expect_quantity(&self, name: &TypeName) -> Result<(), Diagnostic> {
        match self.kind_of(name) {
            Some(Kind::Scalar | Kind::Vector) => Ok(()),
            found => Err(mismatch(name, TYPE_NOT_QUANTITY, &"quantity", found)),
        }
    }
}

fn mismatch(
    name: &TypeName,
    code: ErrorCode,
    expected: &dyn fmt::Display,
    found: Option<Kind>,
) -> Diagnostic {
    let message = match found {
        Some(kind) => format!("expected '{}' to be a {}, but it is a {}", name, expected, kind),
        None => format!("expected '{}' to be a {}, but it is not declared", name, expected),
    };
    Diagnostic::error(code, message).with_context("reference", name)
}

/// Describe a broken specialization chain of a `kind` quantity
pub fn chain_diagnostic(
    name: &TypeName,
    kind: Kind,
    error: &ChainError,
    found: Option<Kind>,
) -> Diagnostic {
    match error {
        ChainError::Circular { repeated } => Diagnostic::error(
            CIRCULAR_SPECIALIZATION,
            format!(
                "the specialization chain of '{}' is circular, '{}' is reached twice",
                name, repeated
            ),
        )
        .with_context("repeated", repeated),
        ChainError::Unrecognized { missing } => match found {
            Some(other) if other != kind => Diagnostic::error(
                kind.mismatch_code(),
                format!(
                    "'{}' cannot specialize '{}', which is a {} rather than a {}",
                    name, missing, other, kind
                ),
            )
            .with_context("original", missing),
            _ => Diagnostic::error(
                UNRECOGNIZED_ORIGINAL_QUANTITY,
                format!(
                    "the specialization chain of '{}' references '{}', which is not a declared {}",
                    name, missing, kind
                ),
            )
            .with_context("original", missing),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitscape_diagnostics::SourceLocation;
    use unitscape_model::{InheritFlags, QuantityKind, RawScalar};

    fn unit(name: &str, line: usize) -> RawUnit {
        RawUnit {
            type_name: TypeName::new("Test", name),
            location: SourceLocation::new(line, 1),
            quantity: None,
            bias_term: line % 2 == 0,
            derivations: Vec::new(),
            instances: Vec::new(),
        }
    }

    fn scalar(name: &str, original: Option<&str>) -> RawScalar {
        let kind = match original {
            Some(original) => QuantityKind::Specialization {
                original: TypeName::new("Test", original),
                inherit: InheritFlags::default(),
            },
            None => QuantityKind::Base {
                unit: TypeName::new("Test", "Unit"),
                use_unit_bias: false,
            },
        };
        RawScalar {
            type_name: TypeName::new("Test", name),
            location: SourceLocation::default(),
            kind,
            properties: Default::default(),
            shape: Default::default(),
            facets: Default::default(),
        }
    }

    #[test]
    fn test_first_declaration_wins() {
        let (population, diagnostics) =
            Population::build(vec![unit("A", 1), unit("A", 2), unit("B", 3), unit("A", 4)])
                .into_parts();

        let name = TypeName::new("Test", "A");
        assert_eq!(population.len(), 2);
        assert_eq!(population.get(&name).map(|u| u.location.line), Some(1));
        assert_eq!(population.duplicates().get(&name).map(|u| u.location.line), Some(1));
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code == DUPLICATE_DEFINITION));
        assert_eq!(diagnostics[0].location.as_ref().map(|l| l.line), Some(2));
    }

    #[test]
    fn test_cross_kind_conflict() {
        let declarations = Declarations {
            units: vec![unit("Length", 1)],
            scalars: vec![scalar("Length", None), scalar("Time", None)],
            vectors: vec![],
        };

        let (declarations, diagnostics) = separate_kinds(declarations).into_parts();

        assert_eq!(declarations.units.len(), 1);
        assert_eq!(declarations.scalars.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, TYPE_ALREADY_DEFINED);
    }

    #[test]
    fn test_chain_and_bases() {
        let population = QuantityPopulation::build(
            Kind::Scalar,
            vec![scalar("C", Some("B")), scalar("B", Some("A")), scalar("A", None)],
        )
        .into_value();

        let chain = population.chain(&TypeName::new("Test", "C")).unwrap();
        let names: Vec<_> = chain.iter().map(|q| q.type_name.name()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
        assert_eq!(
            population
                .ultimate_base(&TypeName::new("Test", "C"))
                .map(|q| q.type_name.name()),
            Some("A")
        );
    }

    #[test]
    fn test_circular_chain_detected() {
        let population = QuantityPopulation::build(
            Kind::Scalar,
            vec![scalar("X", Some("Y")), scalar("Y", Some("X")), scalar("Z", Some("X"))],
        )
        .into_value();

        for name in ["X", "Y", "Z"] {
            let result = population.chain(&TypeName::new("Test", name));
            assert!(matches!(result, Err(ChainError::Circular { .. })), "{name}");
            assert!(population.ultimate_base(&TypeName::new("Test", name)).is_none());
        }
    }

    #[test]
    fn test_unrecognized_original() {
        let population =
            QuantityPopulation::build(Kind::Scalar, vec![scalar("B", Some("Missing"))]).into_value();

        assert_eq!(
            population.chain(&TypeName::new("Test", "B")),
            Err(ChainError::Unrecognized {
                missing: TypeName::new("Test", "Missing")
            })
        );
    }
}
