//! Fully resolved quantity definitions

use crate::{
    Constant, Declared, QuantityDerivation, QuantityOperation, QuantityProcess, ScalarShape,
    TypeName,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use unitscape_diagnostics::SourceLocation;

/// A quantity with every inheritable facet materialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedQuantity<S> {
    pub type_name: TypeName,
    #[serde(default)]
    pub location: SourceLocation,
    /// Quantity this one specializes
    pub original: Option<TypeName>,
    /// Root of the specialization chain
    pub base: TypeName,
    pub unit: TypeName,
    pub use_unit_bias: bool,
    pub default_unit: Option<String>,
    pub default_symbol: Option<String>,
    pub implement_sum: bool,
    pub implement_difference: bool,
    /// Quantity representing a difference; the quantity itself unless overridden
    pub difference: Option<TypeName>,
    pub shape: S,
    pub constants: Vec<Constant>,
    pub conversions: Vec<TypeName>,
    pub derivations: Vec<QuantityDerivation>,
    pub operations: Vec<QuantityOperation>,
    pub processes: Vec<QuantityProcess>,
    /// Unit instances exposed as base values
    pub included_bases: IndexSet<String>,
    /// Unit instances the quantity can be expressed in
    pub included_units: IndexSet<String>,
}

pub type ScalarType = ResolvedQuantity<ScalarShape>;
pub type VectorType = ResolvedQuantity<VectorForm>;

impl<S> Declared for ResolvedQuantity<S> {
    fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

/// Resolved vector properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorForm {
    pub dimension: u32,
    pub scalar: Option<TypeName>,
}
