//! Scalar and vector quantity declarations

use crate::{Declared, Signature, TypeName};
use serde::{Deserialize, Serialize};
use unitscape_diagnostics::SourceLocation;

/// A quantity as declared, before validation
///
/// `S` carries what differs between scalars and vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize",
    deserialize = "S: Deserialize<'de> + Default"
))]
pub struct RawQuantity<S> {
    pub type_name: TypeName,
    #[serde(default)]
    pub location: SourceLocation,
    pub kind: QuantityKind,
    #[serde(default)]
    pub properties: QuantityProperties,
    #[serde(default)]
    pub shape: S,
    #[serde(default)]
    pub facets: QuantityFacets,
}

pub type RawScalar = RawQuantity<ScalarShape>;
pub type RawVector = RawQuantity<VectorShape>;

impl<S> RawQuantity<S> {
    /// The quantity this one specializes, if any
    pub fn original(&self) -> Option<&TypeName> {
        match &self.kind {
            QuantityKind::Base { .. } => None,
            QuantityKind::Specialization { original, .. } => Some(original),
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self.kind, QuantityKind::Base { .. })
    }
}

impl<S> Declared for RawQuantity<S> {
    fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

/// Whether a quantity is a root of a chain or specializes another quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    Base {
        unit: TypeName,
        #[serde(default)]
        use_unit_bias: bool,
    },
    Specialization {
        original: TypeName,
        #[serde(default)]
        inherit: InheritFlags,
    },
}

/// Which facets a specialization inherits from its original quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct InheritFlags {
    pub derivations: bool,
    pub constants: bool,
    pub conversions: bool,
    pub bases: bool,
    pub units: bool,
    pub operations: bool,
    pub processes: bool,
}

impl InheritFlags {
    /// Inherit nothing; how a base quantity behaves
    pub const NONE: Self = Self {
        derivations: false,
        constants: false,
        conversions: false,
        bases: false,
        units: false,
        operations: false,
        processes: false,
    };
}

impl Default for InheritFlags {
    fn default() -> Self {
        Self {
            derivations: true,
            constants: true,
            conversions: true,
            bases: true,
            units: true,
            operations: true,
            processes: true,
        }
    }
}

/// Single-value properties, inherited from the nearest ancestor that sets them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityProperties {
    pub default_unit: Option<String>,
    pub default_symbol: Option<String>,
    pub implement_sum: Option<bool>,
    pub implement_difference: Option<bool>,
    /// Quantity representing the difference of two instances
    pub difference: Option<TypeName>,
}

/// Scalar-specific related quantities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarShape {
    /// Vector quantity with this scalar as its magnitude
    pub vector: Option<TypeName>,
    pub reciprocal: Option<TypeName>,
    pub square: Option<TypeName>,
    pub cube: Option<TypeName>,
    pub square_root: Option<TypeName>,
    pub cube_root: Option<TypeName>,
}

/// Vector-specific properties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorShape {
    /// Number of components; required on base vectors
    pub dimension: Option<u32>,
    /// Scalar quantity describing the magnitude
    pub scalar: Option<TypeName>,
}

/// Inheritable list facets of a quantity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityFacets {
    pub constants: Vec<Constant>,
    pub conversions: Vec<Conversion>,
    pub derivations: Vec<QuantityDerivation>,
    pub operations: Vec<QuantityOperation>,
    pub processes: Vec<QuantityProcess>,
    pub included_bases: Option<UnitList>,
    pub excluded_bases: Option<UnitList>,
    pub included_units: Option<UnitList>,
    pub excluded_units: Option<UnitList>,
}

/// A named constant expressed in one of the instances of the quantity's unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    /// Unit instance the value is expressed in
    pub unit: String,
    pub value: ConstantValue,
    /// Plural name for expressing quantities as multiples of the constant
    #[serde(default)]
    pub multiples: Option<String>,
    #[serde(default)]
    pub location: SourceLocation,
}

/// Magnitude of a scalar constant or the components of a vector constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Scalar(f64),
    Components(Vec<f64>),
}

impl ConstantValue {
    pub fn components(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Components(components) => components.len(),
        }
    }
}

/// Quantities an instance can be converted to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub quantities: Vec<TypeName>,
    #[serde(default)]
    pub location: SourceLocation,
}

/// A way of computing the quantity from other quantities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityDerivation {
    /// Expression referencing the signature elements as `{0}`, `{1}`, ...
    pub expression: String,
    pub signature: Signature,
    #[serde(default)]
    pub location: SourceLocation,
}

/// A binary operation producing another quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityOperation {
    pub result: TypeName,
    pub other: TypeName,
    pub operator: OperatorKind,
    #[serde(default)]
    pub position: OperatorPosition,
    /// Also implement the operation on `other`
    #[serde(default)]
    pub mirror: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

impl QuantityOperation {
    /// Identity of the operation, ignoring where it was declared
    pub fn signature(&self) -> (&TypeName, &TypeName, OperatorKind, OperatorPosition) {
        (&self.result, &self.other, self.operator, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Dot,
    Cross,
}

/// Side of the operator the declaring quantity appears on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorPosition {
    #[default]
    Left,
    Right,
}

/// A named process, computed by an expression over the quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityProcess {
    pub name: String,
    pub expression: String,
    #[serde(default)]
    pub location: SourceLocation,
}

/// A list of unit instance names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitList {
    pub names: Vec<String>,
    #[serde(default)]
    pub location: SourceLocation,
}

impl UnitList {
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            location: SourceLocation::default(),
        }
    }
}
