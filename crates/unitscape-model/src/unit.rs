//! Unit declarations and unit instances

use crate::{Declared, Signature, TypeName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use unitscape_diagnostics::SourceLocation;

/// A unit as declared, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUnit {
    pub type_name: TypeName,
    #[serde(default)]
    pub location: SourceLocation,
    /// Scalar quantity described by the unit
    #[serde(default)]
    pub quantity: Option<TypeName>,
    /// Whether instances of the unit may carry a bias (e.g. temperature)
    #[serde(default)]
    pub bias_term: bool,
    #[serde(default)]
    pub derivations: Vec<RawDerivationSignature>,
    #[serde(default)]
    pub instances: Vec<RawUnitInstance>,
}

impl Declared for RawUnit {
    fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

/// A declared way of deriving a unit from other units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDerivationSignature {
    #[serde(default)]
    pub id: Option<String>,
    /// Expression referencing the signature elements as `{0}`, `{1}`, ...
    pub expression: String,
    pub signature: Signature,
    #[serde(default)]
    pub location: SourceLocation,
}

/// A declared named instance of a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUnitInstance {
    pub name: String,
    pub plural: String,
    #[serde(flatten)]
    pub kind: UnitInstanceKind,
    #[serde(default)]
    pub location: SourceLocation,
}

/// How a unit instance is defined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitInstanceKind {
    /// Defined directly by a value
    Fixed,
    /// Another name for an existing instance
    Alias { of: String },
    /// An existing instance scaled by a factor
    Scaled { of: String, scale: Coefficient },
    /// An existing instance with a metric or binary prefix
    Prefixed { of: String, prefix: Prefix },
    /// An existing instance offset by a bias
    Biased { of: String, bias: Coefficient },
    /// Derived from instances of other units through a derivation signature
    Derived {
        #[serde(default)]
        derivation: Option<String>,
        units: Vec<String>,
    },
}

impl UnitInstanceKind {
    /// Name of the instance of the same unit this instance is defined in terms of
    pub fn dependency(&self) -> Option<&str> {
        match self {
            Self::Alias { of }
            | Self::Scaled { of, .. }
            | Self::Prefixed { of, .. }
            | Self::Biased { of, .. } => Some(of),
            Self::Fixed | Self::Derived { .. } => None,
        }
    }

    /// Short description used in messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Alias { .. } => "alias",
            Self::Scaled { .. } => "scaled",
            Self::Prefixed { .. } => "prefixed",
            Self::Biased { .. } => "biased",
            Self::Derived { .. } => "derived",
        }
    }
}

/// A literal value or an expression evaluated by the consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coefficient {
    Value(f64),
    Expression(String),
}

/// Prefix applied to a unit instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prefix {
    Metric(MetricPrefix),
    Binary(BinaryPrefix),
}

impl Prefix {
    /// Scale factor represented by the prefix
    pub fn factor(self) -> f64 {
        match self {
            Self::Metric(prefix) => 10f64.powi(prefix.exponent()),
            Self::Binary(prefix) => 1024f64.powi(prefix.exponent()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricPrefix {
    Quetta,
    Ronna,
    Yotta,
    Zetta,
    Exa,
    Peta,
    Tera,
    Giga,
    Mega,
    Kilo,
    Hecto,
    Deca,
    Deci,
    Centi,
    Milli,
    Micro,
    Nano,
    Pico,
    Femto,
    Atto,
    Zepto,
    Yocto,
    Ronto,
    Quecto,
}

impl MetricPrefix {
    /// Power of ten
    pub const fn exponent(self) -> i32 {
        match self {
            Self::Quetta => 30,
            Self::Ronna => 27,
            Self::Yotta => 24,
            Self::Zetta => 21,
            Self::Exa => 18,
            Self::Peta => 15,
            Self::Tera => 12,
            Self::Giga => 9,
            Self::Mega => 6,
            Self::Kilo => 3,
            Self::Hecto => 2,
            Self::Deca => 1,
            Self::Deci => -1,
            Self::Centi => -2,
            Self::Milli => -3,
            Self::Micro => -6,
            Self::Nano => -9,
            Self::Pico => -12,
            Self::Femto => -15,
            Self::Atto => -18,
            Self::Zepto => -21,
            Self::Yocto => -24,
            Self::Ronto => -27,
            Self::Quecto => -30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryPrefix {
    Kibi,
    Mebi,
    Gibi,
    Tebi,
    Pebi,
    Exbi,
    Zebi,
    Yobi,
}

impl BinaryPrefix {
    /// Power of 1024
    pub const fn exponent(self) -> i32 {
        match self {
            Self::Kibi => 1,
            Self::Mebi => 2,
            Self::Gibi => 3,
            Self::Tebi => 4,
            Self::Pebi => 5,
            Self::Exbi => 6,
            Self::Zebi => 7,
            Self::Yobi => 8,
        }
    }
}

/// A validated derivation signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationSignature {
    pub id: String,
    pub expression: String,
    pub signature: Signature,
}

impl DerivationSignature {
    pub fn arity(&self) -> usize {
        self.signature.len()
    }
}

/// A unit instance whose dependency chain has been resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInstance {
    pub name: String,
    pub plural: String,
    #[serde(flatten)]
    pub kind: UnitInstanceKind,
}

/// A validated unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub type_name: TypeName,
    #[serde(default)]
    pub location: SourceLocation,
    pub quantity: TypeName,
    pub bias_term: bool,
    /// Derivation signatures keyed by ID
    pub derivations: IndexMap<String, DerivationSignature>,
    /// Resolved instances keyed by name, in declaration order
    pub instances: IndexMap<String, UnitInstance>,
}

impl UnitType {
    pub fn instance(&self, name: &str) -> Option<&UnitInstance> {
        self.instances.get(name)
    }

    pub fn has_instance(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }
}

impl Declared for UnitType {
    fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    fn location(&self) -> &SourceLocation {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_instance_kinds_from_json() {
        let json = r#"[
            {"name": "Metre", "plural": "Metres", "kind": "fixed"},
            {"name": "Kilometre", "plural": "Kilometres", "kind": "prefixed", "of": "Metre", "prefix": {"metric": "kilo"}},
            {"name": "Foot", "plural": "Feet", "kind": "scaled", "of": "Metre", "scale": 0.3048},
            {"name": "Yard", "plural": "Yards", "kind": "scaled", "of": "Foot", "scale": "3 * 1"},
            {"name": "MetrePerSecond", "plural": "MetresPerSecond", "kind": "derived", "units": ["Metre", "Second"]}
        ]"#;

        let instances: Vec<RawUnitInstance> = serde_json::from_str(json).unwrap();

        assert_eq!(instances[0].kind, UnitInstanceKind::Fixed);
        assert_eq!(
            instances[1].kind,
            UnitInstanceKind::Prefixed {
                of: "Metre".into(),
                prefix: Prefix::Metric(MetricPrefix::Kilo)
            }
        );
        assert_eq!(
            instances[3].kind,
            UnitInstanceKind::Scaled {
                of: "Foot".into(),
                scale: Coefficient::Expression("3 * 1".into())
            }
        );
        assert_eq!(instances[4].kind.dependency(), None);
        assert_eq!(instances[2].kind.dependency(), Some("Metre"));
    }

    #[test]
    fn test_prefix_factor() {
        assert_eq!(Prefix::Metric(MetricPrefix::Kilo).factor(), 1000.0);
        assert_eq!(Prefix::Binary(BinaryPrefix::Kibi).factor(), 1024.0);
        assert!((Prefix::Metric(MetricPrefix::Milli).factor() - 0.001).abs() < 1e-12);
    }
}
