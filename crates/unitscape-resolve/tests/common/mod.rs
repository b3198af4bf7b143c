//! Declaration builders
//!
//! Every type lives in the `Test` namespace.

#![allow(dead_code)]

use unitscape_diagnostics::{ErrorCode, SourceLocation};
use unitscape_model::{
    Coefficient, Constant, ConstantValue, InheritFlags, MetricPrefix, Prefix, QuantityFacets, QuantityKind,
    QuantityProcess, RawDerivationSignature, RawQuantity, RawScalar, RawUnit, RawUnitInstance,
    RawVector, Signature, TypeName, UnitInstanceKind, UnitList, VectorShape,
};
use unitscape_resolve::Resolution;

pub fn name(name: &str) -> TypeName {
    TypeName::new("Test", name)
}

pub fn at(line: usize) -> SourceLocation {
    SourceLocation::new(line, 1)
}

// === Unit instances ===

fn instance(name: &str, plural: &str, kind: UnitInstanceKind) -> RawUnitInstance {
    RawUnitInstance {
        name: name.to_string(),
        plural: plural.to_string(),
        kind,
        location: SourceLocation::default(),
    }
}

pub fn fixed(name: &str) -> RawUnitInstance {
    instance(name, &format!("{name}s"), UnitInstanceKind::Fixed)
}

pub fn alias(name: &str, of: &str) -> RawUnitInstance {
    instance(name, &format!("{name}s"), UnitInstanceKind::Alias { of: of.into() })
}

pub fn scaled(name: &str, of: &str, scale: f64) -> RawUnitInstance {
    instance(
        name,
        &format!("{name}s"),
        UnitInstanceKind::Scaled {
            of: of.into(),
            scale: Coefficient::Value(scale),
        },
    )
}

pub fn kilo(name: &str, of: &str) -> RawUnitInstance {
    instance(
        name,
        &format!("{name}s"),
        UnitInstanceKind::Prefixed {
            of: of.into(),
            prefix: Prefix::Metric(MetricPrefix::Kilo),
        },
    )
}

pub fn derived(name: &str, plural: &str, units: &[&str]) -> RawUnitInstance {
    instance(
        name,
        plural,
        UnitInstanceKind::Derived {
            derivation: None,
            units: units.iter().map(|unit| unit.to_string()).collect(),
        },
    )
}

// === Units ===

pub fn unit(type_name: &str, quantity: &str, instances: Vec<RawUnitInstance>) -> RawUnit {
    RawUnit {
        type_name: name(type_name),
        location: SourceLocation::default(),
        quantity: Some(name(quantity)),
        bias_term: false,
        derivations: Vec::new(),
        instances,
    }
}

pub fn derivation(expression: &str, signature: &[&str]) -> RawDerivationSignature {
    RawDerivationSignature {
        id: None,
        expression: expression.to_string(),
        signature: signature.iter().map(|element| name(element)).collect::<Signature>(),
        location: SourceLocation::default(),
    }
}

// === Quantities ===

fn quantity<S: Default>(type_name: &str, kind: QuantityKind) -> RawQuantity<S> {
    RawQuantity {
        type_name: name(type_name),
        location: SourceLocation::default(),
        kind,
        properties: Default::default(),
        shape: S::default(),
        facets: QuantityFacets::default(),
    }
}

pub fn base_scalar(type_name: &str, unit: &str) -> RawScalar {
    quantity(
        type_name,
        QuantityKind::Base {
            unit: name(unit),
            use_unit_bias: false,
        },
    )
}

pub fn specialized_scalar(type_name: &str, original: &str, inherit: InheritFlags) -> RawScalar {
    quantity(
        type_name,
        QuantityKind::Specialization {
            original: name(original),
            inherit,
        },
    )
}

pub fn base_vector(type_name: &str, unit: &str, dimension: u32) -> RawVector {
    let mut vector: RawVector = quantity(
        type_name,
        QuantityKind::Base {
            unit: name(unit),
            use_unit_bias: false,
        },
    );
    vector.shape = VectorShape {
        dimension: Some(dimension),
        scalar: None,
    };
    vector
}

pub fn specialized_vector(type_name: &str, original: &str, dimension: Option<u32>) -> RawVector {
    let mut vector: RawVector = quantity(
        type_name,
        QuantityKind::Specialization {
            original: name(original),
            inherit: InheritFlags::default(),
        },
    );
    vector.shape.dimension = dimension;
    vector
}

pub fn process(name: &str) -> QuantityProcess {
    QuantityProcess {
        name: name.to_string(),
        expression: "value".to_string(),
        location: SourceLocation::default(),
    }
}

pub fn constant(name: &str, unit: &str) -> Constant {
    Constant {
        name: name.to_string(),
        unit: unit.to_string(),
        value: ConstantValue::Scalar(1.0),
        multiples: None,
        location: SourceLocation::default(),
    }
}

pub fn list(names: &[&str]) -> Option<UnitList> {
    Some(UnitList::new(names.iter().copied()))
}

// === Assertions ===

pub fn codes(resolution: &Resolution) -> Vec<ErrorCode> {
    resolution
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.code)
        .collect()
}
