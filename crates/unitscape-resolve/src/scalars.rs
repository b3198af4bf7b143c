//! Scalar quantities

use unitscape_diagnostics::Outcome;
use unitscape_model::{RawScalar, ScalarShape, TypeName};

use crate::population::{DeclaredTypes, Kind};
use crate::quantities::{Shape, Site, checked_reference};

impl Shape for ScalarShape {
    type Resolved = ScalarShape;

    const KIND: Kind = Kind::Scalar;

    fn validate(
        raw: &RawScalar,
        _base: &RawScalar,
        declared: &DeclaredTypes<'_>,
        site: &Site<'_>,
    ) -> Outcome<Self> {
        let shape = &raw.shape;
        let mut diagnostics = Vec::new();
        let vector =
            checked_reference(&shape.vector, Kind::Vector, declared, site, &mut diagnostics);
        let mut scalar = |reference: &Option<TypeName>| {
            checked_reference(reference, Kind::Scalar, declared, site, &mut diagnostics)
        };

        let validated = ScalarShape {
            vector,
            reciprocal: scalar(&shape.reciprocal),
            square: scalar(&shape.square),
            cube: scalar(&shape.cube),
            square_root: scalar(&shape.square_root),
            cube_root: scalar(&shape.cube_root),
        };

        Outcome::with_diagnostics(validated, diagnostics)
    }

    fn resolve(levels: &[&Self]) -> Self::Resolved {
        ScalarShape {
            vector: nearest(levels, |shape| &shape.vector),
            reciprocal: nearest(levels, |shape| &shape.reciprocal),
            square: nearest(levels, |shape| &shape.square),
            cube: nearest(levels, |shape| &shape.cube),
            square_root: nearest(levels, |shape| &shape.square_root),
            cube_root: nearest(levels, |shape| &shape.cube_root),
        }
    }

    fn components(_base: &Self) -> Option<usize> {
        Some(1)
    }
}

fn nearest<T: Clone>(
    levels: &[&ScalarShape],
    property: impl Fn(&ScalarShape) -> &Option<T>,
) -> Option<T> {
    levels.iter().find_map(|level| property(level).clone())
}
