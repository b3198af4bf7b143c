//! Vector quantities

use unitscape_diagnostics::{
    Diagnostic, INVALID_VECTOR_DIMENSION, MISSING_REQUIRED_PROPERTY, Outcome,
    VECTOR_UNEXPECTED_DIMENSION,
};
use unitscape_model::{RawVector, VectorForm, VectorShape};

use crate::population::{DeclaredTypes, Kind};
use crate::quantities::{Shape, Site, checked_reference};

/// Smallest number of components of a vector
pub const MIN_DIMENSION: u32 = 2;

impl Shape for VectorShape {
    type Resolved = VectorForm;

    const KIND: Kind = Kind::Vector;

    fn validate(
        raw: &RawVector,
        base: &RawVector,
        declared: &DeclaredTypes<'_>,
        site: &Site<'_>,
    ) -> Outcome<Self> {
        let mut diagnostics = Vec::new();
        let scalar =
            checked_reference(&raw.shape.scalar, Kind::Scalar, declared, site, &mut diagnostics);

        let dimension = if raw.is_base() {
            match raw.shape.dimension {
                None => {
                    return Outcome::empty(site.at(
                        Diagnostic::error(
                            MISSING_REQUIRED_PROPERTY,
                            format!("vector '{}' does not state its dimension", raw.type_name),
                        )
                        .with_context("property", "dimension"),
                    ));
                }
                Some(dimension) if dimension < MIN_DIMENSION => {
                    return Outcome::empty(site.at(Diagnostic::error(
                        INVALID_VECTOR_DIMENSION,
                        format!(
                            "vector '{}' has dimension {}, at least {} is required",
                            raw.type_name, dimension, MIN_DIMENSION
                        ),
                    )));
                }
                dimension => dimension,
            }
        } else {
            match (raw.shape.dimension, base.shape.dimension) {
                (Some(stated), Some(expected)) if stated != expected => {
                    diagnostics.push(site.at(
                        Diagnostic::warning(
                            VECTOR_UNEXPECTED_DIMENSION,
                            format!(
                                "'{}' states dimension {}, but its base '{}' has dimension {}",
                                raw.type_name, stated, base.type_name, expected
                            ),
                        )
                        .with_context("expected", expected),
                    ));
                    None
                }
                (stated, _) => stated,
            }
        };

        Outcome::with_diagnostics(VectorShape { dimension, scalar }, diagnostics)
    }

    fn resolve(levels: &[&Self]) -> Self::Resolved {
        VectorForm {
            dimension: levels
                .last()
                .and_then(|base| base.dimension)
                .unwrap_or(MIN_DIMENSION),
            scalar: levels.iter().find_map(|level| level.scalar.clone()),
        }
    }

    fn components(base: &Self) -> Option<usize> {
        base.dimension.map(|dimension| dimension as usize)
    }
}
