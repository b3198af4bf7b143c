//! Declaration manifests
//!
//! A manifest is a JSON document with optional `units`, `scalars` and
//! `vectors` arrays. Declarations that do not name their source file are
//! attributed to the manifest they were read from.

use std::fs;
use std::path::Path;
use unitscape_diagnostics::{Result, SourceLocation, UnitscapeError};
use unitscape_model::{Declarations, QuantityFacets};

/// Decode a manifest; `origin` names it in errors and locations
pub fn parse_manifest(content: &str, origin: &str) -> Result<Declarations> {
    let mut declarations: Declarations = serde_json::from_str(content)
        .map_err(|error| UnitscapeError::manifest(origin, error.to_string()))?;
    attribute(&mut declarations, origin);
    Ok(declarations)
}

/// Read and decode a manifest file
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Declarations> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    log::debug!("loading manifest {}", origin);

    let content = fs::read_to_string(path).map_err(|error| UnitscapeError::io(&origin, error))?;
    parse_manifest(&content, &origin)
}

/// Read several manifests into one set of declarations, in order
pub fn load_manifests<P: AsRef<Path>>(paths: &[P]) -> Result<Declarations> {
    let mut declarations = Declarations::default();
    for path in paths {
        declarations.extend(load_manifest(path)?);
    }
    Ok(declarations)
}

fn attribute(declarations: &mut Declarations, origin: &str) {
    let tag = |location: &mut SourceLocation| {
        if location.file.is_none() {
            location.file = Some(origin.to_string());
        }
    };

    for unit in &mut declarations.units {
        tag(&mut unit.location);
        unit.instances
            .iter_mut()
            .for_each(|instance| tag(&mut instance.location));
        unit.derivations
            .iter_mut()
            .for_each(|derivation| tag(&mut derivation.location));
    }
    for scalar in &mut declarations.scalars {
        tag(&mut scalar.location);
        attribute_facets(&mut scalar.facets, &tag);
    }
    for vector in &mut declarations.vectors {
        tag(&mut vector.location);
        attribute_facets(&mut vector.facets, &tag);
    }
}

/// Tag the positioned items of a quantity; items without a position are
/// reported at the quantity itself
fn attribute_facets(facets: &mut QuantityFacets, tag: &impl Fn(&mut SourceLocation)) {
    let QuantityFacets {
        constants,
        conversions,
        derivations,
        operations,
        processes,
        included_bases,
        excluded_bases,
        included_units,
        excluded_units,
    } = facets;

    let locations = constants
        .iter_mut()
        .map(|item| &mut item.location)
        .chain(conversions.iter_mut().map(|item| &mut item.location))
        .chain(derivations.iter_mut().map(|item| &mut item.location))
        .chain(operations.iter_mut().map(|item| &mut item.location))
        .chain(processes.iter_mut().map(|item| &mut item.location))
        .chain(
            [included_bases, excluded_bases, included_units, excluded_units]
                .into_iter()
                .filter_map(|list| list.as_mut().map(|list| &mut list.location)),
        );

    for location in locations.filter(|location| !location.is_unknown()) {
        tag(location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use unitscape_diagnostics::INVALID_MANIFEST;

    #[test]
    fn test_parse_attributes_origin() {
        let manifest = r#"{
            "units": [{
                "type_name": "Physics.UnitOfLength",
                "location": {"line": 3, "column": 5},
                "quantity": "Physics.Length",
                "instances": [{"name": "Metre", "plural": "Metres", "kind": "fixed"}]
            }],
            "scalars": [{
                "type_name": "Physics.Length",
                "location": {"file": "length.src", "line": 1, "column": 1},
                "kind": {"base": {"unit": "Physics.UnitOfLength"}}
            }],
            "vectors": [{
                "type_name": "Physics.Displacement",
                "location": {"line": 9, "column": 1},
                "kind": {"base": {"unit": "Physics.UnitOfLength"}},
                "facets": {
                    "processes": [
                        {"name": "Doubled", "expression": "2 * value", "location": {"line": 12, "column": 9}},
                        {"name": "Halved", "expression": "value / 2"}
                    ],
                    "excluded_units": {"names": ["Metre"], "location": {"line": 14, "column": 9}}
                }
            }]
        }"#;

        let declarations = parse_manifest(manifest, "physics.json").unwrap();

        assert_eq!(
            declarations.units[0].location,
            SourceLocation::new(3, 5).in_file("physics.json")
        );
        assert_eq!(
            declarations.units[0].instances[0].location.file.as_deref(),
            Some("physics.json")
        );
        assert_eq!(
            declarations.scalars[0].location.file.as_deref(),
            Some("length.src")
        );

        let facets = &declarations.vectors[0].facets;
        assert_eq!(
            facets.processes[0].location,
            SourceLocation::new(12, 9).in_file("physics.json")
        );
        assert!(facets.processes[1].location.is_unknown());
        assert_eq!(
            facets.excluded_units.as_ref().map(|list| list.location.clone()),
            Some(SourceLocation::new(14, 9).in_file("physics.json"))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_manifest() {
        let error = parse_manifest(r#"{"units": [{"quantity": 1}]}"#, "broken.json").unwrap_err();

        assert_eq!(error.code(), INVALID_MANIFEST);
        assert!(error.to_string().contains("broken.json"));
    }
}
