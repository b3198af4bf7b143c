//! End-to-end resolution tests
//!
//! Covers the behaviour of a full resolution run:
//! - Duplicate and cross-kind declarations
//! - Unit instance graphs and derivation signatures
//! - Inheritance along specialization chains
//! - Inclusion and exclusion of unit instances
//! - Broken chains and determinism

mod common;

use common::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use unitscape_diagnostics::{
    CONTRADICTORY_ATTRIBUTES, DUPLICATE_DEFINITION, ErrorCode, INCLUSION_OR_EXCLUSION_HAD_NO_EFFECT,
    INVALID_VECTOR_DIMENSION, MISSING_REQUIRED_PROPERTY, Severity, TYPE_ALREADY_DEFINED,
    TYPE_NOT_SCALAR, UNRECOGNIZED_ORIGINAL_QUANTITY, UNRECOGNIZED_UNIT_INSTANCE_NAME,
    UNRESOLVABLE_UNIT_INSTANCE, VECTOR_UNEXPECTED_DIMENSION,
};
use unitscape_model::{
    Constant, ConstantValue, Declarations, InheritFlags, OperatorKind, QuantityDerivation,
    QuantityOperation, RawScalar, TypeName,
};
use unitscape_resolve::{Resolution, ResolveOptions, Resolver, resolve};

fn sequential(declarations: Declarations) -> Resolution {
    Resolver::with_options(ResolveOptions { parallel: false }).resolve(declarations)
}

fn length_time_speed() -> Declarations {
    let mut speed_unit = unit(
        "UnitOfSpeed",
        "Speed",
        vec![
            derived("MetrePerSecond", "MetresPerSecond", &["Metre", "Second"]),
            derived("KilometrePerSecond", "KilometresPerSecond", &["Kilometre", "Second"]),
        ],
    );
    speed_unit.derivations = vec![derivation("{0} / {1}", &["UnitOfLength", "UnitOfTime"])];

    let mut length = base_scalar("Length", "UnitOfLength");
    length.properties.default_unit = Some("Metre".into());
    length.facets.operations.push(QuantityOperation {
        result: name("Speed"),
        other: name("Time"),
        operator: OperatorKind::Division,
        position: Default::default(),
        mirror: false,
        location: Default::default(),
    });

    let mut speed = base_scalar("Speed", "UnitOfSpeed");
    speed.facets.derivations.push(QuantityDerivation {
        expression: "{0} / {1}".into(),
        signature: [name("Length"), name("Time")].into_iter().collect(),
        location: Default::default(),
    });

    Declarations {
        units: vec![
            unit(
                "UnitOfLength",
                "Length",
                vec![fixed("Metre"), kilo("Kilometre", "Metre")],
            ),
            unit(
                "UnitOfTime",
                "Time",
                vec![fixed("Second"), scaled("Minute", "Second", 60.0)],
            ),
            speed_unit,
        ],
        scalars: vec![length, base_scalar("Time", "UnitOfTime"), speed],
        vectors: vec![],
    }
}

// === Scenarios ===

#[test]
fn test_length_time_speed_resolves_cleanly() {
    let resolution = resolve(length_time_speed());

    assert_eq!(resolution.diagnostics, vec![]);
    assert_eq!(resolution.units.len(), 3);
    assert_eq!(resolution.scalars.len(), 3);

    let speed = resolution.scalars.get(&name("Speed")).unwrap();
    let units: Vec<&str> = speed.included_units.iter().map(String::as_str).collect();
    assert_eq!(units, vec!["MetrePerSecond", "KilometrePerSecond"]);
    assert_eq!(speed.derivations.len(), 1);
    assert_eq!(speed.difference, Some(name("Speed")));
    assert!(speed.implement_sum);

    let length = resolution.scalars.get(&name("Length")).unwrap();
    assert_eq!(length.default_unit.as_deref(), Some("Metre"));
    assert_eq!(length.operations.len(), 1);

    let speed_unit = resolution.units.get(&name("UnitOfSpeed")).unwrap();
    assert_eq!(speed_unit.derivations.keys().collect::<Vec<_>>(), vec!["default"]);
}

#[test]
fn test_duplicate_declaration_keeps_first() {
    let mut declarations = length_time_speed();
    declarations.units.push(unit("UnitOfTime", "Time", vec![fixed("Hour")]));

    let resolution = resolve(declarations);

    assert_eq!(codes(&resolution), vec![DUPLICATE_DEFINITION]);
    let time = resolution.units.get(&name("UnitOfTime")).unwrap();
    assert!(time.has_instance("Second"));
    assert!(!time.has_instance("Hour"));
}

#[test]
fn test_identity_declared_as_two_kinds() {
    let mut declarations = length_time_speed();
    declarations.vectors.push(base_vector("Length", "UnitOfLength", 3));

    let resolution = resolve(declarations);

    assert_eq!(codes(&resolution), vec![TYPE_ALREADY_DEFINED]);
    assert!(resolution.scalars.contains(&name("Length")));
    assert!(resolution.vectors.is_empty());
}

#[test]
fn test_unit_must_describe_a_scalar() {
    let mut declarations = length_time_speed();
    declarations
        .units
        .push(unit("UnitOfNothing", "Nothing", vec![fixed("Nil")]));

    let resolution = resolve(declarations);

    assert_eq!(codes(&resolution), vec![TYPE_NOT_SCALAR]);
    assert!(!resolution.units.contains(&name("UnitOfNothing")));
    assert_eq!(resolution.scalars.len(), 3);
}

#[test]
fn test_cyclic_instances_are_dropped_idempotently() {
    let declarations = Declarations {
        units: vec![unit(
            "UnitOfLength",
            "Length",
            vec![fixed("Metre"), alias("X", "Y"), alias("Y", "X")],
        )],
        scalars: vec![base_scalar("Length", "UnitOfLength")],
        vectors: vec![],
    };

    let first = resolve(declarations.clone());
    let second = resolve(declarations);

    assert_eq!(
        codes(&first),
        vec![UNRESOLVABLE_UNIT_INSTANCE, UNRESOLVABLE_UNIT_INSTANCE]
    );
    assert_eq!(first.diagnostics, second.diagnostics);
    let length = first.units.get(&name("UnitOfLength")).unwrap();
    assert_eq!(length.instances.keys().collect::<Vec<_>>(), vec!["Metre"]);
}

#[rstest]
#[case(&["Metre", "Second"], true)]
#[case(&["Second", "Metre"], false)]
#[case(&["Metre", "Minute"], true)]
#[case(&["Metre", "Metre"], false)]
fn test_derived_instance_matches_signature(#[case] units: &[&str], #[case] valid: bool) {
    let mut declarations = length_time_speed();
    declarations.units[2].instances = vec![derived("Derived", "Deriveds", units)];

    let resolution = resolve(declarations);
    let speed_unit = resolution.units.get(&name("UnitOfSpeed")).unwrap();

    assert_eq!(speed_unit.has_instance("Derived"), valid);
    if valid {
        assert!(codes(&resolution)
            .iter()
            .all(|code| *code != UNRECOGNIZED_UNIT_INSTANCE_NAME));
    } else {
        let diagnostic = resolution
            .diagnostics
            .iter()
            .find(|diagnostic| diagnostic.code == UNRECOGNIZED_UNIT_INSTANCE_NAME)
            .unwrap();
        assert!(diagnostic.code.is_referential());
        assert_eq!(diagnostic.context.get("instance").map(String::as_str), Some("Derived"));
    }
}

#[test]
fn test_derived_instance_reports_each_position() {
    let mut declarations = length_time_speed();
    declarations.units[2].instances =
        vec![derived("Backwards", "Backwards", &["Second", "Metre"])];

    let resolution = resolve(declarations);

    let positions: Vec<&str> = resolution
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.code == UNRECOGNIZED_UNIT_INSTANCE_NAME)
        .filter_map(|diagnostic| diagnostic.context.get("position"))
        .map(String::as_str)
        .collect();
    assert_eq!(positions, vec!["0", "1"]);
}

#[test]
fn test_derived_instance_needs_resolvable_argument() {
    let mut declarations = length_time_speed();
    declarations.units[0].instances.push(alias("Furlong", "Chain"));
    declarations.units[2].instances = vec![
        derived("FurlongPerSecond", "FurlongsPerSecond", &["Furlong", "Second"]),
        derived("KilometrePerMinute", "KilometresPerMinute", &["Kilometre", "Minute"]),
    ];

    let resolution = resolve(declarations);

    let length = resolution.units.get(&name("UnitOfLength")).unwrap();
    assert!(!length.has_instance("Furlong"));
    let speed_unit = resolution.units.get(&name("UnitOfSpeed")).unwrap();
    assert_eq!(
        speed_unit.instances.keys().collect::<Vec<_>>(),
        vec!["KilometrePerMinute"]
    );

    let unresolved: Vec<&str> = resolution
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.code == UNRECOGNIZED_UNIT_INSTANCE_NAME)
        .filter_map(|diagnostic| diagnostic.context.get("instance"))
        .map(String::as_str)
        .collect();
    assert_eq!(unresolved, vec!["FurlongPerSecond"]);
    assert!(codes(&resolution).contains(&UNRESOLVABLE_UNIT_INSTANCE));
}

#[test]
fn test_derived_instance_may_use_derived_instance() {
    let mut declarations = length_time_speed();
    let mut acceleration = unit(
        "UnitOfAcceleration",
        "Acceleration",
        vec![derived(
            "MetrePerSecondSquared",
            "MetresPerSecondSquared",
            &["MetrePerSecond", "Second"],
        )],
    );
    acceleration.derivations = vec![derivation("{0} / {1}", &["UnitOfSpeed", "UnitOfTime"])];
    declarations.units.push(acceleration);
    declarations
        .scalars
        .push(base_scalar("Acceleration", "UnitOfAcceleration"));

    let resolution = resolve(declarations);

    assert_eq!(resolution.diagnostics, vec![]);
    let acceleration = resolution.units.get(&name("UnitOfAcceleration")).unwrap();
    assert!(acceleration.has_instance("MetrePerSecondSquared"));
}

// === Inheritance ===

fn chain(b_inherits: bool) -> Declarations {
    let mut a = base_scalar("A", "UnitOfA");
    a.facets.processes.push(process("FromA"));
    a.facets.constants.push(constant("KA", "Unity"));

    let mut b = specialized_scalar(
        "B",
        "A",
        InheritFlags {
            processes: b_inherits,
            constants: b_inherits,
            ..InheritFlags::default()
        },
    );
    b.facets.processes.push(process("FromB"));
    b.facets.constants.push(constant("KB", "Unity"));
    b.properties.default_symbol = Some("b".into());

    let mut c = specialized_scalar("C", "B", InheritFlags::default());
    c.facets.processes.push(process("FromC"));
    c.facets.constants.push(constant("KC", "Unity"));

    Declarations {
        units: vec![unit("UnitOfA", "A", vec![fixed("Unity")])],
        scalars: vec![a, b, c],
        vectors: vec![],
    }
}

fn process_names(resolution: &Resolution, quantity: &str) -> Vec<String> {
    resolution
        .scalars
        .get(&name(quantity))
        .map(|scalar| scalar.processes.iter().map(|p| p.name.clone()).collect())
        .unwrap_or_default()
}

fn constant_names(resolution: &Resolution, quantity: &str) -> Vec<String> {
    resolution
        .scalars
        .get(&name(quantity))
        .map(|scalar| scalar.constants.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default()
}

#[rstest]
#[case(true, vec!["FromA", "FromB"], vec!["FromA", "FromB", "FromC"])]
#[case(false, vec!["FromB"], vec!["FromB", "FromC"])]
fn test_three_level_chain(
    #[case] b_inherits: bool,
    #[case] expected_b: Vec<&str>,
    #[case] expected_c: Vec<&str>,
) {
    let resolution = resolve(chain(b_inherits));

    assert_eq!(resolution.diagnostics, vec![]);
    assert_eq!(process_names(&resolution, "A"), vec!["FromA"]);
    assert_eq!(process_names(&resolution, "B"), expected_b);
    assert_eq!(process_names(&resolution, "C"), expected_c);

    let constants = |processes: &[&str]| -> Vec<String> {
        processes.iter().map(|p| p.replace("From", "K")).collect()
    };
    assert_eq!(constant_names(&resolution, "A"), vec!["KA"]);
    assert_eq!(constant_names(&resolution, "B"), constants(&expected_b));
    assert_eq!(constant_names(&resolution, "C"), constants(&expected_c));

    let c = resolution.scalars.get(&name("C")).unwrap();
    assert_eq!(c.base, name("A"));
    assert_eq!(c.unit, name("UnitOfA"));
    assert_eq!(c.default_symbol.as_deref(), Some("b"));
}

fn scalar_snapshot(resolution: &Resolution, quantity: &TypeName) -> serde_json::Value {
    serde_json::to_value(resolution.scalars.get(quantity)).unwrap()
}

proptest! {
    #[test]
    fn prop_chain_resolution_ignores_declaration_order(
        order in Just(vec![0usize, 1, 2]).prop_shuffle(),
        b_inherits in any::<bool>(),
    ) {
        let reference = resolve(chain(b_inherits));

        let mut declarations = chain(b_inherits);
        let scalars: Vec<RawScalar> = order
            .iter()
            .map(|index| declarations.scalars[*index].clone())
            .collect();
        declarations.scalars = scalars;
        let shuffled = resolve(declarations);

        prop_assert!(shuffled.diagnostics.is_empty());
        for quantity in ["A", "B", "C"] {
            prop_assert_eq!(
                scalar_snapshot(&shuffled, &name(quantity)),
                scalar_snapshot(&reference, &name(quantity))
            );
        }
    }
}

// === Inclusion ===

fn included(child_list: &[&str]) -> Declarations {
    let mut base = base_scalar("Base", "UnitOfBase");
    base.facets.excluded_units = list(&["b"]);

    let mut child = specialized_scalar("Child", "Base", InheritFlags::default());
    child.facets.included_units = list(child_list);

    Declarations {
        units: vec![unit(
            "UnitOfBase",
            "Base",
            vec![fixed("a"), fixed("b"), fixed("c")],
        )],
        scalars: vec![base, child],
        vectors: vec![],
    }
}

fn included_units(resolution: &Resolution, quantity: &str) -> Vec<String> {
    resolution
        .scalars
        .get(&name(quantity))
        .map(|scalar| scalar.included_units.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn test_inclusion_narrows_inherited_set() {
    let resolution = resolve(included(&["a", "c"]));

    assert_eq!(resolution.diagnostics, vec![]);
    assert_eq!(included_units(&resolution, "Base"), vec!["a", "c"]);
    assert_eq!(included_units(&resolution, "Child"), vec!["a", "c"]);
}

#[test]
fn test_inclusion_cannot_restore_excluded_instance() {
    let resolution = resolve(included(&["a", "b", "c"]));

    assert_eq!(included_units(&resolution, "Child"), vec!["a", "c"]);
    assert_eq!(codes(&resolution), vec![INCLUSION_OR_EXCLUSION_HAD_NO_EFFECT]);
    assert_eq!(resolution.count(Severity::Warning), 1);
    assert!(!resolution.has_errors());
    assert_eq!(
        resolution.diagnostics[0].context.get("instance").map(String::as_str),
        Some("b")
    );
}

#[rstest]
#[case::units(false)]
#[case::bases(true)]
fn test_include_and_exclude_on_one_level(#[case] bases: bool) {
    let mut quantity = base_scalar("Base", "UnitOfBase");
    if bases {
        quantity.facets.included_bases = list(&["a"]);
        quantity.facets.excluded_bases = list(&["b"]);
    } else {
        quantity.facets.included_units = list(&["a"]);
        quantity.facets.excluded_units = list(&["b"]);
    }
    let declarations = Declarations {
        units: vec![unit(
            "UnitOfBase",
            "Base",
            vec![fixed("a"), fixed("b"), fixed("c")],
        )],
        scalars: vec![quantity],
        vectors: vec![],
    };

    let resolution = resolve(declarations);

    assert_eq!(codes(&resolution), vec![CONTRADICTORY_ATTRIBUTES]);
    assert_eq!(resolution.count(Severity::Warning), 1);
    let resolved = resolution.scalars.get(&name("Base")).unwrap();
    let (narrowed, untouched) = if bases {
        (&resolved.included_bases, &resolved.included_units)
    } else {
        (&resolved.included_units, &resolved.included_bases)
    };
    assert_eq!(narrowed.iter().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(untouched.len(), 3);
}

#[test]
fn test_include_of_unknown_names_only_is_ignored() {
    let resolution = resolve(included(&["zzz"]));

    assert_eq!(codes(&resolution), vec![UNRECOGNIZED_UNIT_INSTANCE_NAME]);
    assert_eq!(included_units(&resolution, "Child"), vec!["a", "c"]);
}

#[test]
fn test_bases_set_is_independent_of_units_set() {
    let resolution = resolve(included(&["a"]));

    let child = resolution.scalars.get(&name("Child")).unwrap();
    let bases: Vec<&str> = child.included_bases.iter().map(String::as_str).collect();
    assert_eq!(bases, vec!["a", "b", "c"]);
    assert_eq!(included_units(&resolution, "Child"), vec!["a"]);
}

// === Vectors ===

#[rstest]
#[case(Some(3), None)]
#[case(None, Some(MISSING_REQUIRED_PROPERTY))]
#[case(Some(1), Some(INVALID_VECTOR_DIMENSION))]
fn test_base_vector_dimension(
    #[case] dimension: Option<u32>,
    #[case] expected: Option<ErrorCode>,
) {
    let mut declarations = length_time_speed();
    let mut displacement = base_vector("Displacement", "UnitOfLength", 3);
    displacement.shape.dimension = dimension;
    declarations.vectors.push(displacement);

    let resolution = resolve(declarations);

    assert_eq!(codes(&resolution), expected.into_iter().collect::<Vec<_>>());
    let resolved = resolution.vectors.get(&name("Displacement"));
    assert_eq!(
        resolved.map(|vector| vector.shape.dimension),
        dimension.filter(|_| expected.is_none())
    );
}

#[test]
fn test_vector_specialization_keeps_base_dimension() {
    let mut declarations = length_time_speed();
    let mut displacement = base_vector("Displacement", "UnitOfLength", 3);
    displacement.facets.constants.push(Constant {
        name: "Offset".into(),
        unit: "Metre".into(),
        value: ConstantValue::Components(vec![1.0, 2.0]),
        multiples: None,
        location: Default::default(),
    });
    declarations.vectors.push(displacement);
    declarations
        .vectors
        .push(specialized_vector("Position", "Displacement", Some(2)));

    let resolution = resolve(declarations);

    assert_eq!(
        codes(&resolution),
        vec![VECTOR_UNEXPECTED_DIMENSION, VECTOR_UNEXPECTED_DIMENSION]
    );
    let position = resolution.vectors.get(&name("Position")).unwrap();
    assert_eq!(position.shape.dimension, 3);
    assert!(position.constants.is_empty());
    assert_eq!(position.included_units.len(), 2);
}

// === Broken chains ===

#[test]
fn test_unknown_original_drops_only_that_quantity() {
    let mut declarations = length_time_speed();
    declarations.scalars.push(specialized_scalar(
        "Distance",
        "Lenght",
        InheritFlags::default(),
    ));

    let resolution = resolve(declarations);

    assert_eq!(codes(&resolution), vec![UNRECOGNIZED_ORIGINAL_QUANTITY]);
    assert!(codes(&resolution)[0].is_referential());
    assert!(!resolution.scalars.contains(&name("Distance")));
    assert_eq!(resolution.scalars.len(), 3);
    assert_eq!(resolution.units.len(), 3);
}

// === Determinism ===

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let mut declarations = length_time_speed();
    declarations.extend(chain(false));
    declarations.extend(included(&["a", "b"]));
    declarations.units.push(unit("UnitOfTime", "Time", vec![]));
    declarations.scalars.push(specialized_scalar(
        "Orphan",
        "Missing",
        InheritFlags::default(),
    ));

    let parallel = resolve(declarations.clone());
    let serial = sequential(declarations);

    assert!(parallel.has_errors());
    assert_eq!(parallel.diagnostics, serial.diagnostics);
    assert_eq!(
        serde_json::to_value(&parallel).unwrap(),
        serde_json::to_value(&serial).unwrap()
    );
}
