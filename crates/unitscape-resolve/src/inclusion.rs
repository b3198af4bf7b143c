//! Unit instance inclusion and exclusion
//!
//! Every quantity exposes two sets of instances of its unit, the bases and the
//! units. Both start from every instance of the unit and are narrowed level by
//! level down the specialization chain: an include list intersects, an exclude
//! list subtracts.

use indexmap::IndexSet;
use std::fmt;
use unitscape_diagnostics::{
    CONTRADICTORY_ATTRIBUTES, DUPLICATE_LISTING, Diagnostic, EMPTY_LIST,
    INCLUSION_OR_EXCLUSION_HAD_NO_EFFECT, UNRECOGNIZED_UNIT_INSTANCE_NAME, WithDiagnostics,
};
use unitscape_model::{InheritFlags, QuantityFacets, UnitList, UnitType};

use crate::quantities::{LocalQuantity, Site};

/// The two independent instance sets of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bases,
    Units,
}

impl ListKind {
    pub fn inherits(self, flags: &InheritFlags) -> bool {
        match self {
            Self::Bases => flags.bases,
            Self::Units => flags.units,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bases => write!(f, "unit bases"),
            Self::Units => write!(f, "units"),
        }
    }
}

/// Validated include and exclude lists declared by one quantity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionLists {
    pub included_bases: Option<UnitList>,
    pub excluded_bases: Option<UnitList>,
    pub included_units: Option<UnitList>,
    pub excluded_units: Option<UnitList>,
}

impl InclusionLists {
    /// Include and exclude list of `kind`
    pub fn get(&self, kind: ListKind) -> (Option<&UnitList>, Option<&UnitList>) {
        match kind {
            ListKind::Bases => (self.included_bases.as_ref(), self.excluded_bases.as_ref()),
            ListKind::Units => (self.included_units.as_ref(), self.excluded_units.as_ref()),
        }
    }
}

/// Validate the lists declared by a quantity against the instances of its unit
///
/// Empty lists are ignored. Unknown and repeated names are dropped, and a list
/// left without a known name is ignored as well. When a
/// quantity both includes and excludes instances of the same kind, the
/// exclusion is ignored.
pub fn validate_lists(
    facets: &QuantityFacets,
    unit: &UnitType,
    site: &Site<'_>,
) -> WithDiagnostics<InclusionLists> {
    let mut diagnostics = Vec::new();
    let mut check = |list: &Option<UnitList>, description: &str| {
        validate_list(list.as_ref()?, description, unit, site, &mut diagnostics)
    };

    let included_bases = check(&facets.included_bases, "included unit bases");
    let mut excluded_bases = check(&facets.excluded_bases, "excluded unit bases");
    let included_units = check(&facets.included_units, "included units");
    let mut excluded_units = check(&facets.excluded_units, "excluded units");

    for (kind, included, excluded) in [
        (ListKind::Bases, &included_bases, &mut excluded_bases),
        (ListKind::Units, &included_units, &mut excluded_units),
    ] {
        if included.is_some() {
            if let Some(exclusion) = excluded.take() {
                diagnostics.push(site.at_item(
                    Diagnostic::warning(
                        CONTRADICTORY_ATTRIBUTES,
                        format!(
                            "'{}' both includes and excludes {}, the exclusion is ignored",
                            site.type_name, kind
                        ),
                    ),
                    &exclusion.location,
                ));
            }
        }
    }

    WithDiagnostics::with_diagnostics(
        InclusionLists {
            included_bases,
            excluded_bases,
            included_units,
            excluded_units,
        },
        diagnostics,
    )
}

fn validate_list(
    list: &UnitList,
    description: &str,
    unit: &UnitType,
    site: &Site<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<UnitList> {
    if list.names.is_empty() {
        diagnostics.push(site.at_item(
            Diagnostic::warning(EMPTY_LIST, format!("the list of {} is empty", description)),
            &list.location,
        ));
        return None;
    }

    let mut names: IndexSet<&str> = IndexSet::new();
    for name in &list.names {
        if !unit.has_instance(name) {
            diagnostics.push(site.at_item(
                Diagnostic::error(
                    UNRECOGNIZED_UNIT_INSTANCE_NAME,
                    format!(
                        "'{}' in the {} is not an instance of '{}'",
                        name, description, unit.type_name
                    ),
                )
                .with_context("instance", name),
                &list.location,
            ));
        } else if !names.insert(name) {
            diagnostics.push(site.at_item(
                Diagnostic::info(
                    DUPLICATE_LISTING,
                    format!("'{}' is listed more than once in the {}", name, description),
                )
                .with_context("instance", name),
                &list.location,
            ));
        }
    }

    if names.is_empty() {
        return None;
    }

    Some(UnitList {
        names: names.into_iter().map(str::to_string).collect(),
        location: list.location.clone(),
    })
}

/// Resolve the instance set of `kind` for the first quantity of `chain`
///
/// `chain` lists the quantity and its ancestors, current type first. Only the
/// lists of the current type are reported on; ancestors reported on their own.
pub fn resolve_included<S>(
    chain: &[&LocalQuantity<S>],
    unit: &UnitType,
    kind: ListKind,
) -> WithDiagnostics<IndexSet<String>> {
    let mut included: IndexSet<String> = unit.instances.keys().cloned().collect();
    let mut diagnostics = Vec::new();

    let Some(current) = chain.first() else {
        return WithDiagnostics::new(included);
    };

    let start = chain
        .iter()
        .position(|level| !kind.inherits(&level.inherit))
        .unwrap_or(chain.len() - 1);

    for (depth, level) in chain[..=start].iter().enumerate().rev() {
        let (inclusion, exclusion) = level.lists.get(kind);
        let is_current = depth == 0;

        if let Some(inclusion) = inclusion {
            if is_current {
                report_no_effect(current, kind, inclusion, &included, "included in", &mut diagnostics);
            }
            included.retain(|name| inclusion.names.contains(name));
        } else if let Some(exclusion) = exclusion {
            if is_current {
                report_no_effect(current, kind, exclusion, &included, "excluded from", &mut diagnostics);
            }
            included.retain(|name| !exclusion.names.contains(name));
        }
    }

    WithDiagnostics::with_diagnostics(included, diagnostics)
}

fn report_no_effect<S>(
    current: &LocalQuantity<S>,
    kind: ListKind,
    list: &UnitList,
    included: &IndexSet<String>,
    action: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let site = current.site();
    for name in list.names.iter().filter(|name| !included.contains(*name)) {
        diagnostics.push(site.at_item(
            Diagnostic::warning(
                INCLUSION_OR_EXCLUSION_HAD_NO_EFFECT,
                format!(
                    "'{}' is {} the {} of '{}', but it is already excluded",
                    name, action, kind, current.type_name
                ),
            )
            .with_context("instance", name),
            &list.location,
        ));
    }
}
