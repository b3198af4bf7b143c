//! Unitscape resolution
//!
//! This crate turns raw unit, scalar and vector declarations into validated
//! populations, including:
//! - Duplicate and cross-kind identity detection
//! - Unit instance graphs and derivation signatures
//! - Specialization chains and facet inheritance
//! - Inclusion and exclusion of unit instances
//!
//! Every problem is reported as a diagnostic and drops only the offending item.

pub mod derivations;
pub mod inclusion;
pub mod instances;
pub mod pipeline;
pub mod population;
pub mod quantities;
mod scalars;
pub mod specialization;
pub mod units;
mod vectors;

pub use inclusion::{InclusionLists, ListKind};
pub use pipeline::{Resolution, ResolveOptions, Resolver, resolve};
pub use population::{ChainError, DeclaredTypes, Kind, Population, QuantityPopulation};
pub use quantities::{LocalQuantity, Shape};
pub use vectors::MIN_DIMENSION;
