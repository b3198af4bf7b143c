//! Unitscape declaration model
//!
//! This crate provides:
//! - Qualified type identities
//! - Raw unit, scalar and vector declarations as handed over by extraction
//! - Resolved definitions produced by `unitscape-resolve`

mod name;
mod quantity;
mod resolved;
mod unit;

pub use name::*;
pub use quantity::*;
pub use resolved::*;
pub use unit::*;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use unitscape_diagnostics::SourceLocation;

/// Ordered list of type identities a derivation is expressed over
pub type Signature = SmallVec<[TypeName; 4]>;

/// Anything declared under a type identity at a location
pub trait Declared {
    fn type_name(&self) -> &TypeName;
    fn location(&self) -> &SourceLocation;
}

/// Every raw declaration of one resolution run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Declarations {
    pub units: Vec<RawUnit>,
    pub scalars: Vec<RawScalar>,
    pub vectors: Vec<RawVector>,
}

impl Declarations {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.scalars.is_empty() && self.vectors.is_empty()
    }

    /// Append the declarations of another manifest
    pub fn extend(&mut self, other: Declarations) {
        self.units.extend(other.units);
        self.scalars.extend(other.scalars);
        self.vectors.extend(other.vectors);
    }
}
