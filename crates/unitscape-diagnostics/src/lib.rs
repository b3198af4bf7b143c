//! Unitscape diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by every
//! resolution stage, including error codes, declaration locations, diagnostic
//! values and the result algebra that carries diagnostics alongside values.

mod error;
mod error_code;
mod outcome;
mod location;

pub use error::*;
pub use error_code::*;
pub use outcome::*;
pub use location::*;

/// Result type for host-level unitscape operations
pub type Result<T> = std::result::Result<T, UnitscapeError>;
