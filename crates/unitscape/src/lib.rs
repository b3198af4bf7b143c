//! Unit and quantity declaration resolution for Rust
//!
//! This crate provides:
//! - Loading declaration manifests
//! - Resolution of units, scalars and vectors into a validated model
//! - Diagnostics for every declaration that had to be dropped or adjusted
//!
//! # Example
//!
//! ```ignore
//! use unitscape::{load_manifest, resolve};
//!
//! let declarations = load_manifest("quantities.json")?;
//! let resolution = resolve(declarations);
//! for diagnostic in &resolution.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! ```

// Re-export all public APIs from internal crates
pub use unitscape_diagnostics as diagnostics;
pub use unitscape_model as model;
pub use unitscape_resolve as resolver;

// Convenience re-exports
pub use unitscape_diagnostics::{Diagnostic, Result, Severity, UnitscapeError};
pub use unitscape_model::{Declarations, TypeName};
pub use unitscape_resolve::{Resolution, ResolveOptions, Resolver, resolve};

mod manifest;

pub use manifest::{load_manifest, load_manifests, parse_manifest};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
