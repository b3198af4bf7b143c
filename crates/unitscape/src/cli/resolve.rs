//! Resolve command implementation
//!
//! Writes the resolved model as JSON. Diagnostics go to stderr so that the
//! model can be piped.

use super::output::{self, OutputFormat};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use unitscape_resolve::{ResolveOptions, Resolver};

use crate::load_manifests;

/// Configuration for resolve command
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    pub files: Vec<PathBuf>,
    /// `Pretty` indents the JSON, `Json` keeps it compact
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub options: ResolveOptions,
}

/// Resolve declaration manifests, returning whether no errors were found
pub fn resolve(config: ResolveConfig) -> Result<bool> {
    if config.files.is_empty() {
        bail!("No files specified for resolution");
    }

    let declarations = load_manifests(&config.files).context("Failed to load manifests")?;
    let resolution = Resolver::with_options(config.options).resolve(declarations);
    tracing::info!(
        units = resolution.units.len(),
        scalars = resolution.scalars.len(),
        vectors = resolution.vectors.len(),
        diagnostics = resolution.diagnostics.len(),
        "resolved declarations"
    );

    for diagnostic in &resolution.diagnostics {
        eprintln!("{}\n", output::format_diagnostic(diagnostic));
    }
    if let Some(summary) = output::format_summary(&resolution.diagnostics) {
        eprintln!("{}", output::format_warning(&format!("Found {}", summary)));
    }

    let content = output::format_json(&resolution, config.format == OutputFormat::Pretty)?;
    output::write_output(&content, config.output_file.as_deref())?;

    Ok(!resolution.has_errors())
}
