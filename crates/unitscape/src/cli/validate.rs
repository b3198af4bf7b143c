//! Validate command implementation

use super::output::{self, OutputFormat};
use anyhow::{Context, Result, bail};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use unitscape_diagnostics::{Diagnostic, Severity};
use unitscape_resolve::{Resolution, ResolveOptions, Resolver};

use crate::load_manifests;

/// Configuration for validate command
#[derive(Debug, Clone)]
pub struct ValidateConfig {
    pub files: Vec<PathBuf>,
    /// Treat warnings as errors
    pub strict: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub options: ResolveOptions,
}

/// Outcome of validating a set of manifests
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub errors: usize,
    pub warnings: usize,
    pub units: usize,
    pub scalars: usize,
    pub vectors: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new(resolution: Resolution, strict: bool) -> Self {
        let errors = resolution.count(Severity::Error);
        let warnings = resolution.count(Severity::Warning);
        Self {
            passed: errors == 0 && !(strict && warnings > 0),
            errors,
            warnings,
            units: resolution.units.len(),
            scalars: resolution.scalars.len(),
            vectors: resolution.vectors.len(),
            diagnostics: resolution.diagnostics,
        }
    }
}

/// Validate declaration manifests, returning whether they passed
pub fn validate(config: ValidateConfig) -> Result<bool> {
    let report = run(&config)?;

    match config.format {
        OutputFormat::Json => {
            let content = output::format_json(&report, true)?;
            output::write_output(&content, config.output_file.as_deref())?;
        }
        OutputFormat::Pretty => {
            let rendered: Vec<String> = report
                .diagnostics
                .iter()
                .map(output::format_diagnostic)
                .collect();
            if !rendered.is_empty() {
                output::write_output(&rendered.join("\n\n"), config.output_file.as_deref())?;
            }
            print_summary(&report, &config);
        }
    }

    Ok(report.passed)
}

/// Resolve the manifests of `config` without printing anything
pub fn run(config: &ValidateConfig) -> Result<ValidationReport> {
    if config.files.is_empty() {
        bail!("No files specified for validation");
    }

    let declarations = load_manifests(&config.files).context("Failed to load manifests")?;
    tracing::info!(
        files = config.files.len(),
        units = declarations.units.len(),
        scalars = declarations.scalars.len(),
        vectors = declarations.vectors.len(),
        "validating declarations"
    );

    let resolution = Resolver::with_options(config.options).resolve(declarations);
    Ok(ValidationReport::new(resolution, config.strict))
}

fn print_summary(report: &ValidationReport, config: &ValidateConfig) {
    eprintln!();
    match output::format_summary(&report.diagnostics) {
        None => eprintln!(
            "{}",
            output::format_success(&format!(
                "{} file(s) validated: {} unit(s), {} scalar(s), {} vector(s)",
                config.files.len(),
                report.units,
                report.scalars,
                report.vectors
            ))
        ),
        Some(summary) if report.passed => {
            eprintln!("{} Found {}", "Validation passed:".green().bold(), summary)
        }
        Some(summary) => {
            eprintln!("{} Found {}", "Validation failed:".red().bold(), summary);
            if config.strict && report.errors == 0 {
                eprintln!(
                    "{}",
                    output::format_warning("Strict mode: treating warnings as errors")
                );
            }
        }
    }
}
