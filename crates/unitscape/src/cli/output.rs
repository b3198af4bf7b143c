//! Output formatting utilities

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use unitscape_diagnostics::{Diagnostic, Severity, SourceLocation};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored when enabled
    #[default]
    Pretty,
    /// Machine-readable JSON
    Json,
}

/// Color output options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: ColorMode) {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    };
    colored::control::set_override(enabled);
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Format a declaration location (file:line:col)
pub fn format_location(location: &SourceLocation) -> String {
    let file = location.file.as_deref().unwrap_or("<unknown>");
    format!("{}:{}:{}", file.cyan(), location.line, location.column)
}

/// Render a diagnostic for the terminal
pub fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let mut rendered = diagnostic.to_colored_string();
    if let Some(subject) = &diagnostic.subject {
        rendered.push_str(&format!("\n  {} {}", "in:".blue(), subject));
    }
    for related in &diagnostic.related {
        match &related.location {
            Some(location) => rendered.push_str(&format!(
                "\n  {} {} ({})",
                "note:".blue(),
                related.message,
                format_location(location)
            )),
            None => rendered.push_str(&format!("\n  {} {}", "note:".blue(), related.message)),
        }
    }
    rendered
}

/// One-line summary of diagnostic counts, or `None` when there are none
pub fn format_summary(diagnostics: &[Diagnostic]) -> Option<String> {
    let count = |severity: Severity| {
        diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    };

    let parts: Vec<String> = [
        (count(Severity::Error), "error(s)", Color::Red),
        (count(Severity::Warning), "warning(s)", Color::Yellow),
        (
            count(Severity::Info) + count(Severity::Hint),
            "note(s)",
            Color::Blue,
        ),
    ]
    .into_iter()
    .filter(|(count, _, _)| *count > 0)
    .map(|(count, label, color)| format!("{} {}", count, label).color(color).to_string())
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Serialize a value as JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}
