//! unitscape command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};
use unitscape::ResolveOptions;
use unitscape::cli::output::{self, ColorMode, OutputFormat};
use unitscape::cli::{resolve, validate};

/// unitscape command-line tool
#[derive(Parser)]
#[command(name = "unitscape")]
#[command(author, version, about = "Unit and quantity declaration tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    /// Validate types one at a time instead of in parallel
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate declaration manifests
    Validate {
        /// Manifest files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Strict mode (warnings as errors)
        #[arg(short, long)]
        strict: bool,
    },

    /// Resolve declaration manifests and write the resolved model as JSON
    Resolve {
        /// Manifest files to resolve
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Log to stderr; `RUST_LOG` takes precedence over `--verbose`
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "unitscape=debug,unitscape_resolve=debug"
        } else {
            "warn"
        })
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(cli.color);
    init_logging(cli.verbose);

    let options = ResolveOptions {
        parallel: !cli.sequential,
    };

    let result = match cli.command {
        Commands::Validate { files, strict } => validate::validate(validate::ValidateConfig {
            files,
            strict,
            format: cli.format,
            output_file: cli.output,
            options,
        }),
        Commands::Resolve { files } => resolve::resolve(resolve::ResolveConfig {
            files,
            format: cli.format,
            output_file: cli.output,
            options,
        }),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{}", output::format_error(&error));
            ExitCode::from(2)
        }
    }
}
