//! The btree command-line interface.
//!
//! Exit status is 0 when no error diagnostics were reported, 1 when at least one was,
//! and 2 when the run itself failed (unreadable file, bad configuration, write error).

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{BtreeArgs, Command};
use crate::cli::output::{
    write_rules, write_short, write_summary, write_tokens, write_tree, Report,
};
use crate::config::{ColorMode, Config, OutputFormat};
use crate::diagnostics::Diagnostic;
use crate::discovery::discover_scripts;
use crate::engine::{parse_source, tokens_of, Pipeline};
use crate::errors::BtreeError;
use crate::source::SourceFile;

pub mod args;
pub mod output;

pub const EXIT_OK: i32 = 0;
pub const EXIT_DIAGNOSTICS: i32 = 1;
pub const EXIT_FAILURE: i32 = 2;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "BTREE_LOG";

/// The main entry point for the CLI.
pub fn run() {
    let args = BtreeArgs::parse();
    init_logging(args.verbose);
    let color = args.color.unwrap_or_default();

    let code = match execute(args) {
        Ok(code) => code,
        Err(error) => {
            print_error(&error, color);
            EXIT_FAILURE
        }
    };
    process::exit(code);
}

/// Runs a parsed command line and returns the exit status.
pub fn execute(args: BtreeArgs) -> Result<i32, BtreeError> {
    let mut config = Config::discover(args.config.as_deref(), Path::new("."))?;
    if let Some(color) = args.color {
        config.color = color;
    }

    match args.command {
        Command::Check {
            paths,
            format,
            fields,
        } => {
            if let Some(format) = format {
                config.format = format;
            }
            if let Some(fields) = fields {
                config.fields = Some(fields);
            }
            handle_check(&config, &paths)
        }
        Command::Tokens { file, json } => handle_tokens(&config, &file, json),
        Command::Tree { file, json } => handle_tree(&config, &file, json),
        Command::Rules { fields } => {
            if let Some(fields) = fields {
                config.fields = Some(fields);
            }
            handle_rules(&config)
        }
    }
}

// ============================================================================
// SUBCOMMANDS
// ============================================================================

fn handle_check(config: &Config, paths: &[PathBuf]) -> Result<i32, BtreeError> {
    let pipeline = Pipeline::from_config(config)?;
    let scripts = discover_scripts(paths)?;
    let mut stdout = stdout_for(config.color);
    let mut report = Report::new(config.format);
    let mut unreadable = 0;

    for path in &scripts {
        let source = match SourceFile::read(path) {
            Ok(source) => source,
            Err(error) => {
                tracing::debug!(path = %path.display(), "skipping unreadable script");
                print_error(&error, config.color);
                unreadable += 1;
                continue;
            }
        };
        let analysis = pipeline.analyze(&source);
        report.add(&mut stdout, &source, &analysis.diagnostics)?;
    }
    report.finish(&mut stdout)?;

    if config.format != OutputFormat::Json {
        write_summary(&mut stderr_for(config.color), &report)?;
    }
    if unreadable > 0 {
        return Ok(EXIT_FAILURE);
    }
    Ok(exit_status(report.has_errors()))
}

fn handle_tokens(config: &Config, file: &Path, json: bool) -> Result<i32, BtreeError> {
    let source = SourceFile::read(file)?;
    let (tokens, diagnostics) = tokens_of(&source);
    write_tokens(&mut stdout_for(config.color), &tokens, json)?;
    report_to_stderr(config.color, &source, &diagnostics)
}

fn handle_tree(config: &Config, file: &Path, json: bool) -> Result<i32, BtreeError> {
    let source = SourceFile::read(file)?;
    let (output, diagnostics) = parse_source(&source);
    write_tree(&mut stdout_for(config.color), &output, json)?;
    report_to_stderr(config.color, &source, &diagnostics)
}

fn handle_rules(config: &Config) -> Result<i32, BtreeError> {
    let pipeline = Pipeline::from_config(config)?;
    write_rules(&mut stdout_for(config.color), pipeline.validator())?;
    Ok(EXIT_OK)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn stdout_for(color: ColorMode) -> StandardStream {
    StandardStream::stdout(color.resolve(io::stdout().is_terminal()))
}

fn stderr_for(color: ColorMode) -> StandardStream {
    StandardStream::stderr(color.resolve(io::stderr().is_terminal()))
}

fn report_to_stderr(
    color: ColorMode,
    source: &SourceFile,
    diagnostics: &[Diagnostic],
) -> Result<i32, BtreeError> {
    let mut stderr = stderr_for(color);
    for diagnostic in diagnostics {
        write_short(&mut stderr, &source.name, diagnostic)?;
    }
    Ok(exit_status(diagnostics.iter().any(Diagnostic::is_error)))
}

fn exit_status(has_errors: bool) -> i32 {
    if has_errors {
        EXIT_DIAGNOSTICS
    } else {
        EXIT_OK
    }
}

fn print_error(error: &BtreeError, color: ColorMode) {
    let mut stderr = stderr_for(color);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = writeln!(stderr, ": {}", error);
}
