use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cvdprune::archive::has_cvd_extension;
use cvdprune::{Config, DenyList, Error, Outcome, Pipeline, ReportFormat};

/// Exit status when the archive has no target document
const EXIT_DOCUMENT_MISSING: u8 = 3;
/// Exit status for malformed XML
const EXIT_PARSE_ERROR: u8 = 2;
const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "cvdprune",
    version,
    about = "Strip deny-listed elements from doc/equips.xml inside a .cvd archive"
)]
struct Cli {
    /// Path to the .cvd archive
    #[arg(required_unless_present = "init_config")]
    archive: Option<PathBuf>,

    /// Config file to use instead of the one in the user config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Element name to strip; repeat to build the list (replaces the configured list)
    #[arg(short = 't', long = "tag", value_name = "NAME")]
    tags: Vec<String>,

    /// Write the pruned archive here instead of next to the source
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// How to print the result
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Write the default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.init_config {
        match Config::init_default()? {
            Some(path) => println!("Wrote default config to {}", path.display()),
            None => bail!("no user config directory on this platform"),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let mut options = config.pipeline_options();
    if !cli.tags.is_empty() {
        options.deny_list = DenyList::new(cli.tags);
    }
    if cli.output.is_some() {
        options.output = cli.output;
    }
    if options.deny_list.is_empty() {
        tracing::warn!("deny list is empty; the archive will be repacked unchanged");
    }

    let source = cli.archive.context("no archive given")?;
    if !source.is_file() {
        bail!("{} is not a file", source.display());
    }
    if !has_cvd_extension(&source) {
        tracing::warn!(source = %source.display(), "source does not have a .cvd extension");
    }

    let pipeline = Pipeline::new(options);
    let result = pipeline.run(&source);
    Ok(report(cli.format, &source, &result))
}

/// Print exactly one report for the run and pick the exit status
fn report(format: ReportFormat, source: &Path, result: &cvdprune::Result<Outcome>) -> ExitCode {
    let code = match result {
        Ok(Outcome::Repacked { .. }) => ExitCode::SUCCESS,
        Ok(Outcome::DocumentMissing { .. }) => ExitCode::from(EXIT_DOCUMENT_MISSING),
        Err(err) if err.is_parse_error() => ExitCode::from(EXIT_PARSE_ERROR),
        Err(_) => ExitCode::from(EXIT_FAILURE),
    };

    match format {
        ReportFormat::Text => print_text(source, result),
        ReportFormat::Json => print_json(result),
    }
    code
}

fn print_text(source: &Path, result: &cvdprune::Result<Outcome>) {
    match result {
        Ok(Outcome::Repacked { output, report }) => {
            println!(
                "Done: removed {} element(s), saved to {}",
                report.removed,
                output.display()
            );
        }
        Ok(Outcome::DocumentMissing { document }) => {
            println!(
                "{} was not found in {}; nothing was written",
                document.display(),
                source.display()
            );
        }
        Err(err @ Error::Parse { .. }) => {
            eprintln!("XML parse error, check that the document is complete:\n{err}");
        }
        Err(err) => eprintln!("Error: {err}"),
    }
}

fn print_json(result: &cvdprune::Result<Outcome>) {
    let value = match result {
        Ok(outcome) => serde_json::to_value(outcome)
            .unwrap_or_else(|e| json!({ "status": "error", "message": e.to_string() })),
        Err(err) => {
            let kind = if err.is_parse_error() { "parse" } else { "failure" };
            json!({ "status": "error", "kind": kind, "message": err.to_string() })
        }
    };
    println!("{value}");
}
