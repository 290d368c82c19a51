//! Binary to roll up a JSON API schema into a Rust client library.
//!
//! Usage: `burrito --schema api.json --out ./client`
//!
//! Probes every route in the schema, infers its data types, and writes the
//! generated modules to the output directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use burrito_rs::{BurritoError, GenerateSettings, Generation, Severity};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(
    name = "burrito",
    version,
    about = "Roll up a JSON API schema into a typed Rust client library"
)]
struct Cli {
    /// Path to the API schema
    #[arg(short, long)]
    schema: PathBuf,

    /// Output directory. If it already contains files, a child directory named after the
    /// schema file is used instead
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Also generate a synchronous twin for every async route
    #[arg(long)]
    sync_and_async: bool,

    /// Keep JSON keys as field names instead of converting them to snake case
    #[arg(long)]
    raw_field_names: bool,

    /// Timeout for each sample request, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Maximum number of sample requests in flight
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn settings(&self) -> GenerateSettings {
        GenerateSettings {
            generate_async_and_sync: self.sync_and_async,
            follow_naming_conventions: !self.raw_field_names,
            probe_timeout: Duration::from_secs(self.timeout_secs),
            max_concurrent_probes: self.concurrency,
        }
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level: &str = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter: EnvFilter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("burrito={level},burrito_rs={level}")));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// `out`, or `out/<schema stem>` when `out` already contains files.
fn output_dir(out: &Path, schema_path: &Path) -> Result<PathBuf, BurritoError> {
    let entries = match std::fs::read_dir(out) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(out.to_path_buf()),
        Err(e) => return Err(e.into()),
    };
    let mut occupied: bool = false;
    for entry in entries {
        if entry?.file_type()?.is_file() {
            occupied = true;
            break;
        }
    }
    if !occupied {
        return Ok(out.to_path_buf());
    }
    let stem = schema_path.file_stem().ok_or_else(|| {
        BurritoError::GenericError(format!(
            "Schema path '{}' has no file name",
            schema_path.display()
        ))
    })?;
    Ok(out.join(stem))
}

async fn roll_up(cli: &Cli) -> Result<(), BurritoError> {
    let started: Instant = Instant::now();
    let generation: Generation = burrito_rs::run(&cli.schema, &cli.settings()).await?;

    let out_dir: PathBuf = output_dir(&cli.out, &cli.schema)?;
    generation.manifest.write_to_dir(&out_dir)?;
    tracing::info!(out = %out_dir.display(), "Wrote client library.");

    let skipped: usize = generation
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if skipped > 0 {
        eprintln!("{skipped} route(s) could not be rolled up, see the log above.");
    }
    println!(
        "Rolled up the API schema in {:.2}s, {} classes generated.",
        started.elapsed().as_secs_f64(),
        generation.file_count
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli: Cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match roll_up(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
