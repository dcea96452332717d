// crates/bescan-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{anyhow, Context, Result};
use bescan_core::{ScanConfig, ScanError, ScanMode, ScanReport, Scanner};
use bescan_gen::generator::{format_gb, generate_file, GenerateSpec, DEFAULT_SIZE_GB};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "bescan",
    about = "Sum/min/max over big-endian u32 record files",
    long_about = "bescan.\n\nGenerate flat files of random big-endian u32 records and scan them sequentially or in parallel.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a data file of uniformly random records
    Generate {
        /// Output path
        #[arg(long, default_value = "data.bin")]
        out: PathBuf,

        /// Size in whole gigabytes (1024^3 bytes)
        #[arg(long, default_value_t = DEFAULT_SIZE_GB)]
        size_gb: u64,

        /// Exact record count; overrides --size-gb
        #[arg(long)]
        records: Option<u64>,

        /// RNG seed for a reproducible file
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Compute sum, min and max of a data file
    Scan {
        /// Data file to scan
        #[arg(long, default_value = "data.bin")]
        file: PathBuf,

        /// Split the file into segments read concurrently
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Number of concurrent partitions (overrides --config)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        workers: Option<u64>,

        /// Read block size in bytes (overrides --config)
        #[arg(long)]
        block_size: Option<usize>,

        /// TOML file with scan settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let res = match cli.cmd {
        Cmd::Generate {
            out,
            size_gb,
            records,
            seed,
        } => generate(&out, size_gb, records, seed),

        Cmd::Scan {
            file,
            parallel,
            workers,
            block_size,
            config,
            json,
        } => scan(&file, parallel, workers, block_size, config.as_deref(), json),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing with an env-driven filter (default INFO), on stderr.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// One diagnostic line per failure.
fn report_failure(e: &anyhow::Error) {
    match e.downcast_ref::<ScanError>() {
        Some(ScanError::NotFound { path }) => eprintln!(
            "error: data file {} not found; run `bescan generate` first",
            path.display()
        ),
        _ => eprintln!("error: {e:#}"),
    }
}

fn generate(out: &Path, size_gb: u64, records: Option<u64>, seed: Option<u64>) -> Result<()> {
    let spec = match records {
        Some(n) => GenerateSpec::from_records(n, seed),
        None => GenerateSpec::from_gigabytes(size_gb, seed),
    }?;

    let len = generate_file(out, spec)
        .with_context(|| format!("generating data file {}", out.display()))?;

    println!("File {} created. Size: {}", out.display(), format_gb(len));
    Ok(())
}

fn scan(
    file: &Path,
    parallel: bool,
    workers: Option<u64>,
    block_size: Option<usize>,
    config: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut cfg = match config {
        // Flatten so a missing config is not reported as a missing data file.
        Some(p) => ScanConfig::from_toml_file(p)
            .map_err(|e| anyhow!("loading scan config {}: {e}", p.display()))?,
        None => ScanConfig::default(),
    };
    if let Some(w) = workers {
        cfg.workers = usize::try_from(w).context("worker count does not fit in usize")?;
    }
    if let Some(b) = block_size {
        cfg.block_size = b;
    }

    let mode = if parallel {
        ScanMode::Parallel
    } else {
        ScanMode::Sequential
    };

    let scanner = Scanner::new(cfg)?;
    info!(file=%file.display(), %mode, workers = scanner.config().workers, "scanning");
    let report = scanner.scan_path(file, mode)?;

    if json {
        let s = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{s}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ScanReport) {
    let show = |v: Option<u32>| v.map_or_else(|| "none".to_string(), |v| v.to_string());
    println!("Mode: {}", report.mode);
    println!("Results:");
    println!("  sum: {}", report.accumulator.total);
    println!("  min: {}", show(report.accumulator.min()));
    println!("  max: {}", show(report.accumulator.max()));
    if report.trailing_bytes > 0 {
        println!("  ignored trailing bytes: {}", report.trailing_bytes);
    }
    println!("Elapsed: {:.2} seconds", report.elapsed.as_secs_f64());
}

