// src/main.rs
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use gareports_reader::output::{self, OutputFormat};
use gareports_reader::utils::{logging, AppError};
use gareports_reader::{DashboardConfig, ReportParser};

/// Command Line Interface for the analytics report reader
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the exported XML report ("-" reads stdin)
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated list of metric names every day must carry
    #[arg(long, value_delimiter = ',')]
    metrics: Option<Vec<String>>,

    /// Drop repeated names from the default metric list
    #[arg(long, conflicts_with = "metrics")]
    dedupe_metrics: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    // 3. Build the parser configuration
    let config = match &args.metrics {
        Some(names) => {
            let names: Vec<&str> = names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .collect();
            if names.is_empty() {
                return Err(AppError::Config(
                    "--metrics needs at least one metric name".to_string(),
                ));
            }
            DashboardConfig::new(names)
        }
        None if args.dedupe_metrics => DashboardConfig::default().deduplicated(),
        None => DashboardConfig::default(),
    };
    let parser = ReportParser::with_config(config);

    // 4. Read the document
    let raw = read_input(&args.input)?;
    tracing::info!("Read {} bytes from {}", raw.len(), args.input.display());

    // 5. Parse and emit
    let report = parser.parse_bytes(&raw).map_err(|e| {
        tracing::error!("Failed to parse {}: {}", args.input.display(), e);
        e
    })?;
    tracing::info!(
        "Parsed {} report for {}: {} days from {} to {}",
        report.report_type,
        report.profile_name,
        report.len(),
        report.range_start,
        report.range_end
    );

    output::write_report(&report, args.format, args.output.as_deref())?;

    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>, AppError> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read(path)?)
}
