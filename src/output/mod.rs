// src/output/mod.rs
use std::fs;
use std::io::Write;
use std::path::Path;

use clap::ValueEnum;

use crate::report::ParsedReport;
use crate::utils::error::OutputError;

/// How a parsed report is rendered for downstream tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    #[default]
    Json,
    /// One CSV row per day, headed by the metric names
    Csv,
}

/// Renders the report in the requested format.
pub fn render(report: &ParsedReport, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => render_json(report),
        OutputFormat::Csv => render_csv(report),
    }
}

fn render_json(report: &ParsedReport) -> Result<String, OutputError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

fn render_csv(report: &ParsedReport) -> Result<String, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in report.to_rows() {
        writer.write_record(&row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::IoError(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Writes the rendered report to `path`, or to stdout when no path is given.
pub fn write_report(
    report: &ParsedReport,
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<(), OutputError> {
    let rendered = render(report, format)?;

    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered.as_bytes())?;
            tracing::info!("Saved {:?} report to {}", format, path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(rendered.as_bytes())?;
            handle.flush()?;
        }
    }

    Ok(())
}
