// src/report/models.rs
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::utils::error::ReportError;

/// Report variants this crate knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReportType {
    Dashboard,
}

impl ReportType {
    /// Value of the `name` attribute on the `Report` element.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Dashboard => "Dashboard",
        }
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dashboard" => Ok(ReportType::Dashboard),
            other => Err(ReportError::UnknownReportType(other.to_string())),
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of the reporting window and the raw text of every metric for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub metrics: BTreeMap<String, String>,
}

impl DailyMetrics {
    pub fn get(&self, metric: &str) -> Option<&str> {
        self.metrics.get(metric).map(String::as_str)
    }
}

/// Per-day values of one sparkline, indexed by days since the range start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparklineSeries {
    pub metric_type: String,
    pub values: Vec<String>,
}

/// A fully extracted report. Holds no reference to the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReport {
    pub report_type: ReportType,
    pub profile_name: String,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub series: Vec<DailyMetrics>,
    #[serde(skip)]
    pub(crate) metric_names: Vec<String>,
}

impl ParsedReport {
    /// Distinct metric names in configured order.
    pub fn metric_names(&self) -> &[String] {
        &self.metric_names
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyMetrics> {
        self.series.iter().find(|entry| entry.date == date)
    }

    /// Header row (`date` followed by metric names) plus one row per day.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.series.len() + 1);

        let mut header = Vec::with_capacity(self.metric_names.len() + 1);
        header.push("date".to_string());
        header.extend(self.metric_names.iter().cloned());
        rows.push(header);

        for entry in &self.series {
            let mut row = Vec::with_capacity(self.metric_names.len() + 1);
            row.push(entry.date.format("%Y-%m-%d").to_string());
            for name in &self.metric_names {
                row.push(entry.get(name).unwrap_or_default().to_string());
            }
            rows.push(row);
        }

        rows
    }
}
