// src/report/dashboard.rs

// --- Imports ---
use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::Node;

use crate::report::models::{DailyMetrics, SparklineSeries};
use crate::utils::error::ReportError;

// --- Regex Patterns (Lazy Static) ---
// `VisitsSparkline` -> `Visits`
static SPARKLINE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<type>\w+)Sparkline").expect("Failed to compile SPARKLINE_NAME_RE")
});

/// Metric names a dashboard export is expected to carry, in source order.
/// `TimeOnSite` is listed twice in the vendor's layout.
pub const DEFAULT_DASHBOARD_METRICS: [&str; 13] = [
    "Visits",
    "Pageviews",
    "TimeOnSite",
    "BounceRate",
    "NewVisits",
    "Visitors",
    "AvgPageviews",
    "TimeOnSite",
    "NewVisitors",
    "Direct",
    "Referral",
    "Search",
    "Unique",
];

/// The metric names every day of a dashboard series must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub expected_metrics: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DASHBOARD_METRICS)
    }
}

impl DashboardConfig {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected_metrics: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Same names with repeats dropped, first appearance wins.
    pub fn deduplicated(&self) -> Self {
        Self {
            expected_metrics: unique_names(&self.expected_metrics),
        }
    }

    pub(crate) fn metric_names(&self) -> Vec<String> {
        unique_names(&self.expected_metrics)
    }
}

fn unique_names(names: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(names.len());
    for name in names {
        if !seen.contains(name) {
            seen.push(name.clone());
        }
    }
    seen
}

/// Derives the metric type from a sparkline `id`.
pub fn sparkline_metric_type(id: &str) -> Option<&str> {
    SPARKLINE_NAME_RE
        .captures(id)
        .and_then(|caps| caps.name("type"))
        .map(|m| m.as_str())
}

/// Reads one `Sparkline` element. Elements without an `id` yield `None`.
fn read_sparkline(node: Node<'_, '_>) -> Result<Option<SparklineSeries>, ReportError> {
    let Some(id) = node.attribute("id") else {
        tracing::trace!("Skipping sparkline without id");
        return Ok(None);
    };

    let metric_type = sparkline_metric_type(id).ok_or_else(|| {
        ReportError::malformed(format!("sparkline id '{}' does not end in 'Sparkline'", id))
    })?;

    let values = node
        .children()
        .filter(|child| child.has_tag_name("PrimaryValue"))
        .map(|child| child.text().unwrap_or_default().to_string())
        .collect();

    Ok(Some(SparklineSeries {
        metric_type: metric_type.to_string(),
        values,
    }))
}

/// Collects every sparkline under `report`, keyed by metric type.
/// A later sparkline with the same type replaces an earlier one.
pub(crate) fn collect_sparklines(
    report: Node<'_, '_>,
) -> Result<HashMap<String, Vec<String>>, ReportError> {
    let mut sparklines = HashMap::new();

    for node in report.descendants().filter(|n| n.has_tag_name("Sparkline")) {
        if let Some(series) = read_sparkline(node)? {
            tracing::trace!(
                "Found sparkline '{}' with {} values",
                series.metric_type,
                series.values.len()
            );
            if sparklines
                .insert(series.metric_type.clone(), series.values)
                .is_some()
            {
                tracing::debug!("Sparkline '{}' overrides an earlier one", series.metric_type);
            }
        }
    }

    Ok(sparklines)
}

/// Builds the daily series for a dashboard report, one entry per day
/// starting at `range_start`.
pub fn extract_dashboard(
    report: Node<'_, '_>,
    range_start: NaiveDate,
    range_end: NaiveDate,
    config: &DashboardConfig,
) -> Result<Vec<DailyMetrics>, ReportError> {
    let sparklines = collect_sparklines(report)?;
    let day_count = usize::try_from((range_end - range_start).num_days()).map_err(|_| {
        ReportError::malformed(format!("range end {} precedes start {}", range_end, range_start))
    })?;

    tracing::debug!(
        "Dashboard has {} sparklines covering {} days from {}",
        sparklines.len(),
        day_count,
        range_start
    );

    // Validate up front so the error names the metric rather than a day.
    for name in &config.expected_metrics {
        let found = sparklines.get(name).map_or(0, Vec::len);
        if found < day_count {
            return Err(ReportError::MissingMetricSeries {
                metric: name.clone(),
                needed: day_count,
                found,
            });
        }
    }

    let mut series = Vec::with_capacity(day_count);
    for offset in 0..day_count {
        let date = range_start
            .checked_add_days(Days::new(offset as u64))
            .ok_or_else(|| ReportError::malformed("date range runs past the calendar"))?;

        let metrics: BTreeMap<String, String> = config
            .expected_metrics
            .iter()
            .map(|name| (name.clone(), sparklines[name][offset].clone()))
            .collect();

        series.push(DailyMetrics { date, metrics });
    }

    Ok(series)
}
