// src/report/mod.rs
pub mod dashboard;
pub mod models;
pub mod parser;

// Re-export key report types for convenience
pub use dashboard::{
    extract_dashboard, sparkline_metric_type, DashboardConfig, DEFAULT_DASHBOARD_METRICS,
};
pub use models::{DailyMetrics, ParsedReport, ReportType, SparklineSeries};
pub use parser::{parse_date_range, parse_report, ReportParser};
