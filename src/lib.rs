//! Reads analytics dashboard reports exported as XML and rebuilds the daily
//! metric series they contain.
//!
//! ```no_run
//! let xml = std::fs::read_to_string("lethain.xml").unwrap();
//! let report = gareports_reader::parse_report(&xml).unwrap();
//! println!("{}: {} days", report.profile_name, report.len());
//! ```
pub mod output;
pub mod report;
pub mod utils;

pub use report::{
    parse_report, DailyMetrics, DashboardConfig, ParsedReport, ReportParser, ReportType,
};
pub use utils::error::{ErrorKind, ReportError};
