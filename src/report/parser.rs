// src/report/parser.rs

// --- Imports ---
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Document, Node, ParsingOptions};

use crate::report::dashboard::{extract_dashboard, DashboardConfig};
use crate::report::models::{DailyMetrics, ParsedReport, ReportType};
use crate::utils::error::ReportError;

// --- Constants ---
const DATE_RANGE_SEPARATOR: &str = " - ";
const DATE_FORMAT: &str = "%B %d, %Y"; // e.g. "August 11, 2008"

// --- Regex Patterns (Lazy Static) ---
// chrono's %B also takes "Aug" and %Y takes "08", so the shape is checked first.
static DATE_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:January|February|March|April|May|June|July|August",
        r"|September|October|November|December) \d{1,2}, \d{4}$",
    ))
    .expect("Failed to compile DATE_SEGMENT_RE")
});

/// Turns exported analytics report documents into [`ParsedReport`] values.
///
/// The parser only holds configuration, so one instance can parse any number
/// of documents, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    dashboard: DashboardConfig,
}

impl ReportParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(dashboard: DashboardConfig) -> Self {
        Self { dashboard }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.dashboard
    }

    /// Parses raw bytes, dropping a UTF-8 byte order mark if present.
    pub fn parse_bytes(&self, raw: &[u8]) -> Result<ParsedReport, ReportError> {
        let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
        let text = std::str::from_utf8(raw)
            .map_err(|e| ReportError::malformed(format!("document is not valid UTF-8: {}", e)))?;
        self.parse(text)
    }

    /// Parses one report export into a [`ParsedReport`].
    pub fn parse(&self, raw: &str) -> Result<ParsedReport, ReportError> {
        // 1. Build the document tree. Vendor exports may carry a DOCTYPE.
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document = Document::parse_with_options(raw, options)?;

        // 2. Locate the Report element and its declared type
        let report = find_report(&document)
            .ok_or_else(|| ReportError::malformed("no Report element found"))?;
        let type_name = report
            .attribute("name")
            .ok_or_else(|| ReportError::malformed("Report element has no name attribute"))?;
        let report_type: ReportType = type_name.parse()?;

        // 3. Header: profile and reporting window
        let title = child_element(report, "Title")?;
        let profile_name = child_text(title, "ProfileName")?.to_string();
        let (range_start, range_end) = parse_date_range(child_text(title, "PrimaryDateRange")?)?;

        tracing::debug!(
            "Parsing {} report for '{}' ({} to {})",
            report_type,
            profile_name,
            range_start,
            range_end
        );

        // 4. Type-specific extraction
        let series = self.dispatch(report_type, report, range_start, range_end)?;

        Ok(ParsedReport {
            report_type,
            profile_name,
            range_start,
            range_end,
            series,
            metric_names: self.dashboard.metric_names(),
        })
    }

    fn dispatch(
        &self,
        report_type: ReportType,
        report: Node<'_, '_>,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Vec<DailyMetrics>, ReportError> {
        match report_type {
            ReportType::Dashboard => {
                extract_dashboard(report, range_start, range_end, &self.dashboard)
            }
        }
    }
}

/// Parses `raw` with the default dashboard configuration.
pub fn parse_report(raw: &str) -> Result<ParsedReport, ReportError> {
    ReportParser::new().parse(raw)
}

/// The `Report` element is either the document root or one of its children.
fn find_report<'a, 'input>(document: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    let root = document.root_element();
    if root.has_tag_name("Report") {
        return Some(root);
    }
    root.children().find(|n| n.has_tag_name("Report"))
}

fn child_element<'a, 'input>(
    parent: Node<'a, 'input>,
    name: &str,
) -> Result<Node<'a, 'input>, ReportError> {
    parent
        .children()
        .find(|n| n.has_tag_name(name))
        .ok_or_else(|| {
            ReportError::malformed(format!(
                "missing {} element under {}",
                name,
                parent.tag_name().name()
            ))
        })
}

fn child_text<'a, 'input>(parent: Node<'a, 'input>, name: &str) -> Result<&'a str, ReportError> {
    child_element(parent, name)?
        .text()
        .ok_or_else(|| ReportError::malformed(format!("{} element is empty", name)))
}

/// Splits `"August 11, 2008 - September 10, 2008"` into its two dates.
pub fn parse_date_range(text: &str) -> Result<(NaiveDate, NaiveDate), ReportError> {
    let parts: Vec<&str> = text.split(DATE_RANGE_SEPARATOR).collect();
    let [start, end] = parts.as_slice() else {
        return Err(ReportError::malformed(format!(
            "date range '{}' is not of the form '<start> - <end>'",
            text
        )));
    };

    let (start, end) = (parse_date(start)?, parse_date(end)?);
    if end < start {
        return Err(ReportError::malformed(format!(
            "date range '{}' ends before it starts",
            text
        )));
    }
    Ok((start, end))
}

fn parse_date(text: &str) -> Result<NaiveDate, ReportError> {
    let text = text.trim();
    if !DATE_SEGMENT_RE.is_match(text) {
        return Err(ReportError::malformed(format!(
            "invalid date '{}': expected e.g. 'August 11, 2008'",
            text
        )));
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| ReportError::malformed(format!("invalid date '{}': {}", text, e)))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::dashboard::DEFAULT_DASHBOARD_METRICS;
    use crate::report::test_support::{dashboard_xml, ymd};
    use crate::utils::error::ErrorKind;

    const LETHAIN_RANGE: &str = "August 11, 2008 - September 10, 2008";

    fn lethain_xml() -> String {
        dashboard_xml("www.lethain.com", LETHAIN_RANGE, 30, &DEFAULT_DASHBOARD_METRICS)
    }

    #[test]
    fn parses_lethain_dashboard() {
        let report = parse_report(&lethain_xml()).unwrap();

        assert_eq!(report.report_type, ReportType::Dashboard);
        assert_eq!(report.profile_name, "www.lethain.com");
        assert_eq!(report.range_start, ymd(2008, 8, 11));
        assert_eq!(report.range_end, ymd(2008, 9, 10));
        assert_eq!(report.series.len(), 30);
        assert_eq!(report.series[0].date, ymd(2008, 8, 11));
        assert_eq!(report.series[29].date, ymd(2008, 9, 9));
    }

    #[test]
    fn series_is_consecutive_days() {
        let report = parse_report(&lethain_xml()).unwrap();
        for pair in report.series.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, chrono::Duration::days(1));
        }
    }

    #[test]
    fn every_day_has_the_expected_keys_and_source_text() {
        let report = parse_report(&lethain_xml()).unwrap();
        let expected = DashboardConfig::default().deduplicated().expected_metrics;

        for (offset, day) in report.series.iter().enumerate() {
            let keys: Vec<_> = day.metrics.keys().cloned().collect();
            let mut sorted = expected.clone();
            sorted.sort();
            assert_eq!(keys, sorted);
            assert_eq!(day.get("Visits"), Some(format!("Visits-{}", offset).as_str()));
        }
        assert_eq!(report.metric_names(), expected.as_slice());
    }

    #[test]
    fn unknown_report_type() {
        let xml = r#"<Report name="Other"><Title/></Report>"#;
        let err = parse_report(xml).unwrap_err();
        assert_eq!(err, ReportError::UnknownReportType("Other".to_string()));
    }

    #[test]
    fn unknown_type_is_reported_before_header_problems() {
        let xml = r#"<Report name="Other">
            <Title><ProfileName>x</ProfileName><PrimaryDateRange>garbage</PrimaryDateRange></Title>
        </Report>"#;
        assert_eq!(parse_report(xml).unwrap_err().kind(), ErrorKind::UnknownReportType);
    }

    #[test]
    fn malformed_date_range() {
        let xml = dashboard_xml(
            "www.example.com",
            "August 11, 2008 to September 10, 2008",
            30,
            &DEFAULT_DASHBOARD_METRICS,
        );
        let err = parse_report(&xml).unwrap_err();
        assert!(matches!(err, ReportError::MalformedDocument(_)));
    }

    #[test]
    fn date_range_edge_cases() {
        assert_eq!(
            parse_date_range("August 1, 2008 - August 3, 2008").unwrap(),
            (ymd(2008, 8, 1), ymd(2008, 8, 3))
        );
        assert!(parse_date_range("August 11, 2008").is_err());
        assert!(parse_date_range("A - B - C").is_err());
        assert!(parse_date_range("Augustus 11, 2008 - August 12, 2008").is_err());
        assert!(parse_date_range("08/11/2008 - 09/10/2008").is_err());
        assert!(parse_date_range("Aug 11, 2008 - Sep 10, 2008").is_err());
        assert!(parse_date_range("August 11, 08 - September 10, 08").is_err());
        assert!(parse_date_range("February 30, 2008 - March 1, 2008").is_err());
        // Surrounding whitespace and a single-day window are fine.
        assert_eq!(
            parse_date_range(" August 11, 2008 -  August 11, 2008 ").unwrap(),
            (ymd(2008, 8, 11), ymd(2008, 8, 11))
        );
    }

    #[test]
    fn two_digit_year_is_malformed() {
        let xml = dashboard_xml(
            "www.example.com",
            "August 11, 08 - September 10, 08",
            30,
            &DEFAULT_DASHBOARD_METRICS,
        );
        assert_eq!(parse_report(&xml).unwrap_err().kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn reversed_range_is_malformed() {
        assert!(parse_date_range("September 10, 2008 - August 11, 2008").is_err());

        let xml = dashboard_xml(
            "www.example.com",
            "September 10, 2008 - August 11, 2008",
            30,
            &DEFAULT_DASHBOARD_METRICS,
        );
        assert_eq!(parse_report(&xml).unwrap_err().kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn empty_window_yields_empty_series() {
        let xml = dashboard_xml(
            "www.example.com",
            "August 11, 2008 - August 11, 2008",
            0,
            &DEFAULT_DASHBOARD_METRICS,
        );
        let report = parse_report(&xml).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn missing_header_elements() {
        let no_report = "<AnalyticsReport><Other/></AnalyticsReport>";
        assert_eq!(parse_report(no_report).unwrap_err().kind(), ErrorKind::MalformedDocument);

        let no_name = "<Report><Title/></Report>";
        assert_eq!(parse_report(no_name).unwrap_err().kind(), ErrorKind::MalformedDocument);

        let no_title = r#"<Report name="Dashboard"/>"#;
        assert_eq!(parse_report(no_title).unwrap_err().kind(), ErrorKind::MalformedDocument);

        let no_range =
            r#"<Report name="Dashboard"><Title><ProfileName>x</ProfileName></Title></Report>"#;
        assert_eq!(parse_report(no_range).unwrap_err().kind(), ErrorKind::MalformedDocument);

        assert_eq!(parse_report("not xml").unwrap_err().kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn doctype_is_accepted() {
        let xml = format!("<!DOCTYPE AnalyticsReport>\n{}", lethain_xml());
        assert_eq!(parse_report(&xml).unwrap().len(), 30);
    }

    #[test]
    fn report_may_be_wrapped() {
        let inner = lethain_xml();
        let wrapped = format!("<AnalyticsReport>{}</AnalyticsReport>", inner);
        let report = parse_report(&wrapped).unwrap();
        assert_eq!(report.profile_name, "www.lethain.com");
        assert_eq!(report.len(), 30);
    }

    #[test]
    fn missing_metric_propagates() {
        let xml = dashboard_xml("www.example.com", LETHAIN_RANGE, 30, &["Visits", "Pageviews"]);
        let err = parse_report(&xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingMetricSeries);
    }

    #[test]
    fn custom_metric_set() {
        let xml = dashboard_xml("www.example.com", LETHAIN_RANGE, 30, &["Visits", "Pageviews"]);
        let parser = ReportParser::with_config(DashboardConfig::new(["Pageviews"]));
        assert_eq!(parser.config().expected_metrics, vec!["Pageviews".to_string()]);
        assert_eq!(ReportParser::new().config(), &DashboardConfig::default());
        let report = parser.parse(&xml).unwrap();
        assert_eq!(report.series[0].metrics.len(), 1);
        assert_eq!(report.series[3].get("Pageviews"), Some("Pageviews-3"));
    }

    #[test]
    fn parsing_is_idempotent() {
        let xml = lethain_xml();
        let parser = ReportParser::new();
        assert_eq!(parser.parse(&xml).unwrap(), parser.parse(&xml).unwrap());
    }

    #[test]
    fn bytes_with_bom() {
        let mut raw = b"\xEF\xBB\xBF".to_vec();
        raw.extend_from_slice(lethain_xml().as_bytes());
        let report = ReportParser::new().parse_bytes(&raw).unwrap();
        assert_eq!(report.len(), 30);

        let err = ReportParser::new().parse_bytes(b"<Report name=\"\xFF\"/>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn parser_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReportParser>();
    }
}
