// src/utils/error.rs
use thiserror::Error;

/// Which contract a failed parse violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownReportType,
    MalformedDocument,
    MissingMetricSeries,
}

// Errors raised while turning an exported report into a ParsedReport.
// All of them are fatal to the parse call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Cannot handle report of type '{0}'")]
    UnknownReportType(String),

    #[error("Malformed report document: {0}")]
    MalformedDocument(String),

    #[error("Missing data for metric '{metric}': needed {needed} daily values, found {found}")]
    MissingMetricSeries {
        metric: String,
        needed: usize,
        found: usize,
    },
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::UnknownReportType(_) => ErrorKind::UnknownReportType,
            ReportError::MalformedDocument(_) => ErrorKind::MalformedDocument,
            ReportError::MissingMetricSeries { .. } => ErrorKind::MissingMetricSeries,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ReportError::MalformedDocument(msg.into())
    }
}

impl From<roxmltree::Error> for ReportError {
    fn from(err: roxmltree::Error) -> Self {
        ReportError::MalformedDocument(format!("XML syntax error: {}", err))
    }
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Output was not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Report parsing failed: {0}")]
    Report(#[from] ReportError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            ReportError::UnknownReportType("Other".into()).kind(),
            ErrorKind::UnknownReportType
        );
        assert_eq!(ReportError::malformed("x").kind(), ErrorKind::MalformedDocument);
        let missing = ReportError::MissingMetricSeries {
            metric: "Visits".into(),
            needed: 30,
            found: 0,
        };
        assert_eq!(missing.kind(), ErrorKind::MissingMetricSeries);
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = ReportError::UnknownReportType("Other".into());
        assert!(err.to_string().contains("'Other'"));

        let err = ReportError::MissingMetricSeries {
            metric: "Search".into(),
            needed: 30,
            found: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("Search"));
        assert!(msg.contains("30"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn xml_errors_become_malformed_document() {
        let Err(xml_err) = roxmltree::Document::parse("<Report>") else {
            panic!("unterminated element should not parse");
        };
        let err: ReportError = xml_err.into();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }
}
